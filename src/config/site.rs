//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::DEFAULT_READ_TIME;
use crate::gate::DEFAULT_DENIED_MESSAGE;

/// Environment variable overriding `admin.password`
pub const ADMIN_PASSWORD_ENV: &str = "CLAYPRESS_ADMIN_PASSWORD";
/// Environment variable overriding `gate.password`
pub const GATE_PASSWORD_ENV: &str = "CLAYPRESS_PROTECTED_PASSWORD";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    /// IANA zone used for displayed dates, e.g. `Asia/Shanghai`; empty means UTC
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,

    pub server: ServerConfig,
    pub data: DataConfig,
    pub admin: AdminConfig,
    pub editor: EditorConfig,
    pub gate: GateConfig,
    pub search: SearchConfig,

    /// Name fragments picked out as featured categories on the home page
    pub featured: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Mark的博客".to_string(),
            language: "zh-CN".to_string(),
            timezone: "Asia/Shanghai".to_string(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            server: ServerConfig::default(),
            data: DataConfig::default(),
            admin: AdminConfig::default(),
            editor: EditorConfig::default(),
            gate: GateConfig::default(),
            search: SearchConfig::default(),

            featured: vec!["技术".to_string(), "日常".to_string()],
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file and apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Replace secrets with values from the environment when set
    pub fn apply_env(&mut self) {
        if let Ok(password) = std::env::var(ADMIN_PASSWORD_ENV) {
            tracing::debug!("Using admin password from {}", ADMIN_PASSWORD_ENV);
            self.admin.password = password;
        }
        if let Ok(password) = std::env::var(GATE_PASSWORD_ENV) {
            tracing::debug!("Using category password from {}", GATE_PASSWORD_ENV);
            self.gate.password = password;
        }
    }

    /// Parsed display timezone, UTC when unset or unknown
    pub fn tz(&self) -> chrono_tz::Tz {
        if self.timezone.is_empty() {
            return chrono_tz::UTC;
        }
        self.timezone.parse().unwrap_or_else(|e| {
            tracing::warn!("Unknown timezone {:?}: {}", self.timezone, e);
            chrono_tz::UTC
        })
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
    /// Directory served under `/static`, relative to the site directory
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
            static_dir: "public".to_string(),
        }
    }
}

/// Where the local backend keeps its snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: ".claypress/db.json".to_string(),
        }
    }
}

/// Admin credentials checked by the local authenticator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

/// Post editor defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub default_read_time: u32,
    /// syntect theme for code blocks
    pub highlight_theme: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_read_time: DEFAULT_READ_TIME,
            highlight_theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Protected category settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub protected_category: String,
    pub password: String,
    pub denied_message: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            protected_category: "loved".to_string(),
            password: String::new(),
            denied_message: DEFAULT_DENIED_MESSAGE.to_string(),
        }
    }
}

/// Search-as-you-type settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    /// Rows fetched before protected posts are filtered out
    pub fetch_limit: usize,
    /// Rows returned to the reader
    pub result_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            fetch_limit: 10,
            result_limit: 5,
        }
    }
}
