//! claypress: a personal blog server with Markdown front-matter import
//!
//! Posts, categories and settings live behind store traits with a local
//! JSON-backed implementation. Authors import Markdown files into drafts,
//! readers browse through a small JSON API, and one category can be kept
//! behind a shared password.

pub mod auth;
pub mod commands;
pub mod config;
pub mod content;
pub mod editor;
pub mod gate;
pub mod helpers;
pub mod reader;
pub mod search;
pub mod server;
pub mod store;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Name of the site configuration file inside the blog directory
pub const CONFIG_FILE: &str = "_config.yml";

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Local database file
    pub data_path: PathBuf,
    /// Static assets served under `/static`
    pub static_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", CONFIG_FILE, base_dir);
            let mut config = config::SiteConfig::default();
            config.apply_env();
            config
        };

        let data_path = base_dir.join(&config.data.path);
        let static_dir = base_dir.join(&config.server.static_dir);

        Ok(Self {
            config,
            base_dir,
            data_path,
            static_dir,
        })
    }

    /// Open the local store at the configured data path
    pub fn open_backend(&self) -> Result<store::LocalBackend> {
        Ok(store::LocalBackend::open(&self.data_path)?)
    }

    /// Create a new unpublished post
    pub fn new_post(&self, title: &str) -> Result<String> {
        commands::new::run(self, title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.data_path, dir.path().join(".claypress/db.json"));
        assert_eq!(blog.static_dir, dir.path().join("public"));
    }

    #[test]
    fn test_config_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "title: Notes\ndata:\n  path: data/blog.json\n",
        )
        .unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.title, "Notes");
        assert_eq!(blog.data_path, dir.path().join("data/blog.json"));
    }
}
