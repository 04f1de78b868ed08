//! Initialize a new blog

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;
use crate::store::{LocalBackend, SettingsStore};
use crate::CONFIG_FILE;

const CONFIG_TEMPLATE: &str = r#"# claypress configuration

# Site
title: Mark的博客
language: zh-CN
timezone: Asia/Shanghai

# URL
url: http://localhost:4000
root: /

server:
  ip: localhost
  port: 4000
  static_dir: public

data:
  path: .claypress/db.json

# Admin login. Prefer CLAYPRESS_ADMIN_PASSWORD over writing the password here.
admin:
  email: ''
  password: ''

editor:
  default_read_time: 5
  highlight_theme: base16-ocean.dark

# Password-protected category. Set CLAYPRESS_PROTECTED_PASSWORD to enable it.
gate:
  protected_category: loved
  password: ''
  denied_message: 密码错误，请重试

search:
  debounce_ms: 300
  fetch_limit: 10
  result_limit: 5

# Category name keywords shown as featured on the home page
featured:
  - 技术
  - 日常
"#;

const ADMIN_CSS: &str = r#"body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
label { display: block; margin: 0.5rem 0; }
.error { color: #c0392b; }
"#;

/// Initialize a new blog in the given directory
pub fn init_blog(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("Already initialized: {:?}", config_path);
    }

    // Create directory structure
    fs::create_dir_all(target_dir)?;
    fs::write(&config_path, CONFIG_TEMPLATE)?;

    let config = SiteConfig::load(&config_path)?;
    let css_dir = target_dir.join(&config.server.static_dir).join("css");
    fs::create_dir_all(&css_dir)?;
    fs::write(css_dir.join("admin.css"), ADMIN_CSS)?;

    // Empty data file holding the default settings row
    let backend = LocalBackend::open(target_dir.join(&config.data.path))?;
    backend.read()?;
    backend.save()?;

    tracing::debug!("Wrote {:?}", config_path);
    Ok(())
}
