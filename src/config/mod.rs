//! Configuration module

mod site;

pub use site::SiteConfig;
pub use site::{AdminConfig, DataConfig, EditorConfig, GateConfig, SearchConfig, ServerConfig};
pub use site::{ADMIN_PASSWORD_ENV, GATE_PASSWORD_ENV};
