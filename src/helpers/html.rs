//! HTML helper functions for the admin pages

use super::url::url_for;
use crate::config::SiteConfig;

/// Generate a CSS link tag for a file under the static directory
///
/// # Examples
/// ```ignore
/// css(&config, "admin") // -> <link rel="stylesheet" href="/static/css/admin.css">
/// ```
pub fn css(config: &SiteConfig, path: &str) -> String {
    let path = if path.ends_with(".css") {
        path.to_string()
    } else {
        format!("{}.css", path)
    };
    let href = url_for(config, &format!("static/css/{}", path.trim_start_matches('/')));

    format!(r#"<link rel="stylesheet" href="{}">"#, href)
}

/// Generate an anchor tag; `text` is escaped
pub fn link_to(config: &SiteConfig, path: &str, text: &str) -> String {
    format!(
        r#"<a href="{}">{}</a>"#,
        html_escape(&url_for(config, path)),
        html_escape(text)
    )
}

/// Minimal HTML document around `body`
pub fn page(config: &SiteConfig, title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n<title>{} | {}</title>\n{}\n</head>\n<body>\n{}\n</body>\n</html>\n",
        html_escape(&config.language),
        html_escape(title),
        html_escape(&config.title),
        css(config, "admin"),
        body
    )
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
