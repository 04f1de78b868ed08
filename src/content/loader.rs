//! Markdown source loader - finds and reads files for bulk import

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A markdown file read from disk
#[derive(Debug, Clone)]
pub struct MarkdownSource {
    pub path: PathBuf,
    /// File name without extension, used as the fallback slug
    pub stem: String,
    pub text: String,
}

impl MarkdownSource {
    /// Read a single file; any extension is accepted
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();
        Ok(Self {
            path: path.to_path_buf(),
            stem,
            text,
        })
    }
}

/// Load every `.md`/`.markdown` file under `path`, or `path` itself if it is a file.
///
/// Unreadable files are logged and skipped. Results are sorted by path.
pub fn load_sources(path: &Path) -> Result<Vec<MarkdownSource>> {
    if path.is_file() {
        return Ok(vec![MarkdownSource::read(path)?]);
    }

    let mut sources = Vec::new();

    for entry in WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || !is_markdown_file(path) {
            continue;
        }
        match MarkdownSource::read(path) {
            Ok(source) => sources.push(source),
            Err(e) => tracing::warn!("Failed to read {:?}: {}", path, e),
        }
    }

    sources.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(sources)
}

/// Check if a file is a markdown file
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
