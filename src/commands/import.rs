//! Import markdown files into posts

use anyhow::{Context, Result};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::content;
use crate::content::loader::{self, MarkdownSource};
use crate::editor::Editor;
use crate::store::{CategoryStore, LocalBackend, PostStore};
use crate::Blog;

/// What importing one file did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Created { id: String, slug: String },
    Updated { id: String, slug: String },
}

/// Import one file. The slug comes from front matter, else the file name;
/// a post with that slug is updated in place, keeping every field the file
/// does not mention.
pub fn import_source(
    posts: &dyn PostStore,
    categories: &dyn CategoryStore,
    source: &MarkdownSource,
    default_read_time: u32,
    publish: bool,
) -> Result<ImportOutcome> {
    let patch = content::import(&source.text, &categories.list()?);
    let slug = patch
        .slug
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| slug::slugify(&source.stem));

    let existing = posts.find_by_slug(&slug)?;
    let mut editor = match &existing {
        Some(post) => Editor::open(posts, categories, &post.id)?
            .with_context(|| format!("Post disappeared: {}", post.id))?,
        None => {
            let mut editor = Editor::new(posts, categories, default_read_time);
            editor.draft.slug = slug.clone();
            editor
        }
    };

    editor.draft.apply(patch);
    if editor.draft.slug.trim().is_empty() {
        editor.draft.slug = slug.clone();
    }
    if editor.draft.title.trim().is_empty() {
        editor.draft.title = source.stem.clone();
    }
    if publish {
        editor.draft.published = true;
    }

    let id = editor.save()?;
    Ok(if existing.is_some() {
        ImportOutcome::Updated { id, slug }
    } else {
        ImportOutcome::Created { id, slug }
    })
}

/// Import every markdown file under `path`; failures are reported and skipped.
/// Returns the number of files imported.
pub fn import_path(
    backend: &LocalBackend,
    path: &Path,
    default_read_time: u32,
    publish: bool,
) -> Result<usize> {
    let sources = loader::load_sources(path)?;
    let mut imported = 0;

    for source in &sources {
        match import_source(backend, backend, source, default_read_time, publish) {
            Ok(ImportOutcome::Created { slug, .. }) => {
                println!("Created: {} <- {:?}", slug, source.path);
                imported += 1;
            }
            Ok(ImportOutcome::Updated { slug, .. }) => {
                println!("Updated: {} <- {:?}", slug, source.path);
                imported += 1;
            }
            Err(e) => {
                tracing::error!("Failed to import {:?}: {}", source.path, e);
            }
        }
    }

    tracing::info!("Imported {} of {} files", imported, sources.len());
    Ok(imported)
}

/// Run the import command
pub fn run(blog: &Blog, path: &Path, publish: bool) -> Result<LocalBackend> {
    let backend = blog.open_backend()?;
    import_path(&backend, path, blog.config.editor.default_read_time, publish)?;
    Ok(backend)
}

/// Re-import changed markdown files under `path` until the watcher stops
pub fn watch(blog: &Blog, backend: &LocalBackend, path: &Path, publish: bool) -> Result<()> {
    let (tx, rx) = channel();

    // Create debouncer to avoid importing half-written files
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;
    let mode = if path.is_dir() {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    debouncer.watcher().watch(path, mode)?;

    println!("Watching {:?} for changes. Press Ctrl+C to stop.", path);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let mut changed: Vec<_> = events
                    .into_iter()
                    .map(|e| e.path)
                    .filter(|p| p.is_file() && loader::is_markdown_file(p))
                    .collect();
                changed.sort();
                changed.dedup();

                for file in changed {
                    println!("📝 File changed: {}", file.display());
                    if let Err(e) = import_path(
                        backend,
                        &file,
                        blog.config.editor.default_read_time,
                        publish,
                    ) {
                        tracing::error!("Re-import failed: {}", e);
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}
