//! Create a new post

use anyhow::Result;

use crate::editor::Editor;
use crate::store::{LocalBackend, PostStore};
use crate::Blog;

/// Create an unpublished post titled `title` and return its id
pub fn create_post(backend: &LocalBackend, title: &str, default_read_time: u32) -> Result<String> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from title: {:?}", title);
    }
    if backend.find_by_slug(&slug)?.is_some() {
        anyhow::bail!("Post already exists: {}", slug);
    }

    let mut editor = Editor::new(backend, backend, default_read_time);
    editor.draft.title = title.to_string();
    editor.draft.slug = slug;
    Ok(editor.save()?)
}

/// Run the new command
pub fn run(blog: &Blog, title: &str) -> Result<String> {
    let backend = blog.open_backend()?;
    let id = create_post(&backend, title, blog.config.editor.default_read_time)?;
    println!("Created: {} ({})", title, id);
    Ok(id)
}
