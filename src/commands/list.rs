//! List blog content

use anyhow::Result;
use std::collections::HashMap;

use crate::helpers::locale_date;
use crate::store::{CategoryStore, LocalBackend, PostStore};
use crate::Blog;

/// Lines describing the content of one type
pub fn describe(blog: &Blog, backend: &LocalBackend, content_type: &str) -> Result<Vec<String>> {
    let mut lines = Vec::new();

    match content_type {
        "post" | "posts" => {
            let categories: HashMap<String, String> = CategoryStore::list(backend)?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect();
            let posts = PostStore::list(backend)?;
            lines.push(format!("Posts ({}):", posts.len()));
            for post in posts {
                let category = post
                    .category_id
                    .as_ref()
                    .and_then(|id| categories.get(id))
                    .map(String::as_str)
                    .unwrap_or("-");
                lines.push(format!(
                    "  {} - {} [{}] {}{}",
                    locale_date(&post.display_date(), blog.config.tz(), &blog.config.language),
                    post.title,
                    post.slug,
                    category,
                    if post.published { "" } else { " (draft)" }
                ));
            }
        }
        "category" | "categories" => {
            let posts = PostStore::list(backend)?;
            let categories = CategoryStore::list(backend)?;
            lines.push(format!("Categories ({}):", categories.len()));
            for category in categories {
                let count = posts
                    .iter()
                    .filter(|p| p.category_id.as_deref() == Some(category.id.as_str()))
                    .count();
                lines.push(format!("  {} [{}] ({})", category.name, category.slug, count));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, category",
                content_type
            );
        }
    }

    Ok(lines)
}

/// List blog content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let backend = blog.open_backend()?;
    for line in describe(blog, &backend, content_type)? {
        println!("{}", line);
    }
    Ok(())
}
