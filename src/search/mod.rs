//! Post search over titles and excerpts

mod debounce;

pub use debounce::SearchDebouncer;

use anyhow::Result;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::helpers::post_path;
use crate::store::{CategoryStore, PostStore};

/// One search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub path: String,
    pub excerpt: Option<String>,
}

/// Searches published posts, never returning posts from the protected category
pub struct Searcher<'a> {
    config: &'a SiteConfig,
    posts: &'a dyn PostStore,
    categories: &'a dyn CategoryStore,
}

impl<'a> Searcher<'a> {
    pub fn new(
        config: &'a SiteConfig,
        posts: &'a dyn PostStore,
        categories: &'a dyn CategoryStore,
    ) -> Self {
        Self {
            config,
            posts,
            categories,
        }
    }

    /// Case-insensitive substring match on title or excerpt.
    ///
    /// Up to `fetch_limit` matches are fetched, protected posts are dropped,
    /// and at most `result_limit` remain.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();
        let limits = &self.config.search;

        let protected_id = self
            .categories
            .list()?
            .into_iter()
            .find(|c| c.slug == self.config.gate.protected_category)
            .map(|c| c.id);

        let hits: Vec<SearchHit> = self
            .posts
            .list_published()?
            .into_iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p
                        .excerpt
                        .as_deref()
                        .is_some_and(|e| e.to_lowercase().contains(&needle))
            })
            .take(limits.fetch_limit)
            .filter(|p| protected_id.is_none() || p.category_id != protected_id)
            .take(limits.result_limit)
            .map(|p| SearchHit {
                path: post_path(self.config, &p.slug),
                id: p.id,
                title: p.title,
                slug: p.slug,
                excerpt: p.excerpt,
            })
            .collect();

        tracing::debug!("Search {:?} matched {} posts", query, hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Draft, NewCategory};
    use crate::store::LocalBackend;

    fn add_post(backend: &LocalBackend, title: &str, excerpt: Option<&str>, category: Option<&str>) {
        let draft = Draft {
            title: title.to_string(),
            slug: slug::slugify(title),
            excerpt: excerpt.map(String::from),
            category_id: category.map(String::from),
            published: true,
            ..Default::default()
        };
        PostStore::create(backend, draft.to_post_input(None, chrono::Utc::now()).unwrap()).unwrap();
    }

    #[test]
    fn test_matches_title_or_excerpt() {
        let backend = LocalBackend::in_memory();
        add_post(&backend, "Learning Rust", None, None);
        add_post(&backend, "Weekend notes", Some("a bit of RUST and tea"), None);
        add_post(&backend, "Unrelated", Some("nothing here"), None);

        let config = SiteConfig::default();
        let hits = Searcher::new(&config, &backend, &backend).search(" rust ").unwrap();
        let mut titles: Vec<_> = hits.iter().map(|h| h.title.as_str()).collect();
        titles.sort();
        assert_eq!(titles, vec!["Learning Rust", "Weekend notes"]);
        assert!(hits.iter().all(|h| h.path.starts_with("/blog/")));
    }

    #[test]
    fn test_blank_query_returns_nothing() {
        let backend = LocalBackend::in_memory();
        add_post(&backend, "Anything", None, None);
        let config = SiteConfig::default();
        assert!(Searcher::new(&config, &backend, &backend).search("   ").unwrap().is_empty());
    }

    #[test]
    fn test_protected_posts_excluded_and_limited() {
        let backend = LocalBackend::in_memory();
        let loved = CategoryStore::create(
            &backend,
            NewCategory {
                name: "Loved".to_string(),
                slug: "loved".to_string(),
            },
        )
        .unwrap();
        add_post(&backend, "Note secret", None, Some(&loved));
        for i in 0..8 {
            add_post(&backend, &format!("Note {}", i), None, None);
        }

        let config = SiteConfig::default();
        let hits = Searcher::new(&config, &backend, &backend).search("note").unwrap();
        assert_eq!(hits.len(), 5);
        assert!(hits.iter().all(|h| h.title != "Note secret"));
    }
}
