//! Post editor - one editing session over a single draft

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::content::{self, Draft, DraftError, DraftPatch};
use crate::store::{CategoryStore, PostStore, StoreError};

/// Save failures, formatted for display to the author
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("保存失败: {0}")]
    Invalid(#[from] DraftError),

    #[error("保存失败: {0}")]
    Store(#[from] StoreError),
}

/// Editing session. The draft stays intact when a save fails so the author
/// can correct it and resubmit.
pub struct Editor<'a> {
    posts: &'a dyn PostStore,
    categories: &'a dyn CategoryStore,
    post_id: Option<String>,
    published_at: Option<DateTime<Utc>>,
    pub draft: Draft,
}

impl<'a> Editor<'a> {
    /// Start a new post
    pub fn new(
        posts: &'a dyn PostStore,
        categories: &'a dyn CategoryStore,
        default_read_time: u32,
    ) -> Self {
        Self {
            posts,
            categories,
            post_id: None,
            published_at: None,
            draft: Draft::with_read_time(default_read_time),
        }
    }

    /// Open an existing post; `None` if it does not exist
    pub fn open(
        posts: &'a dyn PostStore,
        categories: &'a dyn CategoryStore,
        id: &str,
    ) -> Result<Option<Self>, StoreError> {
        let Some(post) = posts.get(id)? else {
            return Ok(None);
        };
        Ok(Some(Self {
            posts,
            categories,
            post_id: Some(post.id.clone()),
            published_at: post.published_at,
            draft: Draft::from_post(&post),
        }))
    }

    /// Id of the post being edited, once it exists in the store
    pub fn post_id(&self) -> Option<&str> {
        self.post_id.as_deref()
    }

    /// Import a markdown file onto the draft and return the applied patch
    pub fn import_file(&mut self, text: &str) -> Result<DraftPatch, StoreError> {
        let categories = self.categories.list()?;
        let patch = content::import(text, &categories);
        self.draft.apply(patch.clone());
        Ok(patch)
    }

    /// Create or update the post and return its id
    pub fn save(&mut self) -> Result<String, EditorError> {
        let now = Utc::now();
        let input = self.draft.to_post_input(self.published_at, now)?;
        let published_at = input.published_at;

        let id = match &self.post_id {
            Some(id) => {
                self.posts.update(id, input)?;
                id.clone()
            }
            None => self.posts.create(input)?,
        };

        tracing::info!("Saved post {} ({})", id, self.draft.slug);
        self.post_id = Some(id.clone());
        self.published_at = published_at;
        Ok(id)
    }
}
