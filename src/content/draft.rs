//! Editor draft and the partial patches applied to it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::post::{Post, PostInput};

/// Read time used when neither the post nor an import provides one
pub const DEFAULT_READ_TIME: u32 = 5;

/// Reasons a draft cannot be saved
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("title is required")]
    MissingTitle,
    #[error("slug is required")]
    MissingSlug,
}

/// Unsaved state of a post being edited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Draft {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub category_id: Option<String>,
    pub published: bool,
    pub cover_image: Option<String>,
    /// Comma-separated, as typed in the editor
    pub tags: String,
    pub read_time: u32,
}

impl Default for Draft {
    fn default() -> Self {
        Self::with_read_time(DEFAULT_READ_TIME)
    }
}

impl Draft {
    /// Empty draft with a caller-chosen default read time
    pub fn with_read_time(read_time: u32) -> Self {
        Self {
            title: String::new(),
            slug: String::new(),
            excerpt: None,
            content: String::new(),
            category_id: None,
            published: false,
            cover_image: None,
            tags: String::new(),
            read_time,
        }
    }

    /// Seed the editor from a stored post
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            category_id: post.category_id.clone(),
            published: post.published,
            cover_image: post.cover_image.clone(),
            tags: post.tag_list().join(", "),
            read_time: post.read_time,
        }
    }

    /// Overwrite every field present in `patch`, keep the rest
    pub fn apply(&mut self, patch: DraftPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(slug) = patch.slug {
            self.slug = slug;
        }
        if let Some(excerpt) = patch.excerpt {
            self.excerpt = Some(excerpt);
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(read_time) = patch.read_time {
            self.read_time = read_time;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = Some(category_id);
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
    }

    /// Non-mutating form of [`Draft::apply`]
    pub fn merged(&self, patch: DraftPatch) -> Self {
        let mut draft = self.clone();
        draft.apply(patch);
        draft
    }

    /// Tags split on commas, trimmed, empties dropped
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }

    /// Validate and convert into the store payload.
    ///
    /// `published_at` keeps the existing publication time when there is one,
    /// is stamped with `now` on first publish, and is cleared when unpublished.
    pub fn to_post_input(
        &self,
        existing_published_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<PostInput, DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::MissingTitle);
        }
        if self.slug.trim().is_empty() {
            return Err(DraftError::MissingSlug);
        }

        let tags = if self.tags.is_empty() {
            None
        } else {
            Some(self.tag_list())
        };

        Ok(PostInput {
            title: self.title.clone(),
            slug: self.slug.clone(),
            excerpt: self.excerpt.clone(),
            content: self.content.clone(),
            cover_image: non_empty(self.cover_image.as_deref()),
            published: self.published,
            published_at: if self.published {
                Some(existing_published_at.unwrap_or(now))
            } else {
                None
            },
            category_id: non_empty(self.category_id.as_deref()),
            tags,
            read_time: self.read_time,
            updated_at: now,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(String::from)
}

/// Fields to overwrite on a [`Draft`]; `None` means "leave as is"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Raw comma-separated text; split only when saving
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl DraftPatch {
    /// Patch that only replaces the body
    pub fn content_only(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }
}
