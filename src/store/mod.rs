//! Store traits for posts, categories and settings
//!
//! The blog never talks to storage directly; every read and write goes through
//! these traits. [`LocalBackend`] is the in-process implementation.

mod local;

pub use local::{Database, LocalBackend};

use thiserror::Error;

use crate::content::{Category, NewCategory, Post, PostInput, Settings, SettingsPatch};

/// Failure reported by a store operation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("duplicate {field}: {value}")]
    Conflict { field: &'static str, value: String },

    #[error("invalid {0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage format error: {0}")]
    Format(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Post persistence
pub trait PostStore: Send + Sync {
    /// Insert a new post and return its id
    fn create(&self, input: PostInput) -> StoreResult<String>;

    fn update(&self, id: &str, input: PostInput) -> StoreResult<()>;

    fn delete(&self, id: &str) -> StoreResult<()>;

    fn get(&self, id: &str) -> StoreResult<Option<Post>>;

    fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Post>>;

    /// All posts, newest `created_at` first
    fn list(&self) -> StoreResult<Vec<Post>>;

    fn count(&self) -> StoreResult<usize> {
        Ok(self.list()?.len())
    }

    /// Published posts, newest first
    fn list_published(&self) -> StoreResult<Vec<Post>> {
        Ok(self.list()?.into_iter().filter(|p| p.published).collect())
    }
}

/// Category persistence
pub trait CategoryStore: Send + Sync {
    /// All categories ordered by name
    fn list(&self) -> StoreResult<Vec<Category>>;

    fn create(&self, category: NewCategory) -> StoreResult<String>;

    /// Delete a category; posts referencing it lose their reference
    fn delete(&self, id: &str) -> StoreResult<()>;

    fn count(&self) -> StoreResult<usize> {
        Ok(self.list()?.len())
    }
}

/// The single settings row
pub trait SettingsStore: Send + Sync {
    fn read(&self) -> StoreResult<Settings>;

    fn update(&self, patch: SettingsPatch) -> StoreResult<()>;
}
