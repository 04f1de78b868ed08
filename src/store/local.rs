//! In-process backend with an optional JSON snapshot on disk

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::{CategoryStore, PostStore, SettingsStore, StoreError, StoreResult};
use crate::content::{Category, NewCategory, Post, PostInput, Settings, SettingsPatch};

/// Everything the blog stores
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    /// Snapshot format version
    pub version: u32,
    pub posts: Vec<Post>,
    pub categories: Vec<Category>,
    pub settings: Option<Settings>,
}

impl Database {
    /// Current snapshot format version
    const VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            ..Default::default()
        }
    }

    fn slug_taken(&self, slug: &str, except_id: Option<&str>) -> bool {
        self.posts
            .iter()
            .any(|p| p.slug == slug && Some(p.id.as_str()) != except_id)
    }
}

/// Store implementation backed by memory, persisted after every write when a
/// path is set
pub struct LocalBackend {
    path: Option<PathBuf>,
    db: RwLock<Database>,
}

impl LocalBackend {
    /// Backend that never touches the disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            db: RwLock::new(Database::new()),
        }
    }

    /// Open a snapshot file, starting empty if it does not exist yet
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let db = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let db: Database = serde_json::from_str(&content)?;
            if db.version != Database::VERSION {
                tracing::warn!(
                    "Data file {:?} has version {}, expected {}",
                    path,
                    db.version,
                    Database::VERSION
                );
            }
            tracing::debug!(
                "Loaded {} posts and {} categories from {:?}",
                db.posts.len(),
                db.categories.len(),
                path
            );
            db
        } else {
            tracing::info!("No data file at {:?}, starting empty", path);
            Database::new()
        };

        Ok(Self {
            path: Some(path),
            db: RwLock::new(db),
        })
    }

    /// Write the current state to disk
    pub fn save(&self) -> StoreResult<()> {
        let db = self.read_db()?;
        self.persist(&db)
    }

    fn persist(&self, db: &Database) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(db)?)?;
        Ok(())
    }

    fn read_db(&self) -> StoreResult<RwLockReadGuard<'_, Database>> {
        self.db.read().map_err(|_| StoreError::Poisoned)
    }

    /// Run a mutation on a copy; the copy replaces the live state only once
    /// it has been persisted
    fn write<T>(&self, f: impl FnOnce(&mut Database) -> StoreResult<T>) -> StoreResult<T> {
        let mut db: RwLockWriteGuard<'_, Database> =
            self.db.write().map_err(|_| StoreError::Poisoned)?;
        let mut next = db.clone();
        let value = f(&mut next)?;
        self.persist(&next)?;
        *db = next;
        Ok(value)
    }
}

impl PostStore for LocalBackend {
    fn create(&self, input: PostInput) -> StoreResult<String> {
        self.write(|db| {
            if db.slug_taken(&input.slug, None) {
                return Err(StoreError::Conflict {
                    field: "slug",
                    value: input.slug,
                });
            }
            let id = Uuid::new_v4().to_string();
            tracing::debug!("Creating post {} ({})", id, input.slug);
            db.posts.push(Post::from_input(id.clone(), input, Utc::now()));
            Ok(id)
        })
    }

    fn update(&self, id: &str, input: PostInput) -> StoreResult<()> {
        self.write(|db| {
            if db.slug_taken(&input.slug, Some(id)) {
                return Err(StoreError::Conflict {
                    field: "slug",
                    value: input.slug,
                });
            }
            let post = db
                .posts
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| not_found("post", id))?;
            post.apply_input(input);
            Ok(())
        })
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        self.write(|db| {
            let before = db.posts.len();
            db.posts.retain(|p| p.id != id);
            if db.posts.len() == before {
                return Err(not_found("post", id));
            }
            Ok(())
        })
    }

    fn get(&self, id: &str) -> StoreResult<Option<Post>> {
        Ok(self.read_db()?.posts.iter().find(|p| p.id == id).cloned())
    }

    fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Post>> {
        Ok(self.read_db()?.posts.iter().find(|p| p.slug == slug).cloned())
    }

    fn list(&self) -> StoreResult<Vec<Post>> {
        let mut posts = self.read_db()?.posts.clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.read_db()?.posts.len())
    }
}

impl CategoryStore for LocalBackend {
    fn list(&self) -> StoreResult<Vec<Category>> {
        let mut categories = self.read_db()?.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn create(&self, category: NewCategory) -> StoreResult<String> {
        let name = category.name.trim().to_string();
        let slug = category.slug.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::Invalid("category name".to_string()));
        }
        if slug.is_empty() {
            return Err(StoreError::Invalid("category slug".to_string()));
        }

        self.write(|db| {
            if db.categories.iter().any(|c| c.slug == slug) {
                return Err(StoreError::Conflict {
                    field: "slug",
                    value: slug,
                });
            }
            let id = Uuid::new_v4().to_string();
            db.categories.push(Category::new(id.clone(), name, slug));
            Ok(id)
        })
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        self.write(|db| {
            let before = db.categories.len();
            db.categories.retain(|c| c.id != id);
            if db.categories.len() == before {
                return Err(not_found("category", id));
            }
            for post in db
                .posts
                .iter_mut()
                .filter(|p| p.category_id.as_deref() == Some(id))
            {
                post.category_id = None;
            }
            Ok(())
        })
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.read_db()?.categories.len())
    }
}

impl SettingsStore for LocalBackend {
    fn read(&self) -> StoreResult<Settings> {
        if let Some(settings) = &self.read_db()?.settings {
            return Ok(settings.clone());
        }
        self.write(|db| Ok(db.settings.get_or_insert_with(Settings::default).clone()))
    }

    fn update(&self, patch: SettingsPatch) -> StoreResult<()> {
        self.write(|db| {
            db.settings
                .get_or_insert_with(Settings::default)
                .apply(patch, Utc::now());
            Ok(())
        })
    }
}

fn not_found(kind: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Draft;
    use tempfile::tempdir;

    fn input(title: &str, slug: &str) -> PostInput {
        Draft {
            title: title.to_string(),
            slug: slug.to_string(),
            content: "Body".to_string(),
            ..Default::default()
        }
        .to_post_input(None, Utc::now())
        .unwrap()
    }

    fn new_category(name: &str, slug: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            slug: slug.to_string(),
        }
    }

    #[test]
    fn test_post_crud() {
        let backend = LocalBackend::in_memory();
        let id = PostStore::create(&backend, input("First", "first")).unwrap();

        let post = backend.get(&id).unwrap().unwrap();
        assert_eq!(post.title, "First");

        PostStore::update(&backend, &id, input("Renamed", "first")).unwrap();
        assert_eq!(backend.find_by_slug("first").unwrap().unwrap().title, "Renamed");

        PostStore::delete(&backend, &id).unwrap();
        assert!(backend.get(&id).unwrap().is_none());
        assert!(matches!(
            PostStore::delete(&backend, &id),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let backend = LocalBackend::in_memory();
        PostStore::create(&backend, input("A", "same")).unwrap();
        let other = PostStore::create(&backend, input("B", "other")).unwrap();

        assert!(matches!(
            PostStore::create(&backend, input("C", "same")),
            Err(StoreError::Conflict { .. })
        ));
        assert!(matches!(
            PostStore::update(&backend, &other, input("B", "same")),
            Err(StoreError::Conflict { .. })
        ));
    }

    #[test]
    fn test_categories_listed_by_name() {
        let backend = LocalBackend::in_memory();
        CategoryStore::create(&backend, new_category("Zeta", "zeta")).unwrap();
        CategoryStore::create(&backend, new_category("Alpha", "alpha")).unwrap();

        let names: Vec<_> = CategoryStore::list(&backend)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_category_validation() {
        let backend = LocalBackend::in_memory();
        assert!(matches!(
            CategoryStore::create(&backend, new_category(" ", "x")),
            Err(StoreError::Invalid(_))
        ));
        CategoryStore::create(&backend, new_category("Tech", "tech")).unwrap();
        assert!(matches!(
            CategoryStore::create(&backend, new_category("Tech 2", "tech")),
            Err(StoreError::Conflict { .. })
        ));
    }

    #[test]
    fn test_deleting_category_clears_post_reference() {
        let backend = LocalBackend::in_memory();
        let cat = CategoryStore::create(&backend, new_category("Tech", "tech")).unwrap();
        let mut post_input = input("A", "a");
        post_input.category_id = Some(cat.clone());
        let post = PostStore::create(&backend, post_input).unwrap();

        CategoryStore::delete(&backend, &cat).unwrap();
        assert_eq!(backend.get(&post).unwrap().unwrap().category_id, None);
    }

    #[test]
    fn test_settings_default_and_update() {
        let backend = LocalBackend::in_memory();
        assert_eq!(backend.read().unwrap().blog_name, Settings::default().blog_name);

        SettingsStore::update(
            &backend,
            SettingsPatch {
                footer_text: Some("© 2025".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(backend.read().unwrap().footer_text, "© 2025");
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data/db.json");

        let backend = LocalBackend::open(&path).unwrap();
        PostStore::create(&backend, input("Saved", "saved")).unwrap();
        assert!(path.exists());

        let reopened = LocalBackend::open(&path).unwrap();
        assert_eq!(PostStore::count(&reopened).unwrap(), 1);
        assert!(reopened.find_by_slug("saved").unwrap().is_some());
    }

    #[test]
    fn test_failed_persist_leaves_state_untouched() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let backend = LocalBackend::open(blocker.join("db.json")).unwrap();

        assert!(matches!(
            PostStore::create(&backend, input("T", "t")),
            Err(StoreError::Io(_))
        ));
        assert_eq!(PostStore::count(&backend).unwrap(), 0);

        // Retrying the same input fails on storage again, never on the slug
        assert!(matches!(
            PostStore::create(&backend, input("T", "t")),
            Err(StoreError::Io(_))
        ));
        assert!(backend.find_by_slug("t").unwrap().is_none());
    }
}
