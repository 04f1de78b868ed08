//! Password gate for the protected category
//!
//! This is a deterrent, not access control: the check and the persisted flag
//! both live with the reader, so never put anything genuinely sensitive behind
//! it.

use std::collections::HashMap;
use std::sync::Mutex;

/// Message shown when the password does not match
pub const DEFAULT_DENIED_MESSAGE: &str = "密码错误，请重试";

/// Key-value persistence owned by the reader (browser storage, a cookie jar,
/// or a map in tests)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);
}

/// Outcome of a password attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Granted,
    Denied { message: String },
}

impl GateOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, GateOutcome::Granted)
    }
}

/// Gate guarding one category
pub struct CategoryGate<'a, S: KeyValueStore + ?Sized> {
    category_slug: &'a str,
    secret: &'a str,
    denied_message: &'a str,
    storage: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> CategoryGate<'a, S> {
    pub fn new(category_slug: &'a str, secret: &'a str, storage: &'a S) -> Self {
        Self {
            category_slug,
            secret,
            denied_message: DEFAULT_DENIED_MESSAGE,
            storage,
        }
    }

    pub fn with_denied_message(mut self, message: &'a str) -> Self {
        self.denied_message = message;
        self
    }

    /// Storage key for the authorization flag, e.g. `category_loved_auth`
    pub fn storage_key(&self) -> String {
        storage_key(self.category_slug)
    }

    /// Whether a previous visit already unlocked the category.
    ///
    /// The stored flag must equal the current secret, so changing the secret
    /// locks everyone out again.
    pub fn is_authorized(&self) -> bool {
        !self.secret.is_empty()
            && self.storage.get(&self.storage_key()).as_deref() == Some(self.secret)
    }

    /// Check a password; on success the flag is persisted
    pub fn verify(&self, candidate: &str) -> GateOutcome {
        if !self.secret.is_empty() && candidate == self.secret {
            self.storage.set(&self.storage_key(), candidate);
            tracing::debug!("Category {} unlocked", self.category_slug);
            GateOutcome::Granted
        } else {
            GateOutcome::Denied {
                message: self.denied_message.to_string(),
            }
        }
    }
}

pub fn storage_key(category_slug: &str) -> String {
    format!("category_{}_auth", category_slug)
}

/// In-memory [`KeyValueStore`]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Entries written since creation, including the initial ones
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }
}
