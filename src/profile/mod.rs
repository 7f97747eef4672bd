//! The persisted user profile: identity, usage history, and free usage state.
//!
//! A [`Profile`] is built once at startup over an explicit [`KeyValueStore`]
//! and passed to whatever needs it.

pub mod store;
pub mod types;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::ProfileError;
use crate::pricing::FreeUsageWindow;

pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use types::{UsageRecord, UserProfile};

/// Number of usage records kept, newest first.
pub const HISTORY_LIMIT: usize = 10;

const USER_KEY: &str = "user";
const HISTORY_KEY: &str = "usage_history";
const LAST_FREE_USAGE_KEY: &str = "last_free_usage";

/// Typed read/write access over a key-value store.
#[derive(Debug)]
pub struct Profile<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Profile<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read(USER_KEY)
    }

    pub fn save_user(&mut self, user: &UserProfile) -> Result<(), ProfileError> {
        user.validate()?;
        self.write(USER_KEY, user)
    }

    /// Recent updates, newest first.
    pub fn history(&self) -> Vec<UsageRecord> {
        self.read(HISTORY_KEY).unwrap_or_default()
    }

    /// Prepend `record`, keeping the newest [`HISTORY_LIMIT`] entries.
    ///
    /// History that no longer deserializes is replaced.
    pub fn record_usage(&mut self, record: UsageRecord) -> Result<(), ProfileError> {
        let mut history: Vec<UsageRecord> = match self.store.get(HISTORY_KEY) {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Usage history is unreadable and will be reset: {e}");
                Vec::new()
            }),
            None => Vec::new(),
        };
        history.insert(0, record);
        history.truncate(HISTORY_LIMIT);
        self.write(HISTORY_KEY, &history)
    }

    pub fn free_usage(&self) -> FreeUsageWindow {
        FreeUsageWindow::new(self.read(LAST_FREE_USAGE_KEY))
    }

    pub fn save_free_usage(&mut self, window: &FreeUsageWindow) -> Result<(), ProfileError> {
        match window.last_used {
            Some(last) => self.write(LAST_FREE_USAGE_KEY, &last),
            None => self.store.remove(LAST_FREE_USAGE_KEY),
        }
    }

    /// Read a typed value. Values that no longer deserialize are ignored.
    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.store.get(key)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Ignoring unreadable profile entry '{key}': {e}");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), ProfileError> {
        let value = serde_json::to_value(value).map_err(|source| ProfileError::SerializeFailed {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, value)
    }
}
