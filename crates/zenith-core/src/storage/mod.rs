mod config;
pub mod database;

pub use config::{Config, LoggingConfig, NotificationsConfig, PomodoroConfig};
pub use database::Database;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::StoreError;

/// Persistence keys. Values are JSON.
pub mod keys {
    pub const SCHEDULES: &str = "zenith-schedules";
    pub const TOTAL_FOCUS_MINUTES: &str = "totalFocusMinutes";
    pub const TOTAL_USAGE_MINUTES: &str = "totalUsageMinutes";
    pub const FOCUS_DURATION: &str = "focusDuration";
    pub const FOCUS_SOUND_ID: &str = "focusSoundId";
    pub const FOCUS_HISTORY: &str = "focusHistory";
    pub const TIMER_MODE: &str = "timerMode";
    pub const DAILY_GOAL: &str = "dailyGoal";
    pub const SESSION_TODOS: &str = "sessionTodos";
}

/// Location of `~/.config/zenith[-dev]/` based on ZENITH_ENV, without
/// touching the filesystem.
///
/// Set ZENITH_ENV=dev to use development data directory.
pub fn data_dir_path() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ZENITH_ENV").unwrap_or_else(|_| "production".to_string());
    if env == "dev" {
        base_dir.join("zenith-dev")
    } else {
        base_dir.join("zenith")
    }
}

/// Returns [`data_dir_path`], creating it if needed.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let dir = data_dir_path();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// String-keyed JSON store.
///
/// Single-threaded by contract: implementations may use interior mutability and
/// are shared through `Rc`.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;
    fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-process store for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Store whose reads come back empty and whose writes always fail.
#[cfg(test)]
pub(crate) struct FailingStore;

#[cfg(test)]
impl KvStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &serde_json::Value) -> Result<(), StoreError> {
        Err(StoreError::DataDir(std::io::Error::other("disk full")))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::DataDir(std::io::Error::other("disk full")))
    }
}

/// Read and decode `key`, falling back to `T::default()` when the key is absent,
/// the store fails, or the stored value does not decode.
pub fn load_or_default<T>(store: &dyn KvStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    load(store, key).unwrap_or_default()
}

/// Like [`load_or_default`] but distinguishes "absent or unreadable" (`None`).
pub fn load<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Option<T> {
    let value = match store.get(key) {
        Ok(Some(value)) => value,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "store read failed, using default");
            return None;
        }
    };
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!(key, error = %e, "malformed stored value, using default");
            None
        }
    }
}

/// Encode and write `value` under `key`.
///
/// # Errors
/// Returns an error if encoding fails or the store rejects the write. The
/// failure is also logged, since tick-driven callers usually carry on.
pub fn save<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let encoded = serde_json::to_value(value).map_err(|source| StoreError::Malformed {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &encoded).inspect_err(|e| {
        tracing::warn!(key, error = %e, "store write failed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_loads_default() {
        let store = MemoryStore::new();
        let minutes: u64 = load_or_default(&store, keys::TOTAL_FOCUS_MINUTES);
        assert_eq!(minutes, 0);
    }

    #[test]
    fn malformed_value_loads_default() {
        let store = MemoryStore::new();
        store
            .set(keys::FOCUS_HISTORY, &serde_json::json!({"not": "a list"}))
            .unwrap();
        let history: Vec<u32> = load_or_default(&store, keys::FOCUS_HISTORY);
        assert!(history.is_empty());
    }

    #[test]
    fn save_then_load() {
        let store = MemoryStore::new();
        save(&store, keys::TOTAL_USAGE_MINUTES, &42u64).unwrap();
        assert_eq!(load::<u64>(&store, keys::TOTAL_USAGE_MINUTES), Some(42));
        store.remove(keys::TOTAL_USAGE_MINUTES).unwrap();
        assert!(store.is_empty());
    }
}
