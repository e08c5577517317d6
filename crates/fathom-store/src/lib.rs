//! Persistent key-value storage for FATHOM_OS.
//!
//! Everything that must survive a simulated reboot, shutdown or crash lives
//! here: the admin credential, the first-run tour flag, the desktop icon
//! layout, and per-application saved state. Each key maps to one
//! JSON-serializable value; absence yields a caller-supplied default.
//! Writes are last-write-wins per key.

pub mod file;
pub mod keys;
pub mod memory;
pub mod records;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use fathom_types::error::{FathomError, Result};

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use records::{AdminCredential, IconCell, IconLayout};

/// Abstraction over a durable key-value store.
///
/// Object-safe so the orchestrator can hold a `Box<dyn PersistentStore>`.
/// Typed access goes through [`StoreExt`].
pub trait PersistentStore {
    /// Raw value stored under `key`, if any.
    fn get_value(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_value(&mut self, key: &str, value: Value) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// All keys currently stored, in lexicographic order.
    fn keys(&self) -> Vec<String>;

    /// Whether a value is stored under `key`.
    fn contains(&self, key: &str) -> bool {
        self.get_value(key).is_some()
    }
}

/// Typed helpers layered over any [`PersistentStore`].
pub trait StoreExt: PersistentStore {
    /// Decode the value under `key`, or return `default` when the key is
    /// absent or the stored value no longer matches `T`.
    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_opt(key).unwrap_or(default)
    }

    /// Decode the value under `key`, or `None` when absent or undecodable.
    fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_value(key)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("Discarding undecodable value under '{key}': {e}");
                None
            },
        }
    }

    /// Encode `value` and store it under `key`.
    fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let encoded = serde_json::to_value(value)?;
        self.set_value(key, encoded)
    }
}

impl<S: PersistentStore + ?Sized> StoreExt for S {}

/// Reject keys that cannot be stored.
pub(crate) fn check_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(FathomError::Store("empty key".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_get_default_when_absent() {
        let store = MemoryStore::new();
        let n: u32 = store.get("missing", 42);
        assert_eq!(n, 42);
    }

    #[test]
    fn typed_set_then_get() {
        let mut store = MemoryStore::new();
        store.set("count", &7u32).unwrap();
        assert_eq!(store.get("count", 0u32), 7);
    }

    #[test]
    fn mismatched_type_falls_back_to_default() {
        let mut store = MemoryStore::new();
        store.set("flag", "not a bool").unwrap();
        assert!(!store.get("flag", false));
        // The stored value itself is left alone.
        assert!(store.contains("flag"));
    }

    #[test]
    fn works_through_trait_object() {
        let mut store: Box<dyn PersistentStore> = Box::new(MemoryStore::new());
        store.set("greeting", "hello").unwrap();
        assert_eq!(store.get("greeting", String::new()), "hello");
    }

    #[test]
    fn empty_key_rejected() {
        let mut store = MemoryStore::new();
        assert!(store.set("  ", &1).is_err());
    }
}
