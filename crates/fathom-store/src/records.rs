//! Persisted record types and their typed accessors.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use fathom_types::error::Result;

use crate::{PersistentStore, StoreExt, keys};

/// Clearance level granted to the facility administrator.
pub const ADMIN_CLEARANCE: u8 = 5;

/// The facility administrator account, created once during installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredential {
    pub username: String,
    pub password: String,
    pub clearance_level: u8,
    /// Seconds since the Unix epoch.
    pub created_at: u64,
    /// Name shown on the login screen, if different from `username`.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl AdminCredential {
    /// Build a credential stamped with the current wall-clock time.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let created_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            username: username.into(),
            password: password.into(),
            clearance_level: ADMIN_CLEARANCE,
            created_at,
            display_name: None,
        }
    }

    /// Name to greet the administrator with.
    pub fn greeting_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    /// Whether `supplied` matches the stored password.
    pub fn verify(&self, supplied: &str) -> bool {
        self.password == supplied
    }

    /// Read the persisted credential, if one exists.
    pub fn load(store: &dyn PersistentStore) -> Option<Self> {
        store.get_opt(keys::ADMIN_CREDENTIAL)
    }

    /// Persist this credential, replacing any existing one.
    pub fn save(&self, store: &mut dyn PersistentStore) -> Result<()> {
        store.set(keys::ADMIN_CREDENTIAL, self)
    }
}

/// Grid cell occupied by a desktop icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconCell {
    pub col: u16,
    pub row: u16,
}

/// Desktop icon positions keyed by application id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconLayout {
    pub cells: BTreeMap<String, IconCell>,
}

impl IconLayout {
    /// Read the persisted layout, or an empty one.
    pub fn load(store: &dyn PersistentStore) -> Self {
        store.get(keys::ICON_LAYOUT, Self::default())
    }

    /// Persist this layout.
    pub fn save(&self, store: &mut dyn PersistentStore) -> Result<()> {
        store.set(keys::ICON_LAYOUT, self)
    }

    /// Move an icon. If another icon already occupies the target cell the
    /// two swap places.
    pub fn place(&mut self, app_id: &str, cell: IconCell) {
        let previous = self.cells.get(app_id).copied();
        let occupant = self
            .cells
            .iter()
            .find(|(id, c)| **c == cell && id.as_str() != app_id)
            .map(|(id, _)| id.clone());
        if let Some(other) = occupant {
            match previous {
                Some(prev) => {
                    self.cells.insert(other, prev);
                },
                None => {
                    self.cells.remove(&other);
                },
            }
        }
        self.cells.insert(app_id.to_string(), cell);
    }

    /// Cell of an icon, if placed.
    pub fn cell_of(&self, app_id: &str) -> Option<IconCell> {
        self.cells.get(app_id).copied()
    }
}

/// Read an application's saved state, or `default`.
pub fn load_app_state<T: DeserializeOwned>(
    store: &dyn PersistentStore,
    app_id: &str,
    default: T,
) -> T {
    store.get(&keys::app_state_key(app_id), default)
}

/// Persist an application's state blob.
pub fn save_app_state<T: Serialize>(
    store: &mut dyn PersistentStore,
    app_id: &str,
    state: &T,
) -> Result<()> {
    store.set(&keys::app_state_key(app_id), state)
}

/// Drop an application's saved state.
pub fn clear_app_state(store: &mut dyn PersistentStore, app_id: &str) -> Result<()> {
    store.remove(&keys::app_state_key(app_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn credential_roundtrip_through_store() {
        let mut store = MemoryStore::new();
        assert!(AdminCredential::load(&store).is_none());
        let cred = AdminCredential::new("warden", "tethys");
        cred.save(&mut store).unwrap();
        let loaded = AdminCredential::load(&store).unwrap();
        assert_eq!(loaded, cred);
        assert_eq!(loaded.clearance_level, ADMIN_CLEARANCE);
    }

    #[test]
    fn credential_verify() {
        let cred = AdminCredential::new("warden", "tethys");
        assert!(cred.verify("tethys"));
        assert!(!cred.verify("Tethys"));
        assert!(!cred.verify(""));
    }

    #[test]
    fn greeting_prefers_display_name() {
        let mut cred = AdminCredential::new("warden", "pw");
        assert_eq!(cred.greeting_name(), "warden");
        cred.display_name = Some("Dr. Okafor".to_string());
        assert_eq!(cred.greeting_name(), "Dr. Okafor");
    }

    #[test]
    fn credential_without_display_name_field_decodes() {
        let mut store = MemoryStore::new();
        store
            .set_value(
                keys::ADMIN_CREDENTIAL,
                serde_json::json!({
                    "username": "warden",
                    "password": "pw",
                    "clearance_level": 5,
                    "created_at": 0
                }),
            )
            .unwrap();
        let cred = AdminCredential::load(&store).unwrap();
        assert!(cred.display_name.is_none());
    }

    #[test]
    fn icon_place_into_empty_cell() {
        let mut layout = IconLayout::default();
        layout.place("terminal", IconCell { col: 0, row: 0 });
        assert_eq!(layout.cell_of("terminal"), Some(IconCell { col: 0, row: 0 }));
    }

    #[test]
    fn icon_place_swaps_with_occupant() {
        let mut layout = IconLayout::default();
        layout.place("terminal", IconCell { col: 0, row: 0 });
        layout.place("files", IconCell { col: 1, row: 0 });
        layout.place("files", IconCell { col: 0, row: 0 });
        assert_eq!(layout.cell_of("files"), Some(IconCell { col: 0, row: 0 }));
        assert_eq!(layout.cell_of("terminal"), Some(IconCell { col: 1, row: 0 }));
    }

    #[test]
    fn icon_place_unplaced_evicts_occupant() {
        let mut layout = IconLayout::default();
        layout.place("terminal", IconCell { col: 0, row: 0 });
        layout.place("files", IconCell { col: 0, row: 0 });
        assert_eq!(layout.cell_of("files"), Some(IconCell { col: 0, row: 0 }));
        assert!(layout.cell_of("terminal").is_none());
    }

    #[test]
    fn icon_layout_persists() {
        let mut store = MemoryStore::new();
        let mut layout = IconLayout::default();
        layout.place("camera", IconCell { col: 2, row: 3 });
        layout.save(&mut store).unwrap();
        assert_eq!(IconLayout::load(&store), layout);
    }

    #[test]
    fn app_state_helpers() {
        let mut store = MemoryStore::new();
        assert_eq!(load_app_state(&store, "calculator", 0.0f64), 0.0);
        save_app_state(&mut store, "calculator", &12.5f64).unwrap();
        assert_eq!(load_app_state(&store, "calculator", 0.0f64), 12.5);
        clear_app_state(&mut store, "calculator").unwrap();
        assert_eq!(load_app_state(&store, "calculator", -1.0f64), -1.0);
    }
}
