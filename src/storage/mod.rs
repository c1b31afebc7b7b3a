//! Save-game persistence.
//!
//! The engine speaks to persistence through the minimal [`SaveStore`]
//! contract: string keys, string values, `get`/`set`/`remove`. JSON helpers
//! are layered on top for structured payloads. Writes are fire-and-forget:
//! a backend that cannot persist logs the failure and the game carries on
//! in "no save" mode, and play behaves identically either way.
//!
//! Two backends ship with the crate: [`SledSaveStore`] over an embedded
//! sled tree, and [`MemorySaveStore`] for tests and ephemeral sessions.

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::engine::errors::EngineError;

/// Save key: the serialized location graph.
pub const SAVE_KEY_LOCATIONS: &str = "locations";
/// Save key: the serialized inventory.
pub const SAVE_KEY_INVENTORY: &str = "inventory";
/// Save key: the player's current location id.
pub const SAVE_KEY_LOCATION: &str = "current_location";

/// Abstract key/value contract the engine saves through.
pub trait SaveStore {
    fn get(&self, key: &str) -> Option<String>;
    /// Store a value. Failures are the backend's problem: log and move on.
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// Decode a JSON value stored under `key`. Undecodable payloads are logged
/// and read as absent.
pub fn get_json<T: DeserializeOwned>(store: &dyn SaveStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("stored value under '{}' is not valid JSON: {}", key, e);
            None
        }
    }
}

/// Encode a value as JSON under `key`.
pub fn set_json<T: Serialize>(store: &mut dyn SaveStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(e) => warn!("could not encode value for '{}': {}", key, e),
    }
}

/// In-memory store: useful in tests and for explicit no-persistence runs.
#[derive(Debug, Default, Clone)]
pub struct MemorySaveStore {
    values: HashMap<String, String>,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemorySaveStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Sled-backed store. Each game gets its own database directory.
pub struct SledSaveStore {
    db: sled::Db,
}

impl SledSaveStore {
    /// Open (creating if needed) a save database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let db = sled::open(path.as_ref())?;
        debug!("save store opened at {}", path.as_ref().display());
        Ok(Self { db })
    }
}

impl SaveStore for SledSaveStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.db.get(key) {
            Ok(Some(bytes)) => match String::from_utf8(bytes.to_vec()) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("save value under '{}' is not utf-8: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("save read for '{}' failed: {}", key, e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(e) = self.db.insert(key, value.as_bytes()) {
            warn!("save write for '{}' failed: {}", key, e);
        }
        if let Err(e) = self.db.flush() {
            warn!("save flush failed: {}", e);
        }
    }

    fn remove(&mut self, key: &str) {
        if let Err(e) = self.db.remove(key) {
            warn!("save removal for '{}' failed: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemorySaveStore::new();
        assert_eq!(store.get("missing"), None);

        store.set("k", "v");
        assert_eq!(store.get("k").as_deref(), Some("v"));

        store.remove("k");
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn json_helpers_round_trip_and_degrade() {
        let mut store = MemorySaveStore::new();
        set_json(&mut store, "nums", &vec![1u32, 2, 3]);
        let back: Vec<u32> = get_json(&store, "nums").unwrap();
        assert_eq!(back, vec![1, 2, 3]);

        store.set("broken", "{not json");
        let missing: Option<Vec<u32>> = get_json(&store, "broken");
        assert!(missing.is_none());
    }

    #[test]
    fn sled_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SledSaveStore::open(dir.path()).unwrap();
        store.set("current_location", "hallway");
        assert_eq!(store.get("current_location").as_deref(), Some("hallway"));
        store.remove("current_location");
        assert_eq!(store.get("current_location"), None);
    }
}
