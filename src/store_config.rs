use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SLOT_KEY: &str = "coffee_places";
pub const DEFAULT_MAP_SIZE: usize = 64 * 1024 * 1024;

/// Where and how the LMDB-backed slot is opened.
///
/// Hosts usually pass only a name over FFI ([`StoreConfig::named`]); a JSON
/// document may override any field, missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Environment directory. Created on open if missing.
    pub path: PathBuf,
    /// Key of the single slot holding the serialized record list.
    pub slot_key: String,
    /// LMDB map size in bytes. Photos are stored inline, so this bounds the
    /// total size of the journal.
    pub map_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            path: PathBuf::from("coffee_note.lmdb"),
            slot_key: DEFAULT_SLOT_KEY.to_string(),
            map_size: DEFAULT_MAP_SIZE,
        }
    }
}

impl StoreConfig {
    /// Config for `<name>.lmdb`, the same naming the FFI `create_store` uses.
    pub fn named(name: &str) -> Self {
        StoreConfig {
            path: PathBuf::from(format!("{name}.lmdb")),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, crate::app_response::AppResponse> {
        Ok(serde_json::from_str(json)?)
    }
}
