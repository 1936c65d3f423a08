//! Persistence port for the record store.
//!
//! The store never touches a database directly; it is handed something that
//! can load and save one opaque byte blob. [`LmdbSlot`] is the on-device
//! implementation and [`MemorySlot`] backs tests and hosts that keep their own
//! storage.

use std::cell::{Cell, RefCell};
use std::fs;
use std::rc::Rc;

use lmdb::{Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::app_response::AppResponse;
use crate::store_config::StoreConfig;

const SLOT_DB_NAME: &str = "coffee_note";

/// A single named storage location holding the whole serialized record list.
pub trait PersistenceSlot {
    /// Returns the stored bytes, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<Vec<u8>>, AppResponse>;

    /// Replaces the stored bytes.
    fn save(&self, bytes: &[u8]) -> Result<(), AppResponse>;
}

pub struct LmdbSlot {
    env: Environment,
    db: Database,
    slot_key: String,
}

impl LmdbSlot {
    pub fn open(config: &StoreConfig) -> Result<Self, AppResponse> {
        if config.slot_key.is_empty() {
            return Err(AppResponse::BadRequest("Slot key cannot be empty".to_string()));
        }

        let path = config.path.as_path();
        if !path.exists() {
            info!("Creating slot directory at: {}", path.display());
            fs::create_dir_all(path)
                .map_err(|e| AppResponse::DatabaseError(format!("Cannot create {}: {e}", path.display())))?;
        }

        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(config.map_size)
            .open(path)?;
        let db = env.create_db(Some(SLOT_DB_NAME), DatabaseFlags::empty())?;

        info!("Opened slot '{}' in {}", config.slot_key, path.display());

        Ok(Self {
            env,
            db,
            slot_key: config.slot_key.clone(),
        })
    }

    /// Flushes LMDB buffers to disk.
    pub fn sync(&self) -> Result<(), AppResponse> {
        self.env.sync(true)?;
        Ok(())
    }
}

impl PersistenceSlot for LmdbSlot {
    fn load(&self) -> Result<Option<Vec<u8>>, AppResponse> {
        let txn = self.env.begin_ro_txn()?;
        let bytes = match txn.get(self.db, &self.slot_key) {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(AppResponse::from(e)),
        };
        txn.commit()?;

        debug!("Slot '{}' read: {:?} bytes", self.slot_key, bytes.as_ref().map(Vec::len));
        Ok(bytes)
    }

    fn save(&self, bytes: &[u8]) -> Result<(), AppResponse> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(self.db, &self.slot_key, &bytes, WriteFlags::empty())?;
        txn.commit()?;

        debug!("Slot '{}' written: {} bytes", self.slot_key, bytes.len());
        Ok(())
    }
}

impl Drop for LmdbSlot {
    fn drop(&mut self) {
        if let Err(e) = self.env.sync(true) {
            warn!("Failed to sync slot '{}' on close: {e:?}", self.slot_key);
        }
    }
}

/// In-process slot. Clones share the same storage, so dropping a store and
/// building a new one over a clone behaves like an app restart.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    bytes: Rc<RefCell<Option<Vec<u8>>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let slot = Self::default();
        *slot.bytes.borrow_mut() = Some(bytes.into());
        slot
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.bytes.borrow().clone()
    }

    /// Makes every following `save` fail, for exercising write-failure paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl PersistenceSlot for MemorySlot {
    fn load(&self) -> Result<Option<Vec<u8>>, AppResponse> {
        Ok(self.bytes.borrow().clone())
    }

    fn save(&self, bytes: &[u8]) -> Result<(), AppResponse> {
        if self.fail_writes.get() {
            return Err(AppResponse::DatabaseError("Memory slot is read-only".to_string()));
        }
        *self.bytes.borrow_mut() = Some(bytes.to_vec());
        Ok(())
    }
}
