//! The authoritative, ordered list of coffee-place records.
//!
//! [`RecordStore`] keeps the list in memory and mirrors it to a
//! [`PersistenceSlot`] after every mutation by re-encoding the whole list.
//! A mutation whose write fails is undone, so callers either see the change
//! both in memory and in the slot, or not at all.

use log::{debug, info, warn};

use crate::app_response::AppResponse;
use crate::coffee_place_model::{decode_records, encode_records, CoffeePlace, CoffeePlaceRecord, RecordId};
use crate::persistence_slot::PersistenceSlot;

/// What [`RecordStore::load`] found in the slot.
///
/// Loading never fails: unreadable contents are reported here and the store
/// starts empty.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Missing,
    Loaded(usize),
    Discarded(AppResponse),
}

pub struct RecordStore<S: PersistenceSlot> {
    slot: S,
    records: Vec<CoffeePlaceRecord>,
}

impl<S: PersistenceSlot> RecordStore<S> {
    /// Builds a store over `slot` and hydrates it.
    pub fn open(slot: S) -> (Self, LoadOutcome) {
        let mut store = RecordStore { slot, records: Vec::new() };
        let outcome = store.load();
        (store, outcome)
    }

    pub fn load(&mut self) -> LoadOutcome {
        let bytes = match self.slot.load() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                info!("Record slot is empty, starting with no records");
                self.records.clear();
                return LoadOutcome::Missing;
            }
            Err(e) => {
                warn!("Could not read record slot, starting empty: {e}");
                self.records.clear();
                return LoadOutcome::Discarded(e);
            }
        };

        match decode_records(&bytes) {
            Ok(records) => {
                info!("Loaded {} records", records.len());
                self.records = records;
                LoadOutcome::Loaded(self.records.len())
            }
            Err(e) => {
                warn!("Discarding undecodable record slot ({} bytes): {e}", bytes.len());
                self.records.clear();
                LoadOutcome::Discarded(e)
            }
        }
    }

    /// Writes the full list to the slot.
    pub fn persist(&self) -> Result<(), AppResponse> {
        let result = encode_records(&self.records).and_then(|bytes| self.slot.save(&bytes));
        match &result {
            Ok(()) => debug!("Persisted {} records", self.records.len()),
            Err(e) => warn!("Dropped write of {} records: {e}", self.records.len()),
        }
        result
    }

    pub fn records(&self) -> &[CoffeePlaceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&CoffeePlaceRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn get_at(&self, index: usize) -> Result<&CoffeePlaceRecord, AppResponse> {
        self.records.get(index).ok_or(AppResponse::IndexOutOfRange { index, len: self.records.len() })
    }

    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    /// Appends `place` under a freshly assigned id. Values are stored as given.
    pub fn add(&mut self, place: CoffeePlace) -> Result<&CoffeePlaceRecord, AppResponse> {
        self.records.push(CoffeePlaceRecord::new(place));

        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }

        let index = self.records.len() - 1;
        Ok(&self.records[index])
    }

    /// Replaces the fields of record `id`, keeping its id and position.
    /// Returns the previous fields.
    pub fn update(&mut self, id: RecordId, place: CoffeePlace) -> Result<CoffeePlace, AppResponse> {
        let index = self.require_position(id)?;
        self.update_at(index, place)
    }

    pub fn update_at(&mut self, index: usize, place: CoffeePlace) -> Result<CoffeePlace, AppResponse> {
        let len = self.records.len();
        let record = self.records.get_mut(index).ok_or(AppResponse::IndexOutOfRange { index, len })?;
        let previous = std::mem::replace(&mut record.place, place);

        if let Err(e) = self.persist() {
            self.records[index].place = previous;
            return Err(e);
        }

        Ok(previous)
    }

    /// Removes record `id` and returns it.
    pub fn delete(&mut self, id: RecordId) -> Result<CoffeePlaceRecord, AppResponse> {
        let index = self.require_position(id)?;
        self.delete_at(index)
    }

    pub fn delete_at(&mut self, index: usize) -> Result<CoffeePlaceRecord, AppResponse> {
        let len = self.records.len();
        if index >= len {
            return Err(AppResponse::IndexOutOfRange { index, len });
        }
        let removed = self.records.remove(index);

        if let Err(e) = self.persist() {
            self.records.insert(index, removed);
            return Err(e);
        }

        Ok(removed)
    }

    /// Removes every record. Returns how many were removed.
    pub fn clear(&mut self) -> Result<usize, AppResponse> {
        let previous = std::mem::take(&mut self.records);

        if let Err(e) = self.persist() {
            self.records = previous;
            return Err(e);
        }

        info!("Cleared {} records", previous.len());
        Ok(previous.len())
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    fn require_position(&self, id: RecordId) -> Result<usize, AppResponse> {
        self.position(id)
            .ok_or_else(|| AppResponse::NotFound(format!("No record found with id: {id}")))
    }
}
