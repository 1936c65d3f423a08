//! List-state half of the journal screen.
//!
//! The presenter owns the [`RecordStore`], hands out read-only rows for the
//! table view, and turns positional gestures (swipe, tap, form submit) into
//! id-based store calls. Each successful intent returns the [`RowChange`] the
//! view should animate.

use log::{debug, info};

use crate::app_response::AppResponse;
use crate::coffee_place_form::CoffeePlaceForm;
use crate::coffee_place_model::{CoffeePlace, CoffeePlaceRecord};
use crate::persistence_slot::PersistenceSlot;
use crate::record_store::{LoadOutcome, RecordStore};
use crate::reminder::{Reminder, ReminderService};

/// Visual update the caller applies after an intent succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    Appended(usize),
    Refreshed(usize),
    Removed(usize),
}

/// Display-ready projection of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    pub title: String,
    pub subtitle: String,
    pub has_photo: bool,
}

impl From<&CoffeePlaceRecord> for ListRow {
    fn from(record: &CoffeePlaceRecord) -> Self {
        let place = &record.place;
        ListRow {
            title: format!("{} - Rating: {}", place.name, place.rating),
            subtitle: format!("{} · ${:.2}", place.item, place.price),
            has_photo: place.photo.is_some(),
        }
    }
}

pub struct ListPresenter<S: PersistenceSlot> {
    store: RecordStore<S>,
}

impl<S: PersistenceSlot> ListPresenter<S> {
    pub fn new(store: RecordStore<S>) -> Self {
        ListPresenter { store }
    }

    /// Opens the store over `slot` and schedules the launch reminder.
    /// The reminder is fire-and-forget; nothing is read back from the service.
    pub fn launch(slot: S, reminders: &dyn ReminderService) -> (Self, LoadOutcome) {
        let (store, outcome) = RecordStore::open(slot);
        info!("Presenter launched with {} records ({:?})", store.len(), outcome);
        reminders.schedule(&Reminder::coffee_visit());
        (Self::new(store), outcome)
    }

    pub fn reload(&mut self) -> LoadOutcome {
        self.store.load()
    }

    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    pub fn item_count(&self) -> usize {
        self.store.len()
    }

    pub fn item_at(&self, index: usize) -> Result<&CoffeePlaceRecord, AppResponse> {
        self.store.get_at(index)
    }

    pub fn row_at(&self, index: usize) -> Result<ListRow, AppResponse> {
        self.item_at(index).map(ListRow::from)
    }

    pub fn rows(&self) -> Vec<ListRow> {
        self.store.records().iter().map(ListRow::from).collect()
    }

    pub fn on_add_submitted(&mut self, place: CoffeePlace) -> Result<RowChange, AppResponse> {
        self.store.add(place)?;
        let index = self.store.len() - 1;
        debug!("Row appended at {index}");
        Ok(RowChange::Appended(index))
    }

    pub fn on_edit_submitted(&mut self, index: usize, place: CoffeePlace) -> Result<RowChange, AppResponse> {
        let id = self.item_at(index)?.id;
        self.store.update(id, place)?;
        debug!("Row refreshed at {index}");
        Ok(RowChange::Refreshed(index))
    }

    pub fn on_delete_requested(&mut self, index: usize) -> Result<RowChange, AppResponse> {
        let id = self.item_at(index)?.id;
        self.store.delete(id)?;
        debug!("Row removed at {index}");
        Ok(RowChange::Removed(index))
    }

    /// Validates the form before adding. An invalid form leaves the store as is.
    pub fn on_add_form_submitted(&mut self, form: &CoffeePlaceForm) -> Result<RowChange, AppResponse> {
        let place = form.validate()?;
        self.on_add_submitted(place)
    }

    pub fn on_edit_form_submitted(&mut self, index: usize, form: &CoffeePlaceForm) -> Result<RowChange, AppResponse> {
        let place = form.validate()?;
        self.on_edit_submitted(index, place)
    }

    pub fn on_clear_requested(&mut self) -> Result<usize, AppResponse> {
        self.store.clear()
    }

    pub(crate) fn store_mut(&mut self) -> &mut RecordStore<S> {
        &mut self.store
    }
}
