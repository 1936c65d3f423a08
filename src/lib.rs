//! # CoffeeNote Core
//!
//! Local storage and list state for the CoffeeNote coffee-visit journal,
//! built to be linked into the iOS app and driven over a C ABI. Records are
//! kept in memory in display order and mirrored to a single LMDB slot after
//! every change.
//!
//! ## Features
//!
//! - **Stable record ids**: edit and delete resolve by id, never by a stale row index
//! - **Whole-list persistence**: every mutation re-encodes the list as one JSON document
//! - **Failure atomicity**: a write that fails leaves memory and disk untouched
//! - **Injectable storage**: [`persistence_slot::PersistenceSlot`] has LMDB and in-memory implementations
//! - **Safe error handling**: no `unwrap()` calls in production code
//!
//! ## Quick Start
//!
//! ```no_run
//! use coffee_note_core::{add_record, create_store, free_response, record_count};
//! use std::ffi::CString;
//!
//! let name = CString::new("coffee_note").unwrap();
//! let state = create_store(name.as_ptr());
//!
//! let json = CString::new(r#"{"name":"Blue Bottle","rating":4.5,"item":"Latte","price":5.25}"#).unwrap();
//! let response = add_record(state, json.as_ptr());
//! free_response(response);
//!
//! assert_eq!(record_count(state), 1);
//! ```
//!
//! ## FFI Functions
//!
//! - [`create_store`] / [`create_store_with_config`] - Open the journal
//! - [`add_record`] / [`add_record_from_form`] - Append a visit
//! - [`get_all_records`] / [`get_record_at`] / [`record_count`] - Read the list
//! - [`update_record_at`] / [`update_record`] - Replace a visit
//! - [`delete_record_at`] / [`delete_record`] - Remove a visit
//! - [`clear_all_records`] - Remove every visit
//! - [`reload_store`] - Re-read the slot
//! - [`close_store`] - Release the handle
//! - [`free_response`] - Release a returned string

pub mod app_response;
pub mod coffee_place_form;
pub mod coffee_place_model;
pub mod list_presenter;
pub mod persistence_slot;
pub mod record_store;
pub mod reminder;
pub mod store_config;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};

use crate::app_response::AppResponse;
use crate::coffee_place_form::CoffeePlaceForm;
use crate::coffee_place_model::{CoffeePlace, CoffeePlaceRecord, RecordId};
use crate::list_presenter::ListPresenter;
use crate::persistence_slot::LmdbSlot;
use crate::record_store::LoadOutcome;
use crate::reminder::LogReminderService;
use crate::store_config::StoreConfig;

/// Handle returned to the host. Owns the presenter and, through it, the store.
pub type CoffeeNoteState = ListPresenter<LmdbSlot>;

/// Opens (or creates) the journal stored in `<name>.lmdb`.
///
/// The store is hydrated immediately and the launch reminder is requested.
/// Unreadable slot contents are logged and the journal starts empty.
///
/// # Parameters
///
/// * `name` - A null-terminated C string with the journal name, without extension
///
/// # Returns
///
/// A pointer to the [`CoffeeNoteState`], or null on failure. Release it with
/// [`close_store`].
///
/// # Safety
///
/// `name` must be null or point to a valid null-terminated string.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use coffee_note_core::{close_store, create_store, free_response};
///
/// let name = CString::new("coffee_note").unwrap();
/// let state = create_store(name.as_ptr());
///
/// if !state.is_null() {
///     free_response(close_store(state));
/// }
/// ```
///
/// # Errors
///
/// Returns a null pointer if:
/// - `name` is null
/// - `name` is not valid UTF-8
/// - The LMDB environment cannot be created or opened
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store(name: *const c_char) -> *mut CoffeeNoteState {
    if name.is_null() {
        warn!("Null name pointer passed to create_store");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    open_state(StoreConfig::named(name_str))
}

/// Opens the journal described by a JSON [`StoreConfig`].
///
/// # Parameters
///
/// * `config_json` - Null-terminated JSON, e.g.
///   `{"path": "/var/mobile/.../journal.lmdb", "slot_key": "coffee_places"}`.
///   Missing fields keep their defaults.
///
/// # Returns
///
/// A pointer to the [`CoffeeNoteState`], or null if the pointer is null, the
/// JSON does not describe a config, or the environment cannot be opened.
///
/// # Safety
///
/// `config_json` must be null or point to a valid null-terminated string.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store_with_config(config_json: *const c_char) -> *mut CoffeeNoteState {
    if config_json.is_null() {
        warn!("Null config pointer passed to create_store_with_config");
        return std::ptr::null_mut();
    }

    let json = match unsafe { CStr::from_ptr(config_json).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in config parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    match StoreConfig::from_json(json) {
        Ok(config) => open_state(config),
        Err(e) => {
            warn!("Rejected store config: {e}");
            std::ptr::null_mut()
        }
    }
}

fn open_state(config: StoreConfig) -> *mut CoffeeNoteState {
    info!("Attempting to open journal at: {}", config.path.display());

    match LmdbSlot::open(&config) {
        Ok(slot) => {
            let (presenter, outcome) = ListPresenter::launch(slot, &LogReminderService);
            if let LoadOutcome::Discarded(e) = &outcome {
                warn!("Journal at {} started empty: {e}", config.path.display());
            }
            info!("✅ Journal opened with {} records", presenter.item_count());
            Box::into_raw(Box::new(presenter))
        }
        Err(e) => {
            warn!("❌ Failed to open journal: {e}");
            warn!("Attempted path: {}", config.path.display());
            std::ptr::null_mut()
        }
    }
}

/// Appends a visit to the end of the journal.
///
/// No range checks are applied; use [`add_record_from_form`] for raw form
/// input. Ratings and prices must still be finite numbers.
///
/// # Parameters
///
/// * `state` - Pointer returned by [`create_store`]
/// * `json_ptr` - Null-terminated `CoffeePlace` JSON
///
/// # Returns
///
/// A JSON [`AppResponse`] string. `Ok` carries the stored record including
/// its new id. The string must be released with [`free_response`].
///
/// # Safety
///
/// Both pointers must be null or valid.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use coffee_note_core::{add_record, create_store, free_response};
///
/// let name = CString::new("coffee_note").unwrap();
/// let state = create_store(name.as_ptr());
///
/// let json = CString::new(r#"{"name":"Blue Bottle","rating":4.5,"item":"Latte","price":5.25}"#).unwrap();
/// free_response(add_record(state, json.as_ptr()));
/// ```
///
/// # JSON Format
///
/// ```json
/// {
///   "name": "Blue Bottle",
///   "rating": 4.5,
///   "item": "Latte",
///   "price": 5.25,
///   "photoBytes": "<optional base64>"
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn add_record(state: *mut CoffeeNoteState, json_ptr: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return response_to_c_string(&AppResponse::BadRequest("Null state pointer passed to add_record".to_string())),
    };

    let place: CoffeePlace = match parse_json(json_ptr, "JSON") {
        Ok(place) => place,
        Err(err) => return err,
    };

    let response = state
        .on_add_submitted(place)
        .and_then(|_| last_record(state))
        .and_then(record_payload);
    result_to_c_string(response)
}

/// Validates raw form input before appending it.
///
/// # Parameters
///
/// * `state` - Pointer returned by [`create_store`]
/// * `json_ptr` - Null-terminated JSON with `name`, `rating`, `item`, `price`
///   as strings exactly as typed, plus optional base64 `photoBytes`
///
/// # Returns
///
/// `Ok` with the stored record, or a `ValidationError` naming the first field
/// that failed. Nothing is stored on a validation error.
///
/// # Safety
///
/// Both pointers must be null or valid.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn add_record_from_form(state: *mut CoffeeNoteState, json_ptr: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return response_to_c_string(&AppResponse::BadRequest("Null state pointer passed to add_record_from_form".to_string())),
    };

    let form: CoffeePlaceForm = match parse_json(json_ptr, "form") {
        Ok(form) => form,
        Err(err) => return err,
    };

    let response = state
        .on_add_form_submitted(&form)
        .and_then(|_| last_record(state))
        .and_then(record_payload);
    result_to_c_string(response)
}

/// Returns the whole journal as a JSON array, in display order.
///
/// # Parameters
///
/// * `state` - Pointer returned by [`create_store`]
///
/// # Returns
///
/// `Ok` whose payload is the serialized record array.
///
/// # Safety
///
/// `state` must be null or a live handle.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_all_records(state: *mut CoffeeNoteState) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return response_to_c_string(&AppResponse::BadRequest("Null state pointer passed to get_all_records".to_string())),
    };

    let response = serde_json::to_string(state.store().records())
        .map(AppResponse::Ok)
        .map_err(|e| AppResponse::EncodeError(format!("Error serializing records: {e}")));
    result_to_c_string(response)
}

/// Returns the record shown at row `index`.
///
/// # Parameters
///
/// * `state` - Pointer returned by [`create_store`]
/// * `index` - Zero-based row
///
/// # Returns
///
/// `Ok` with the record, or `IndexOutOfRange` when `index >= record_count`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_record_at(state: *mut CoffeeNoteState, index: usize) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return response_to_c_string(&AppResponse::BadRequest("Null state pointer passed to get_record_at".to_string())),
    };

    result_to_c_string(state.item_at(index).and_then(record_payload))
}

/// Number of rows in the journal.
///
/// # Returns
///
/// The row count, or `-1` when `state` is null.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn record_count(state: *mut CoffeeNoteState) -> i64 {
    match unsafe { state.as_ref() } {
        Some(s) => s.item_count() as i64,
        None => {
            warn!("Null state pointer passed to record_count");
            -1
        }
    }
}

/// Replaces the visit shown at row `index`. The record keeps its id and row.
///
/// # Parameters
///
/// * `state` - Pointer returned by [`create_store`]
/// * `index` - Zero-based row being edited
/// * `json_ptr` - Null-terminated `CoffeePlace` JSON, same format as [`add_record`]
///
/// # Returns
///
/// `Ok` with the updated record, `IndexOutOfRange` for a stale row, or the
/// error that prevented the write. On error the journal is unchanged.
///
/// # Safety
///
/// Both pointers must be null or valid.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_record_at(state: *mut CoffeeNoteState, index: usize, json_ptr: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return response_to_c_string(&AppResponse::BadRequest("Null state pointer passed to update_record_at".to_string())),
    };

    let place: CoffeePlace = match parse_json(json_ptr, "JSON") {
        Ok(place) => place,
        Err(err) => return err,
    };

    let response = state
        .on_edit_submitted(index, place)
        .and_then(|_| state.item_at(index))
        .and_then(record_payload);
    result_to_c_string(response)
}

/// Replaces the visit with the given id.
///
/// # Parameters
///
/// * `state` - Pointer returned by [`create_store`]
/// * `id` - Null-terminated record id as returned in a record's `id` field
/// * `json_ptr` - Null-terminated `CoffeePlace` JSON
///
/// # Returns
///
/// `Ok` with the updated record, `BadRequest` for a malformed id, or
/// `NotFound` if no record has that id.
///
/// # Safety
///
/// All pointers must be null or valid.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_record(state: *mut CoffeeNoteState, id: *const c_char, json_ptr: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return response_to_c_string(&AppResponse::BadRequest("Null state pointer passed to update_record".to_string())),
    };

    let id = match parse_id(id) {
        Ok(id) => id,
        Err(err) => return err,
    };

    let place: CoffeePlace = match parse_json(json_ptr, "JSON") {
        Ok(place) => place,
        Err(err) => return err,
    };

    let store = state.store_mut();
    let response = store.update(id, place).and_then(|_| {
        store
            .get(id)
            .ok_or_else(|| AppResponse::NotFound(format!("No record found with id: {id}")))
            .and_then(record_payload)
    });
    result_to_c_string(response)
}

/// Removes the visit shown at row `index`.
///
/// # Parameters
///
/// * `state` - Pointer returned by [`create_store`]
/// * `index` - Zero-based row being swiped away
///
/// # Returns
///
/// `Ok` on success or `IndexOutOfRange` for a stale row.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_record_at(state: *mut CoffeeNoteState, index: usize) -> *const c_char {
    let state = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return response_to_c_string(&AppResponse::BadRequest("Null state pointer passed to delete_record_at".to_string())),
    };

    let response = state
        .on_delete_requested(index)
        .map(|_| AppResponse::success("Record deleted successfully"));
    result_to_c_string(response)
}

/// Removes the visit with the given id.
///
/// # Returns
///
/// `Ok` on success, `BadRequest` for a malformed id, `NotFound` otherwise.
///
/// # Safety
///
/// Both pointers must be null or valid.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_record(state: *mut CoffeeNoteState, id: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return response_to_c_string(&AppResponse::BadRequest("Null state pointer passed to delete_record".to_string())),
    };

    let id = match parse_id(id) {
        Ok(id) => id,
        Err(err) => return err,
    };

    let response = state
        .store_mut()
        .delete(id)
        .map(|_| AppResponse::success("Record deleted successfully"));
    result_to_c_string(response)
}

/// Removes every visit and reports how many were removed.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_all_records(state: *mut CoffeeNoteState) -> *const c_char {
    let state = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return response_to_c_string(&AppResponse::BadRequest("Null state pointer passed to clear_all_records".to_string())),
    };

    let response = state
        .on_clear_requested()
        .map(|count| AppResponse::success(format!("{count} records cleared")));
    result_to_c_string(response)
}

/// Re-reads the slot, replacing the in-memory list. Undecodable contents are
/// reported as a `DecodeError` response and the journal is left empty.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn reload_store(state: *mut CoffeeNoteState) -> *const c_char {
    let state = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return response_to_c_string(&AppResponse::BadRequest("Null state pointer passed to reload_store".to_string())),
    };

    let response = match state.reload() {
        LoadOutcome::Missing => AppResponse::success("0"),
        LoadOutcome::Loaded(count) => AppResponse::success(count.to_string()),
        LoadOutcome::Discarded(e) => e,
    };
    response_to_c_string(&response)
}

/// Syncs and releases the handle.
///
/// # Parameters
///
/// * `state` - Pointer returned by [`create_store`]
///
/// # Returns
///
/// `Ok` once the environment was flushed, or the sync error. The handle is
/// released either way.
///
/// # Safety
///
/// `state` must be null or a live handle, and must not be used afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_store(state: *mut CoffeeNoteState) -> *const c_char {
    if state.is_null() {
        return response_to_c_string(&AppResponse::BadRequest("Null state pointer passed to close_store".to_string()));
    }

    let state = unsafe { Box::from_raw(state) };
    let response = match state.store().slot().sync() {
        Ok(()) => AppResponse::success("Journal closed successfully"),
        Err(e) => e,
    };
    drop(state);
    response_to_c_string(&response)
}

/// Releases a string returned by any function in this module.
///
/// # Safety
///
/// `ptr` must be null or a string returned by this library that was not
/// already freed.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

fn last_record<S>(state: &ListPresenter<S>) -> Result<&CoffeePlaceRecord, AppResponse>
where
    S: crate::persistence_slot::PersistenceSlot,
{
    state.item_at(state.item_count().saturating_sub(1))
}

fn record_payload(record: &CoffeePlaceRecord) -> Result<AppResponse, AppResponse> {
    serde_json::to_string(record)
        .map(AppResponse::Ok)
        .map_err(|e| AppResponse::EncodeError(format!("Error serializing record: {e}")))
}

fn parse_json<T: serde::de::DeserializeOwned>(ptr: *const c_char, field_name: &str) -> Result<T, *const c_char> {
    let json = c_ptr_to_string(ptr, field_name)?;
    serde_json::from_str(&json).map_err(|e| {
        let error = AppResponse::DecodeError(format!("Invalid {field_name}: {e}"));
        response_to_c_string(&error)
    })
}

fn parse_id(ptr: *const c_char) -> Result<RecordId, *const c_char> {
    let id = c_ptr_to_string(ptr, "id")?;
    id.parse::<RecordId>().map_err(|e| response_to_c_string(&e))
}

fn result_to_c_string(result: Result<AppResponse, AppResponse>) -> *const c_char {
    match result {
        Ok(response) | Err(response) => response_to_c_string(&response),
    }
}

/// Serializes an [`AppResponse`] into a C string owned by the caller.
/// Returns null if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a Rust `String`, turning null pointers and
/// invalid UTF-8 into a `BadRequest` response ready to hand back to the caller.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
