//! Data model for logged coffee-place visits.
//!
//! A [`CoffeePlace`] holds what the user typed into the form. Once the record
//! store accepts it, it is wrapped in a [`CoffeePlaceRecord`] that carries a
//! stable [`RecordId`]. The whole ordered list is persisted as one JSON array,
//! see [`encode_records`] and [`decode_records`].

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_response::AppResponse;

/// Stable identifier assigned to a record when it is first added.
///
/// Positions in the list shift on delete, so edit and delete resolve records
/// through this id and only translate to an index for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        RecordId(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = AppResponse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(RecordId)
            .map_err(|e| AppResponse::BadRequest(format!("Invalid record id '{s}': {e}")))
    }
}

/// One coffee-place visit as entered by the user.
///
/// Ratings are meant to be within `0..=5` and prices non-negative, but the
/// store accepts any values; range checks live in
/// [`CoffeePlaceForm`](crate::coffee_place_form::CoffeePlaceForm).
///
/// ```rust
/// use coffee_note_core::coffee_place_model::CoffeePlace;
///
/// let visit = CoffeePlace::new("Blue Bottle", 4.5, "Latte", 5.25);
/// let json = serde_json::to_string(&visit)?;
/// assert!(json.contains("\"name\":\"Blue Bottle\""));
/// assert!(!json.contains("photoBytes"));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoffeePlace {
    pub name: String,
    #[serde(serialize_with = "finite_number::serialize")]
    pub rating: f64,
    pub item: String,
    #[serde(serialize_with = "finite_number::serialize")]
    pub price: f64,

    /// Raw image bytes, stored as base64 under `photoBytes`.
    /// `None` means the UI shows its placeholder.
    #[serde(
        rename = "photoBytes",
        default,
        skip_serializing_if = "Option::is_none",
        with = "photo_bytes"
    )]
    pub photo: Option<Vec<u8>>,
}

impl CoffeePlace {
    pub fn new(name: impl Into<String>, rating: f64, item: impl Into<String>, price: f64) -> Self {
        CoffeePlace {
            name: name.into(),
            rating,
            item: item.into(),
            price,
            photo: None,
        }
    }

    pub fn with_photo(mut self, photo: Vec<u8>) -> Self {
        self.photo = Some(photo);
        self
    }
}

/// A stored visit: the user's fields plus the id the store assigned.
///
/// Serialized flat, so a persisted element looks like
/// `{"id": "...", "name": "...", "rating": 4.5, "item": "...", "price": 5.25}`.
/// Elements written without an `id` get a fresh one when decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoffeePlaceRecord {
    #[serde(default)]
    pub id: RecordId,

    #[serde(flatten)]
    pub place: CoffeePlace,
}

impl CoffeePlaceRecord {
    pub fn new(place: CoffeePlace) -> Self {
        CoffeePlaceRecord { id: RecordId::new(), place }
    }
}

/// Serializes the full record sequence into the bytes stored in the slot.
///
/// Fails with `EncodeError` if any rating or price is NaN or infinite, since
/// JSON has no representation for those and the slot would no longer decode.
pub fn encode_records(records: &[CoffeePlaceRecord]) -> Result<Vec<u8>, AppResponse> {
    serde_json::to_vec(records)
        .map_err(|e| AppResponse::EncodeError(format!("Failed to encode {} records: {e}", records.len())))
}

/// Parses slot bytes back into the record sequence.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<CoffeePlaceRecord>, AppResponse> {
    serde_json::from_slice(bytes)
        .map_err(|e| AppResponse::DecodeError(format!("Slot contents are not a record list: {e}")))
}

mod finite_number {
    use serde::ser::Error;
    use serde::Serializer;

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if !value.is_finite() {
            return Err(S::Error::custom(format!("{value} cannot be stored as a JSON number")));
        }
        serializer.serialize_f64(*value)
    }
}

pub(crate) mod photo_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(photo: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match photo {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|text| STANDARD.decode(text).map_err(serde::de::Error::custom))
            .transpose()
    }
}
