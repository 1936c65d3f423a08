use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::coffee_place_model::CoffeePlace;

pub const MAX_RATING: f64 = 5.0;

/// Raw add/edit form input, exactly as the text fields captured it.
///
/// Photo bytes come straight from the image picker and are passed through
/// unchecked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoffeePlaceForm {
    pub name: String,
    pub rating: String,
    pub item: String,
    pub price: String,
    #[serde(
        rename = "photoBytes",
        skip_serializing_if = "Option::is_none",
        with = "crate::coffee_place_model::photo_bytes"
    )]
    pub photo: Option<Vec<u8>>,
}

impl CoffeePlaceForm {
    /// Checks fields in form order and reports the first one that fails.
    pub fn validate(&self) -> Result<CoffeePlace, AppResponse> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppResponse::invalid("name", "must not be empty"));
        }

        let rating = parse_number("rating", &self.rating)?;
        if !(0.0..=MAX_RATING).contains(&rating) {
            return Err(AppResponse::invalid("rating", format!("must be between 0 and {MAX_RATING}")));
        }

        let price = parse_number("price", &self.price)?;
        if price < 0.0 {
            return Err(AppResponse::invalid("price", "must not be negative"));
        }

        Ok(CoffeePlace {
            name: name.to_string(),
            rating,
            item: self.item.trim().to_string(),
            price,
            photo: self.photo.clone(),
        })
    }
}

fn parse_number(field: &str, text: &str) -> Result<f64, AppResponse> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppResponse::invalid(field, "is required"));
    }

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(AppResponse::invalid(field, "must be a finite number")),
        Err(_) => Err(AppResponse::invalid(field, format!("'{text}' is not a number"))),
    }
}
