use std::fmt::{Display, Formatter};

use lmdb::Error as LmdbError;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

/// Outcome envelope shared by the store, the presenter and the FFI surface.
///
/// Every fallible operation in the crate returns `Result<_, AppResponse>`;
/// the `Ok` variant is only used when a response is sent across the C ABI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppResponse {
    DatabaseError(String),
    EncodeError(String),
    DecodeError(String),
    NotFound(String),
    IndexOutOfRange { index: usize, len: usize },
    ValidationError { field: String, reason: String },
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::EncodeError(msg) => write!(f, "Encode error: {}", msg),
            AppResponse::DecodeError(msg) => write!(f, "Decode error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::IndexOutOfRange { index, len } =>
                write!(f, "Index out of range: {} (len {})", index, len),
            AppResponse::ValidationError { field, reason } =>
                write!(f, "Validation error on '{}': {}", field, reason),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl std::error::Error for AppResponse {}

impl From<LmdbError> for AppResponse {
    fn from(err: LmdbError) -> Self {
        match err {
            LmdbError::NotFound =>
                AppResponse::NotFound("Key not found in slot database".to_string()),
            LmdbError::Corrupted =>
                AppResponse::DatabaseError("Database is corrupted".to_string()),
            LmdbError::MapFull =>
                AppResponse::DatabaseError("Database map is full".to_string()),
            LmdbError::Other(code) =>
                AppResponse::DatabaseError(format!("IO error (os code {})", code)),
            _ => AppResponse::DatabaseError(format!("{:?}", err)),
        }
    }
}

/// JSON failures are mapped by category: syntax and data errors come from
/// reading bytes back, anything else from writing them out.
impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Syntax | Category::Data | Category::Eof =>
                AppResponse::DecodeError(format!("JSON decode error: {}", err)),
            Category::Io =>
                AppResponse::EncodeError(format!("JSON encode error: {}", err)),
        }
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppResponse::ValidationError { field: field.into(), reason: reason.into() }
    }
}
