//! Error-to-status mapping for the resource handlers.
//!
//! Validation and not-found outcomes are part of normal control flow and
//! carry no log noise; persistence failures are logged at error level and
//! surfaced as an opaque 500 so internals never leak to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cityinfo_core::{FieldErrors, PatchError, StoreError};
use tracing::error;

/// Body of the opaque 500 response, matching the contract's wording.
const SERVER_ERROR_BODY: &str = "A problem happened while handling your request";

/// Terminal failure outcome of a resource handler.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or unbindable request body; 400 with no detail.
    BadRequest,
    /// Field-level validation failure; 400 carrying the error map.
    Validation(FieldErrors),
    /// Unknown city or POI, or a `null` patch document; bare 404.
    NotFound,
    /// Persistence failure; opaque 500.
    Storage(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err)
    }
}

impl From<PatchError> for ApiError {
    /// A failed patch application is a structural validation error, tagged
    /// to the pointer the offending operation addressed.
    fn from(err: PatchError) -> Self {
        let field = match &err {
            PatchError::UnknownPath { path }
            | PatchError::InvalidValue { path }
            | PatchError::MissingValue { path }
            | PatchError::TestFailed { path } => {
                path.strip_prefix('/').unwrap_or(path.as_str()).to_owned()
            }
            PatchError::NameRemoved => "name".to_owned(),
        };
        let mut errors = FieldErrors::new();
        errors.push(&field, err.to_string());
        Self::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST.into_response(),
            Self::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Storage(err) => {
                error!(error = %err, "persistence failure while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_BODY).into_response()
            }
        }
    }
}
