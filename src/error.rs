//! Error taxonomy for the product catalog.
//!
//! Three failure domains meet here:
//! - [`StoreError`]: repository failures on the backend, mapped to HTTP
//!   status codes by [`ApiError`].
//! - [`ClientError`]: transport-level failures observed by the remote client.
//! - [`ValidationError`] / [`GridError`]: grid-controller failures raised
//!   before or during the commit protocol.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised by the product repository.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product {0} not found")]
    NotFound(i64),
    /// Another record already owns this reference.
    #[error("reference {0:?} already in use")]
    ReferenceInUse(String),
    #[error("failed to persist catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog document is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// JSON error body used by the API, `{"message": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// HTTP-facing wrapper around [`StoreError`]. Handlers return this so status
/// mapping lives in one place.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub StoreError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::ReferenceInUse(_) => StatusCode::CONFLICT,
            StoreError::Io(_) | StoreError::Serde(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            // Exact body shape expected by existing clients.
            StoreError::NotFound(_) => "Product not found".to_string(),
            StoreError::ReferenceInUse(reference) => {
                format!("Reference {reference} already in use")
            }
            StoreError::Io(_) | StoreError::Serde(_) => "Failed to persist catalog".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(ErrorBody::new(self.message()))).into_response()
    }
}

/// Failures observed by the remote product client. Every non-2xx response and
/// every network fault surfaces as one of these; nothing is swallowed.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
}

/// Local validation failures raised by the grid before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Price must be greater than or equal to 0")]
    NegativePrice,
    #[error("Reference must be unique")]
    DuplicateReference,
}

/// Failures of grid-controller operations.
#[derive(Debug, Error)]
pub enum GridError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Client(#[from] ClientError),
    /// An edit session is already open for this row.
    #[error("row is already being edited")]
    AlreadyEditing,
    /// The operation requires an open edit session.
    #[error("row is not in edit mode")]
    NotEditing,
    #[error("no such row in the grid")]
    UnknownRow,
}
