//! Custom error types for the contacts service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::PayloadError;

/// Error returned by contact handlers
///
/// The message is what the client sees. Store and driver failures are logged
/// where they happen and reach this type only as an operation-specific
/// `Internal` message.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Client input defect
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid token
    #[error("Unauthorized")]
    Unauthorized,

    /// No matching record owned by the caller
    #[error("{0}")]
    NotFound(String),

    /// Store or connectivity failure
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn contact_not_found() -> Self {
        ApiError::NotFound("Contact not found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PayloadError> for ApiError {
    fn from(err: PayloadError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "status": status.as_u16(),
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
