//! HTTP boundary errors
//!
//! Library errors propagate as typed results up to the handlers; this is the
//! single place they become a status code and a `{"error": "..."}` body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::metrics;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Reddit(#[from] reddit_client::Error),

    #[error(transparent)]
    Store(#[from] image_store::Error),

    /// Unparsable request body or missing field
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// Only a malformed request is the client's fault; everything else,
    /// including a permalink with nothing after `comments`, is a 500.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Reddit(reddit_client::Error::InvalidUrl(_)) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Reddit(e) => e.kind(),
            ApiError::Store(e) => e.kind(),
            ApiError::BadRequest(_) => "bad_request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        if status.is_server_error() {
            error!(kind, error = %self, "request failed");
        } else {
            warn!(kind, error = %self, "request rejected");
        }
        metrics::record_error(kind);

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
