//! Mapping of orchestration errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use docvault_core::{DocumentError, TicketError, ValidationError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// An error ready to be rendered as `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    fields: Vec<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            fields: e.fields(),
            message: e.to_string(),
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::Validation(v) => v.into(),
            DocumentError::NotFound { .. }
            | DocumentError::NotIndexed
            | DocumentError::IndexOutOfSync { .. } => {
                Self::new(StatusCode::NOT_FOUND, e.to_string())
            }
            DocumentError::Authentication(ref cause) => {
                error!(error = %cause, "Repository authentication failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "repository authentication failed",
                )
            }
            DocumentError::Repository(ref cause) => {
                error!(error = %cause, "Repository request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            DocumentError::Index(ref cause) => {
                error!(error = %cause, "Index lookup failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

impl From<TicketError> for ApiError {
    fn from(e: TicketError) -> Self {
        match e {
            TicketError::Rejected(_) => Self::new(StatusCode::UNAUTHORIZED, "invalid credentials"),
            other => {
                error!(error = %other, "Ticket request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                fields: self.fields,
            }),
        )
            .into_response()
    }
}
