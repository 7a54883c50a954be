//! API Error Handling
//!
//! Every failure leaves the service as the same envelope:
//! `{status, message, error, timestamp}`.

use crate::errors::JackpotError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message returned for every internal failure; details only go to the log
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Uniform error envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    /// BAD_REQUEST, NOT_FOUND or INTERNAL_SERVER_ERROR
    pub error: String,
    pub timestamp: String,
}

/// API error with the request it belongs to
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub request_id: String,
}

#[derive(Debug)]
pub enum ApiErrorKind {
    NotFound(String),
    BadRequest(String),
    InternalError(String),
}

impl ApiError {
    pub fn not_found(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::NotFound(message),
            request_id,
        }
    }

    pub fn bad_request(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::BadRequest(message),
            request_id,
        }
    }

    /// `detail` is logged, never sent to the client
    pub fn internal_error(request_id: String, detail: String) -> Self {
        tracing::error!(request_id = %request_id, error = %detail, "Request failed with internal error");
        Self {
            kind: ApiErrorKind::InternalError(detail),
            request_id,
        }
    }

    /// Translate a domain failure into its HTTP class
    pub fn from_domain(request_id: String, err: JackpotError) -> Self {
        if err.is_client_error() {
            tracing::debug!(request_id = %request_id, error = %err, "Request rejected");
        }
        match err {
            JackpotError::InvalidBetAmount(msg)
            | JackpotError::InvalidJackpotDefinition(msg)
            | JackpotError::InvalidRequest(msg) => Self::bad_request(request_id, msg),
            JackpotError::JackpotNotFound(_) => Self::not_found(request_id, err.to_string()),
            JackpotError::Storage(_) | JackpotError::Configuration(_) => {
                Self::internal_error(request_id, err.to_string())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            ApiErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            ApiErrorKind::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiErrorKind::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ApiErrorKind::NotFound(msg) => write!(f, "[{}] Not Found: {}", self.request_id, msg),
            ApiErrorKind::BadRequest(msg) => write!(f, "[{}] Bad Request: {}", self.request_id, msg),
            ApiErrorKind::InternalError(msg) => write!(f, "[{}] Internal Error: {}", self.request_id, msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self.kind {
            ApiErrorKind::NotFound(msg) => ("NOT_FOUND", msg),
            ApiErrorKind::BadRequest(msg) => ("BAD_REQUEST", msg),
            ApiErrorKind::InternalError(_) => ("INTERNAL_SERVER_ERROR", INTERNAL_ERROR_MESSAGE.to_string()),
        };

        let body = Json(ErrorResponse {
            status: status.as_u16(),
            message,
            error: code.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        });

        (status, body).into_response()
    }
}
