//! error.rs
//!
//! API error taxonomy shared by every handler.
//!
//! Five caller-visible classes: validation failures, missing entities,
//! referential/uniqueness conflicts, authorization failures, and opaque
//! store errors. Store errors carry full detail into the log only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range input. Never retried.
    #[error("{0}")]
    Validation(String),

    /// Target entity id does not exist. Distinct from validation.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Deletion blocked by dependent rows, or uniqueness violated.
    /// `blocking` carries the dependent-row count when available so the
    /// caller can display actionable detail.
    #[error("{message}")]
    Conflict {
        message: String,
        blocking: Option<BlockingCount>,
    },

    /// Caller lacks the required role or targets a protected account.
    #[error("{0}")]
    Forbidden(String),

    /// Underlying persistence failure. Opaque to the caller.
    #[error("database error")]
    Store(#[from] sqlx::Error),
}

/// Which dependent entity blocks a deletion, and how many rows.
#[derive(Debug, Clone, Copy)]
pub enum BlockingCount {
    Bookings(i64),
    Services(i64),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict { message: msg.into(), blocking: None }
    }

    pub fn conflict_with(msg: impl Into<String>, blocking: BlockingCount) -> Self {
        ApiError::Conflict { message: msg.into(), blocking: Some(blocking) }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ApiError::Store(e) => {
                tracing::error!("store error: {:?}", e);
                json!({ "message": "Database error" })
            }
            ApiError::Conflict { message, blocking } => {
                let mut body = json!({ "message": message });
                match blocking {
                    Some(BlockingCount::Bookings(n)) => {
                        body["bookingsCount"] = json!(n);
                    }
                    Some(BlockingCount::Services(n)) => {
                        body["servicesCount"] = json!(n);
                    }
                    None => {}
                }
                body
            }
            other => json!({ "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
