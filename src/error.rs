use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("License ID already exists: {0}")]
    DuplicateLicense(String),

    #[error("Unknown license: {0}")]
    UnknownLicense(String),

    #[error("License is inactive: {0}")]
    InactiveLicense(String),

    #[error("Invalid key for this license ID")]
    InvalidKey,

    #[error("License expired at {expired_at}")]
    ExpiredLicense { expired_at: i64 },

    #[error("All seats in use ({used}/{max})")]
    SeatsExhausted { used: i64, max: i64 },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-checkable error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::DuplicateLicense(_) => "duplicate_license",
            AppError::UnknownLicense(_) => "unknown_license",
            AppError::InactiveLicense(_) => "inactive_license",
            AppError::InvalidKey => "invalid_key",
            AppError::ExpiredLicense { .. } => "expired_license",
            AppError::SeatsExhausted { .. } => "seats_exhausted",
            AppError::BadRequest(_) => "bad_request",
            AppError::Unauthorized => "unauthorized",
            AppError::Database(_) | AppError::Pool(_) => "storage_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// True for storage and internal failures, as opposed to client-input errors.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AppError::Database(_) | AppError::Pool(_) | AppError::Internal(_)
        )
    }

    /// True when the error came from a UNIQUE constraint in the store.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(rusqlite::Error::SqliteFailure(e, _)) => {
                e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            }
            _ => false,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "Validation failed",
                Some(msg.clone()),
            ),
            AppError::DuplicateLicense(_) => (
                StatusCode::CONFLICT,
                "License ID already exists",
                Some(self.to_string()),
            ),
            AppError::UnknownLicense(_) => (
                StatusCode::NOT_FOUND,
                "Unknown license",
                Some(self.to_string()),
            ),
            AppError::InactiveLicense(_) => (
                StatusCode::FORBIDDEN,
                "License is inactive",
                Some(self.to_string()),
            ),
            AppError::InvalidKey => (
                StatusCode::FORBIDDEN,
                "Invalid key for this License ID",
                None,
            ),
            AppError::ExpiredLicense { .. } => {
                (StatusCode::FORBIDDEN, "License expired", Some(self.to_string()))
            }
            AppError::SeatsExhausted { .. } => (
                StatusCode::CONFLICT,
                "No seats available",
                Some(self.to_string()),
            ),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            code: self.code(),
            details,
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
