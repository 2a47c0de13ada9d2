use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::credential::CredentialError;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

use crate::models::shared::StatusMessage;

/// Failure envelope returned by every endpoint.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Always `Failed`.
    #[serde(rename = "StatusMessage")]
    pub status_message: StatusMessage,
    /// Human-readable description.
    #[schema(example = "mail_address is required; password is required")]
    pub message: String,
    /// Underlying detail, when it is safe to expose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// Body could not be decoded, or required fields are missing.
    MalformedInput(String),
    /// Key absent, or present but in the wrong lifecycle state.
    NotFound(String),
    /// A live user already owns this mail address.
    DuplicateIdentity,
    /// Wrong password (or an unreadable stored digest).
    CredentialMismatch,
    HashingFailed(String),
    StoreUnavailable(String),
    /// A store constraint rejected the write.
    IntegrityViolation(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedInput(_)
            | AppError::DuplicateIdentity
            | AppError::CredentialMismatch
            | AppError::IntegrityViolation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::HashingFailed(_) | AppError::StoreUnavailable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable name, carried in the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::MalformedInput(_) => "MalformedInput",
            AppError::NotFound(_) => "NotFound",
            AppError::DuplicateIdentity => "DuplicateIdentity",
            AppError::CredentialMismatch => "CredentialMismatch",
            AppError::HashingFailed(_) => "HashingFailed",
            AppError::StoreUnavailable(_) => "StoreUnavailable",
            AppError::IntegrityViolation(_) => "IntegrityViolation",
        }
    }

    fn into_body(self) -> ErrorBody {
        let kind = self.kind();
        let message = match self {
            AppError::MalformedInput(msg)
            | AppError::NotFound(msg)
            | AppError::IntegrityViolation(msg) => msg,
            AppError::DuplicateIdentity => "This mail address is already registered".into(),
            AppError::CredentialMismatch => "Password is incorrect".into(),
            AppError::HashingFailed(detail) => {
                tracing::error!("Password hashing failed: {}", detail);
                "An unexpected error occurred".into()
            }
            AppError::StoreUnavailable(detail) => {
                tracing::error!("Database error: {}", detail);
                "An unexpected error occurred".into()
            }
        };
        ErrorBody {
            status_message: StatusMessage::Failed,
            message,
            error: Some(kind.to_string()),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::MalformedInput(msg) => write!(f, "malformed input: {msg}"),
            AppError::NotFound(msg) => write!(f, "not found: {msg}"),
            AppError::DuplicateIdentity => f.write_str("duplicate identity"),
            AppError::CredentialMismatch => f.write_str("credential mismatch"),
            AppError::HashingFailed(detail) => write!(f, "hashing failed: {detail}"),
            AppError::StoreUnavailable(detail) => write!(f, "store unavailable: {detail}"),
            AppError::IntegrityViolation(detail) => write!(f, "integrity violation: {detail}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.into_body())).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::IntegrityViolation(
                format!("A record with the same key already exists ({detail})"),
            ),
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                AppError::IntegrityViolation(format!("Referenced record is missing ({detail})"))
            }
            _ => AppError::StoreUnavailable(err.to_string()),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::HashingFailed(detail) => AppError::HashingFailed(detail),
            CredentialError::Mismatch => AppError::CredentialMismatch,
        }
    }
}
