//! Error types for Laurel
//!
//! Every failure a caller can observe is one of these variants. Each maps to
//! exactly one HTTP status class, and the public envelope never carries the
//! internal detail string.

use hyper::StatusCode;
use serde::Serialize;

use crate::auth::evaluator::{DenyReason, Operation};
use crate::types::AchievementStatus;

/// Main error type for Laurel operations
#[derive(Debug, thiserror::Error)]
pub enum LaurelError {
    /// Malformed or missing required input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing, invalid, expired or revoked credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization denied. The reason is kept for logs only.
    #[error("Forbidden: {0}")]
    Forbidden(DenyReason),

    #[error("Not found: {0}")]
    NotFound(String),

    /// State machine precondition failed
    #[error("Invalid transition: cannot {action} an achievement in status {current} (requested {requested})")]
    InvalidTransition {
        action: Operation,
        current: AchievementStatus,
        requested: AchievementStatus,
    },

    /// A conditional status update matched zero rows
    #[error("Conflict: {0}")]
    ConflictOrNotFound(String),

    /// Content record and status record disagree
    #[error("Inconsistent record: {0}")]
    Inconsistent(String),

    /// Underlying store I/O failure
    #[error("Store failure: {0}")]
    Store(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Standard error envelope: `{code, message, error}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub code: u16,
    pub message: String,
    pub error: String,
}

impl LaurelError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ConflictOrNotFound(_) => StatusCode::CONFLICT,
            Self::Inconsistent(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short public message for the `error` field of the envelope.
    ///
    /// Validation and transition failures are safe to echo back to the
    /// caller; everything else collapses to a generic phrase.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::InvalidTransition { action, current, .. } => {
                format!("cannot {} an achievement that is {}", action, current)
            }
            Self::Unauthorized(_) => "invalid or missing token".to_string(),
            Self::Forbidden(_) => "access denied".to_string(),
            Self::NotFound(_) => "achievement not found".to_string(),
            Self::ConflictOrNotFound(_) => "achievement was modified concurrently".to_string(),
            Self::Inconsistent(_) => "achievement record is unavailable".to_string(),
            Self::Store(_) => "storage unavailable".to_string(),
            Self::Timeout(_) => "request timed out".to_string(),
            Self::Config(_) | Self::Internal(_) => "internal error".to_string(),
        }
    }

    /// Build the public error envelope
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let status = self.status_code();
        ErrorEnvelope {
            code: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            error: self.public_message(),
        }
    }
}

impl From<std::io::Error> for LaurelError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for LaurelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(format!("invalid request body: {}", err))
    }
}

impl From<hyper::Error> for LaurelError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

impl From<mongodb::error::Error> for LaurelError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<bson::ser::Error> for LaurelError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Store(format!("BSON encoding failed: {}", err))
    }
}

impl From<rusqlite::Error> for LaurelError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for LaurelError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Unauthorized(format!("JWT error: {}", err))
    }
}

/// Result type alias for Laurel operations
pub type Result<T> = std::result::Result<T, LaurelError>;
