//! catalog-errors - unified error handling
//!
//! Every service returns [`AppError`]; the transport turns it into the
//! structured [`RpcError`] that callers consume.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message reported to callers for failures that must not leak details
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// The message without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Internal(msg)
            | Self::Database(msg) => msg,
        }
    }

    /// HTTP-style status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Internal(_) => 500,
            Self::Database(_) => 500,
        }
    }

    /// Whether the error is part of the caller-facing contract
    ///
    /// Client errors are returned verbatim; server errors are masked.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Convert to the structured error sent back over the transport
    pub fn to_rpc_error(&self) -> RpcError {
        if self.is_client_error() {
            RpcError::new(self.message(), self.status_code())
        } else {
            RpcError::new(INTERNAL_ERROR_MESSAGE, self.status_code())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("Serialization failed: {}", err))
    }
}

/// Structured error consumed by RPC callers: `{ message, status }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message} ({status})")]
pub struct RpcError {
    pub message: String,
    pub status: u16,
}

impl RpcError {
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }
}

impl From<AppError> for RpcError {
    fn from(err: AppError) -> Self {
        err.to_rpc_error()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;
