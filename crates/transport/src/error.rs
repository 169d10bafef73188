//! Transport errors

use catalog_errors::RpcError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid frame header: {0:?}")]
    InvalidHeader(String),

    #[error("Frame of {length} bytes exceeds limit of {max} bytes")]
    FrameTooLarge { length: usize, max: usize },

    #[error("Malformed packet: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Remote error: {0}")]
    Remote(RpcError),
}

impl TransportError {
    /// The structured error returned by the remote side, if any
    pub fn remote(&self) -> Option<&RpcError> {
        match self {
            Self::Remote(err) => Some(err),
            _ => None,
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
