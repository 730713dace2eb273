//! Error types for the transport port and the verifying facade.

use crate::config::NOT_TRUSTED_PRODUCT_MESSAGE;

/// Errors raised by a [`crate::Transport`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The server rejected the credentials (401).
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The credentials lack the privileges for the request (403).
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response.
    #[error("network error: {message}")]
    Network { message: String },

    /// The response could not be interpreted.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// The transport does not implement the requested operation.
    #[error("unsupported operation: {operation}")]
    UnsupportedOperation { operation: String },

    /// A delegated call carried arguments the operation cannot accept.
    #[error("invalid call to {operation}: {message}")]
    InvalidCall { operation: String, message: String },
}

impl TransportError {
    /// Whether the error means the caller lacks access rights.
    pub fn is_privilege_denied(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::Forbidden { .. })
    }

    /// Whether the error is transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Status { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors surfaced by the verifying facade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The server answered but is not the trusted product.
    #[error("{}", NOT_TRUSTED_PRODUCT_MESSAGE)]
    NotTrustedProduct,

    /// Transport failure, passed through as is.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    /// The transport error behind this failure, if any.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(e) => Some(e),
            Self::NotTrustedProduct => None,
        }
    }
}

/// Result type for facade operations.
pub type ClientResult<T> = Result<T, ClientError>;
