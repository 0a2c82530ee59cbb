//! Error types for client operations

use thiserror::Error;
use mood_museum_core::CoreError;

/// Error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// No connected identity in the session
    #[error("Not authenticated: connect a wallet first")]
    NotAuthenticated,

    /// The backend reported that it is not accepting operations
    #[error("Backend unavailable")]
    BackendUnavailable,

    /// The user declined to sign or send a transaction
    #[error("Signature declined by user")]
    SignatureDeclined,

    /// Only part of a multi-record batch was persisted
    #[error("Partial write failure: {persisted} of {attempted} records persisted")]
    PartialWriteFailure {
        /// Records that reached the store
        persisted: usize,
        /// Records that were attempted
        attempted: usize,
    },

    /// The requested record is not in the store
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A backend round-trip failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// The challenge signature does not recover to the session address
    #[error("Signature does not match the connected address")]
    SignerMismatch,

    /// Signing failed for a reason other than a user decline
    #[error("Signing error: {0}")]
    Signing(String),

    /// Record, codec or validation error
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Local database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the error came from a user decision rather than a fault
    pub fn is_user_initiated(&self) -> bool {
        matches!(self, ClientError::SignatureDeclined)
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Convert a displayable error to a transport error
pub fn to_transport_error<E: std::fmt::Display>(err: E) -> ClientError {
    ClientError::Transport(err.to_string())
}

/// Whether a backend error message indicates that the user declined
pub fn is_user_rejection(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("user rejected") || message.contains("user denied")
}
