//! Error types for the board core

use crate::config::ConfigError;
use crate::identity::IdentityError;
use crate::store::StoreError;
use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, KanbanError>;

/// Errors that can occur in board operations
#[derive(Debug, Error)]
pub enum KanbanError {
    /// Missing required field
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// The board session has ended and no longer accepts work
    #[error("board session closed")]
    SessionClosed,

    /// The live collection store rejected or failed a write
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The identity provider failed a request
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl KanbanError {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Validation failures are rejected before any store round-trip
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::InvalidValue { .. })
    }
}
