//! Error types for the message store.

use thiserror::Error;

use flypost_core::{MessageError, MessageId};

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The message's id is already present. The store is unchanged.
    #[error("duplicate message: {id}")]
    Duplicate { id: MessageId },

    #[error("message error: {0}")]
    Message(#[from] MessageError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
