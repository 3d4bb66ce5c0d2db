//! Error types for the flypost core primitives.

use thiserror::Error;

/// Errors arising from sender identity material.
///
/// Key generation itself cannot fail; these cover decoding sender keys and
/// signatures received from elsewhere.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IdentityError {
    #[error("invalid sender key encoding")]
    InvalidSenderKey,

    #[error("invalid signature encoding")]
    InvalidSignature,
}

/// Errors that can occur while creating or parsing a message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("message text too long: {length} characters (max {max})")]
    TextTooLong { length: usize, max: usize },

    #[error("invalid message format: expected 2 or 4 fields, got {0}")]
    InvalidFormat(usize),

    #[error("bad sender field: {0}")]
    Identity(#[from] IdentityError),
}
