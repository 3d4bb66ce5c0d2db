//! Error types for the sync protocol.

use thiserror::Error;

/// Errors a request-parsing server session can hit.
///
/// Each one is answered with a syntax-error line; the connection still
/// closes cleanly and the accept loop never sees it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unrecognized request: {0:?}")]
    UnrecognizedRequest(String),

    #[error("malformed message id in request: {0:?}")]
    MalformedId(String),
}

/// Errors that can occur on the client side of a sync exchange.
///
/// All of these are recoverable at the call site: a failed pull is reported
/// to whoever asked for it and never affects node liveness.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid port: {0:?}")]
    InvalidPort(String),

    #[error("connecting to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("response line exceeds {limit} bytes")]
    ResponseTooLarge { limit: usize },
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
