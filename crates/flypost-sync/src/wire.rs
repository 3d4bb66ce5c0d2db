//! The wire protocol grammar.
//!
//! Line-oriented, one request per connection: a client writes exactly one
//! newline-terminated request line and reads exactly one response line.
//! Requests are matched token-for-token; anything else earns the
//! syntax-error response.
//!
//! | request                  | response                                  |
//! |--------------------------|-------------------------------------------|
//! | `GET VER`                | protocol version string                   |
//! | `GET ID`                 | the node id, uppercase hex                |
//! | `GET LIST`               | all message ids, `;`-joined               |
//! | `GET MSGS`               | all messages, serialized, `;`-joined      |
//! | `GET MSGS <id>[;<id>..]` | the requested ids' messages, `;`-joined   |
//!
//! An empty store answers `GET LIST` and `GET MSGS` with an empty line.

use flypost_core::MessageId;

use crate::error::ProtocolError;

/// Current protocol version, as served for `GET VER`.
pub const PROTOCOL_VERSION: &str = "0.1";

/// Response line for any request the grammar rejects.
pub const SYNTAX_ERROR: &str = "SYNTAX ERROR";

/// Line size limits.
///
/// Lines beyond these bounds are rejected rather than buffered without
/// bound, so a misbehaving peer cannot grow memory arbitrarily.
pub mod limits {
    /// Max bytes in a request line (about a thousand explicit ids).
    pub const MAX_REQUEST_LINE: usize = 64 * 1024;
    /// Max bytes in a response line.
    pub const MAX_RESPONSE_LINE: usize = 4 * 1024 * 1024;
}

/// A parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `GET VER`
    Version,
    /// `GET ID`
    NodeId,
    /// `GET LIST`
    List,
    /// `GET MSGS` with an optional explicit id list. `None` means all.
    Messages(Option<Vec<MessageId>>),
}

impl Request {
    /// Parse one request line (without its terminating newline).
    ///
    /// Tokens are exact: `GET LISTX` is not `GET LIST`. An explicit id list
    /// must decode in full; a request carrying a malformed id is rejected
    /// whole rather than partially served.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        match line {
            "GET VER" => Ok(Self::Version),
            "GET ID" => Ok(Self::NodeId),
            "GET LIST" => Ok(Self::List),
            "GET MSGS" => Ok(Self::Messages(None)),
            _ => match line.strip_prefix("GET MSGS ") {
                Some(rest) => Ok(Self::Messages(Some(parse_id_list(rest)?))),
                None => Err(ProtocolError::UnrecognizedRequest(line.to_owned())),
            },
        }
    }
}

fn parse_id_list(rest: &str) -> Result<Vec<MessageId>, ProtocolError> {
    rest.split(';')
        .map(|token| {
            MessageId::from_hex(token).map_err(|_| ProtocolError::MalformedId(token.to_owned()))
        })
        .collect()
}
