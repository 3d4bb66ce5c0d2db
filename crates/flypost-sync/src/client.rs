//! The sync client: single-shot requests and the pull algorithm.
//!
//! A pull reconciles the local store against one peer in at most two round
//! trips: fetch the peer's id list, diff it against the local store, then
//! fetch only the missing messages. Every step is bounded by a timeout and
//! a failed pull surfaces an error to the caller without touching node
//! liveness.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time;

use flypost_core::{Message, MessageId};
use flypost_store::{MessageStore, StoreError};

use crate::error::{ClientError, Result};
use crate::wire::limits;

/// Client timing configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bound on establishing a connection.
    pub connect_timeout: Duration,
    /// Bound on each request write and response read.
    pub io_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            io_timeout: Duration::from_secs(10),
        }
    }
}

/// Parse a port argument. A malformed port is [`ClientError::InvalidPort`].
pub fn parse_port(s: &str) -> Result<u16> {
    s.parse::<u16>()
        .map_err(|_| ClientError::InvalidPort(s.to_owned()))
}

/// A pull client bound to the local store.
pub struct SyncClient {
    store: Arc<MessageStore>,
    config: ClientConfig,
}

impl SyncClient {
    /// Create a client that ingests into `store`.
    pub fn new(store: Arc<MessageStore>, config: ClientConfig) -> Self {
        Self { store, config }
    }

    /// Ask a peer for its protocol version.
    pub async fn version(&self, host: &str, port: u16) -> Result<String> {
        self.request_line(host, port, "GET VER").await
    }

    /// Ask a peer for its node id.
    pub async fn node_id(&self, host: &str, port: u16) -> Result<String> {
        self.request_line(host, port, "GET ID").await
    }

    /// Pull messages this store is missing from a peer.
    ///
    /// Returns the number of ids identified as missing before fetching.
    /// Individual messages that fail to parse or store are logged and
    /// skipped; only connection-level failures abort the pull.
    pub async fn pull(&self, host: &str, port: u16) -> Result<usize> {
        let list = self.request_line(host, port, "GET LIST").await?;
        let peer_ids = peer_id_list(&list);

        let missing: Vec<MessageId> = peer_ids
            .iter()
            .filter(|id| !self.store.contains(id))
            .copied()
            .collect();
        if missing.is_empty() {
            // Already have everything; skip the second round trip.
            return Ok(0);
        }

        // Bare GET MSGS when the whole peer list is missing.
        let request = if missing.len() == peer_ids.len() {
            "GET MSGS".to_owned()
        } else {
            messages_request(&missing)
        };
        let response = self.request_line(host, port, &request).await?;

        for entry in response.split(';') {
            if entry.is_empty() {
                continue;
            }
            match Message::parse(entry) {
                Ok(message) => {
                    let id = message.id();
                    match self.store.add(message) {
                        Ok(()) => tracing::debug!("Pulled message {}", id),
                        Err(StoreError::Duplicate { .. }) => {
                            tracing::debug!("Already have {}", id)
                        }
                        Err(e) => tracing::warn!("Could not store pulled message: {}", e),
                    }
                }
                Err(e) => tracing::warn!("Skipping unparsable message from peer: {}", e),
            }
        }

        Ok(missing.len())
    }

    /// One request, one response line, one connection.
    async fn request_line(&self, host: &str, port: u16, request: &str) -> Result<String> {
        let addr = format!("{}:{}", host, port);

        let stream = time::timeout(self.config.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ClientError::Timeout(format!("connecting to {}", addr)))?
            .map_err(|e| ClientError::Connect {
                addr: addr.clone(),
                source: e,
            })?;
        let (reader, mut writer) = stream.into_split();

        time::timeout(self.config.io_timeout, async {
            writer.write_all(request.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.shutdown().await
        })
        .await
        .map_err(|_| ClientError::Timeout(format!("sending request to {}", addr)))??;

        let mut reader = BufReader::new(reader).take(limits::MAX_RESPONSE_LINE as u64 + 1);
        let mut line = String::new();
        time::timeout(self.config.io_timeout, reader.read_line(&mut line))
            .await
            .map_err(|_| ClientError::Timeout(format!("waiting for response from {}", addr)))??;
        if line.len() > limits::MAX_RESPONSE_LINE {
            return Err(ClientError::ResponseTooLarge {
                limit: limits::MAX_RESPONSE_LINE,
            });
        }

        Ok(line.trim_end_matches(['\r', '\n']).to_owned())
    }
}

/// Render the fetch request for exactly `missing`.
///
/// An explicit id list that would overflow [`limits::MAX_REQUEST_LINE`]
/// (newline included) gets rejected whole by the peer, so past that bound
/// the request falls back to fetching everything; the store's duplicate
/// check drops the overlap.
fn messages_request(missing: &[MessageId]) -> String {
    let joined: Vec<String> = missing.iter().map(|id| id.to_hex()).collect();
    let request = format!("GET MSGS {}", joined.join(";"));
    if request.len() + 1 > limits::MAX_REQUEST_LINE {
        return "GET MSGS".to_owned();
    }
    request
}

/// Decode a peer's id list response.
///
/// Duplicates keep their first position only and malformed entries are
/// logged and dropped; a buggy or hostile peer must not wedge a pull.
fn peer_id_list(line: &str) -> Vec<MessageId> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for token in line.split(';') {
        if token.is_empty() {
            continue;
        }
        match MessageId::from_hex(token) {
            Ok(id) => {
                if seen.insert(id) {
                    ids.push(id);
                }
            }
            Err(_) => tracing::warn!("Ignoring malformed id from peer: {:?}", token),
        }
    }
    ids
}
