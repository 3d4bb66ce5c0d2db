//! # flypost Sync
//!
//! The pull synchronization protocol: a line-oriented request/response
//! exchange over TCP, one request per connection.
//!
//! ## Message Flow
//!
//! ```text
//! Puller                              Peer
//!   |-------- GET LIST --------------->|
//!   |<------- id;id;id ----------------|
//!   |                                  |   (diff against local store)
//!   |-------- GET MSGS id;id --------->|
//!   |<------- msg;msg -----------------|
//! ```
//!
//! The second round trip is skipped entirely when the diff is empty, and
//! collapses to a bare `GET MSGS` when everything is missing.
//!
//! ## Key Properties
//!
//! - **Idempotent**: pulling twice changes nothing the second time
//! - **Bounded**: every accept, read, and write runs under a timeout
//! - **Contained**: one bad session or one bad entry never stops the node

pub mod client;
pub mod error;
pub mod server;
pub mod wire;

pub use client::{parse_port, ClientConfig, SyncClient};
pub use error::{ClientError, ProtocolError, Result};
pub use server::{serve_connection, start, ServerConfig, ServerHandle};
pub use wire::{limits, Request, PROTOCOL_VERSION, SYNTAX_ERROR};
