//! # flypost
//!
//! A minimal peer-to-peer bulletin board node: short text messages,
//! optionally signed, held in an append-only in-memory store and
//! reconciled between nodes by pulling whatever is missing.
//!
//! This crate is the unified API. [`Node`] owns an identity, a store, and
//! the sync protocol's client side, and hands out a server handle for the
//! listening side.
//!
//! ```rust,no_run
//! use flypost::{Node, NodeConfig};
//!
//! # async fn example() -> flypost::Result<()> {
//! let node = Node::new(NodeConfig::default());
//! node.publish("hello, board", true)?;
//!
//! let server = node.serve().await?;
//! let fetched = node.pull_from("203.0.113.7", 1337).await?;
//! println!("pulled {} messages", fetched);
//! server.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod node;

pub use config::NodeConfig;
pub use error::{ConfigError, NodeError, Result};
pub use node::Node;

pub use flypost_core::{fingerprint, Message, MessageId, NodeIdentity};
pub use flypost_store::MessageStore;
pub use flypost_sync::{parse_port, ClientError, ServerHandle, PROTOCOL_VERSION};
