//! # flypost Store
//!
//! The in-memory message store: a mapping from message id to message, with
//! insertion order as the only ordering. Access is internally serialized so
//! the local actor, server sessions, and client pulls can share one store.
//!
//! Persistence is out of scope; a store lives and dies with its node
//! process.

pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::MessageStore;
