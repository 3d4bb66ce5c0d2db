//! # flypost Core
//!
//! Pure primitives for flypost: hex formatting, node identity, and
//! content-addressed messages.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over text and cryptographic data.
//!
//! ## Key Types
//!
//! - [`Message`] - An immutable, optionally signed bulletin board message
//! - [`MessageId`] - Content-addressed identifier (Blake3 hash)
//! - [`NodeIdentity`] - A node's Ed25519 signing identity
//! - [`SenderId`] / [`SenderSignature`] - Sender material carried by signed messages
//!
//! ## Content addressing
//!
//! A message id is a hash over the message's own serialized content; every
//! receiver recomputes it rather than trusting the wire. See [`message`].

pub mod error;
pub mod hexfmt;
pub mod identity;
pub mod message;

pub use error::{IdentityError, MessageError};
pub use identity::{fingerprint, NodeIdentity, SenderId, SenderSignature};
pub use message::{Message, MessageId, TEXT_WIDTH};
