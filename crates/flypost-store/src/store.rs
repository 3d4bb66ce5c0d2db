//! The in-memory message store.
//!
//! One authoritative view of locally-known messages. All data is lost when
//! the store is dropped. Thread-safe via RwLock: server sessions read it to
//! answer peers while the local actor and client pulls write to it.

use std::collections::HashMap;
use std::sync::RwLock;

use flypost_core::{Message, MessageId, NodeIdentity};

use crate::error::{Result, StoreError};

/// Id-keyed message store with insertion order.
///
/// No two entries share an id; inserting a duplicate is a no-op failure,
/// not a silent success. Insertion order is the only ordering and carries
/// no cross-node meaning.
pub struct MessageStore {
    inner: RwLock<StoreInner>,
}

struct StoreInner {
    /// Messages indexed by id.
    messages: HashMap<MessageId, Message>,

    /// Ids in insertion order.
    order: Vec<MessageId>,
}

impl MessageStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                messages: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }

    /// Insert a message, rejecting an already-present id.
    pub fn add(&self, message: Message) -> Result<()> {
        let mut inner = self.inner.write().unwrap();

        let id = message.id();
        if inner.messages.contains_key(&id) {
            return Err(StoreError::Duplicate { id });
        }

        inner.messages.insert(id, message);
        inner.order.push(id);
        Ok(())
    }

    /// Create a message from `text`, sign it with `signer` if given, and
    /// insert it. Returns the stored message.
    ///
    /// Trailing spaces are indistinguishable from padding once stored, so
    /// `text` is trimmed to its canonical form before hashing and signing.
    pub fn publish(&self, text: &str, signer: Option<&NodeIdentity>) -> Result<Message> {
        let text = text.trim_end_matches(' ');
        let message = match signer {
            None => Message::new(text)?,
            Some(identity) => {
                let signature = identity.sign_text(text);
                Message::new_signed(text, identity.sender_id(), signature)?
            }
        };
        self.add(message.clone())?;
        Ok(message)
    }

    /// Whether a message with this id is present.
    pub fn contains(&self, id: &MessageId) -> bool {
        let inner = self.inner.read().unwrap();
        inner.messages.contains_key(id)
    }

    /// Fetch one message by id.
    pub fn get(&self, id: &MessageId) -> Option<Message> {
        let inner = self.inner.read().unwrap();
        inner.messages.get(id).cloned()
    }

    /// All stored messages in insertion order.
    pub fn messages(&self) -> Vec<Message> {
        let inner = self.inner.read().unwrap();
        inner
            .order
            .iter()
            .filter_map(|id| inner.messages.get(id).cloned())
            .collect()
    }

    /// The requested ids' messages, in requested order.
    ///
    /// Ids not present are silently skipped; callers use this to fetch
    /// exactly a computed diff set.
    pub fn select(&self, ids: &[MessageId]) -> Vec<Message> {
        let inner = self.inner.read().unwrap();
        ids.iter()
            .filter_map(|id| inner.messages.get(id).cloned())
            .collect()
    }

    /// All stored ids in insertion order.
    pub fn ids(&self) -> Vec<MessageId> {
        let inner = self.inner.read().unwrap();
        inner.order.clone()
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap();
        inner.order.len()
    }

    /// Whether the store holds no messages.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let store = MessageStore::new();
        let message = Message::new("first post").unwrap();
        let id = message.id();

        store.add(message).unwrap();
        assert!(store.contains(&id));
        assert_eq!(store.get(&id).unwrap().trimmed_text(), "first post");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected_store_unchanged() {
        let store = MessageStore::new();
        let message = Message::new("once").unwrap();
        let id = message.id();

        store.add(message.clone()).unwrap();
        assert_eq!(store.add(message), Err(StoreError::Duplicate { id }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_messages_in_insertion_order() {
        let store = MessageStore::new();
        for text in ["a", "b", "c"] {
            store.add(Message::new(text).unwrap()).unwrap();
        }
        let texts: Vec<String> = store
            .messages()
            .iter()
            .map(|m| m.trimmed_text().to_owned())
            .collect();
        assert_eq!(texts, ["a", "b", "c"]);
    }

    #[test]
    fn test_ids_match_messages() {
        let store = MessageStore::new();
        for text in ["x", "y"] {
            store.add(Message::new(text).unwrap()).unwrap();
        }
        let ids = store.ids();
        let from_messages: Vec<MessageId> = store.messages().iter().map(|m| m.id()).collect();
        assert_eq!(ids, from_messages);
    }

    #[test]
    fn test_select_requested_order_skips_missing() {
        let store = MessageStore::new();
        let a = Message::new("a").unwrap();
        let b = Message::new("b").unwrap();
        let absent = Message::new("never stored").unwrap();
        store.add(a.clone()).unwrap();
        store.add(b.clone()).unwrap();

        let picked = store.select(&[b.id(), absent.id(), a.id()]);
        let ids: Vec<MessageId> = picked.iter().map(|m| m.id()).collect();
        assert_eq!(ids, [b.id(), a.id()]);
    }

    #[test]
    fn test_publish_unsigned() {
        let store = MessageStore::new();
        let message = store.publish("plain", None).unwrap();
        assert!(!message.has_sender());
        assert!(store.contains(&message.id()));
    }

    #[test]
    fn test_publish_signed_verifies() {
        let store = MessageStore::new();
        let identity = NodeIdentity::from_seed(&[6u8; 32]);
        let message = store.publish("signed", Some(&identity)).unwrap();
        assert!(message.has_sender());
        assert!(message.verify_sender());
        assert_eq!(message.sender_id(), Some(&identity.sender_id()));
    }

    #[test]
    fn test_publish_too_long_leaves_store_unchanged() {
        let store = MessageStore::new();
        let text = "x".repeat(200);
        assert!(store.publish(&text, None).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_publish_same_text_twice_is_duplicate() {
        let store = MessageStore::new();
        store.publish("same", None).unwrap();
        assert!(matches!(
            store.publish("same", None),
            Err(StoreError::Duplicate { .. })
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_publish_trims_trailing_spaces_before_signing() {
        let store = MessageStore::new();
        let identity = NodeIdentity::from_seed(&[8u8; 32]);
        let message = store.publish("padded out   ", Some(&identity)).unwrap();
        assert_eq!(message.trimmed_text(), "padded out");
        assert!(message.verify_sender());
    }

    #[test]
    fn test_signed_and_unsigned_same_text_coexist() {
        let store = MessageStore::new();
        let identity = NodeIdentity::from_seed(&[7u8; 32]);
        store.publish("shared text", None).unwrap();
        store.publish("shared text", Some(&identity)).unwrap();
        assert_eq!(store.len(), 2);
    }
}
