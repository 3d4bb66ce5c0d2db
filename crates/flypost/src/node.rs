//! The Node: a complete flypost participant.
//!
//! A node ties together an identity, a message store, and the sync
//! protocol's two sides into one interface the shell (or any embedding
//! program) drives.

use std::sync::Arc;

use flypost_core::{fingerprint, Message, NodeIdentity};
use flypost_store::MessageStore;
use flypost_sync::{ServerHandle, SyncClient};

use crate::config::NodeConfig;
use crate::error::Result;

/// A bulletin board node: identity plus store plus sync.
pub struct Node {
    /// This node's signing identity, held in memory for the process's life.
    identity: NodeIdentity,
    /// The shared message store.
    store: Arc<MessageStore>,
    /// Configuration.
    config: NodeConfig,
}

impl Node {
    /// Create a node with a fresh identity and an empty store.
    pub fn new(config: NodeConfig) -> Self {
        Self::with_identity(NodeIdentity::generate(), config)
    }

    /// Create a node around an existing identity.
    pub fn with_identity(identity: NodeIdentity, config: NodeConfig) -> Self {
        Self {
            identity,
            store: Arc::new(MessageStore::new()),
            config,
        }
    }

    /// This node's id: uppercase hex of its public key.
    pub fn node_id(&self) -> String {
        self.identity.node_id()
    }

    /// This node's display fingerprint.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.node_id())
    }

    /// The message store.
    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// The configuration this node runs with.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Append a message to the local board, signed by this node if asked.
    pub fn publish(&self, text: &str, sign: bool) -> Result<Message> {
        let signer = sign.then_some(&self.identity);
        Ok(self.store.publish(text, signer)?)
    }

    /// Start serving the store on the configured listen address.
    pub async fn serve(&self) -> Result<ServerHandle> {
        let handle = flypost_sync::start(
            self.config.listen_on(),
            Arc::clone(&self.store),
            self.node_id(),
            self.config.server_config(),
        )
        .await?;
        Ok(handle)
    }

    /// Pull missing messages from a peer. Returns how many the diff found.
    pub async fn pull_from(&self, host: &str, port: u16) -> Result<usize> {
        Ok(self.client().pull(host, port).await?)
    }

    /// Ask a peer for its protocol version.
    pub async fn peer_version(&self, host: &str, port: u16) -> Result<String> {
        Ok(self.client().version(host, port).await?)
    }

    /// Ask a peer for its node id.
    pub async fn peer_id(&self, host: &str, port: u16) -> Result<String> {
        Ok(self.client().node_id(host, port).await?)
    }

    fn client(&self) -> SyncClient {
        SyncClient::new(Arc::clone(&self.store), self.config.client_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_unsigned_and_signed() {
        let node = Node::new(NodeConfig::default());

        let plain = node.publish("plain post", false).unwrap();
        assert!(!plain.has_sender());

        let signed = node.publish("signed post", true).unwrap();
        assert!(signed.has_sender());
        assert!(signed.verify_sender());
        assert_eq!(node.store().len(), 2);
    }

    #[test]
    fn test_fingerprint_matches_free_function() {
        let node = Node::new(NodeConfig::default());
        assert_eq!(node.fingerprint(), fingerprint(&node.node_id()));
        assert_eq!(node.fingerprint().len(), 23);
    }

    #[test]
    fn test_node_id_is_stable() {
        let node = Node::new(NodeConfig::default());
        assert_eq!(node.node_id(), node.node_id());
    }
}
