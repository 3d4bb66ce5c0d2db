//! Two nodes converging through the facade API.

use flypost::{fingerprint, Node, NodeConfig, PROTOCOL_VERSION};

fn test_config() -> NodeConfig {
    NodeConfig {
        listen_addr: "127.0.0.1".to_owned(),
        listen_port: 0,
        poll_interval_ms: 50,
        ..NodeConfig::default()
    }
}

#[tokio::test]
async fn test_two_nodes_converge() {
    let alice = Node::new(test_config());
    let bob = Node::new(test_config());

    alice.publish("from alice", false).unwrap();
    alice.publish("signed by alice", true).unwrap();
    bob.publish("from bob", true).unwrap();

    let alice_server = alice.serve().await.unwrap();
    let bob_server = bob.serve().await.unwrap();

    let got = bob
        .pull_from("127.0.0.1", alice_server.port())
        .await
        .unwrap();
    assert_eq!(got, 2);

    let got = alice
        .pull_from("127.0.0.1", bob_server.port())
        .await
        .unwrap();
    assert_eq!(got, 1);

    assert_eq!(alice.store().len(), 3);
    assert_eq!(bob.store().len(), 3);

    let mut alice_ids = alice.store().ids();
    let mut bob_ids = bob.store().ids();
    alice_ids.sort_by_key(|id| *id.as_bytes());
    bob_ids.sort_by_key(|id| *id.as_bytes());
    assert_eq!(alice_ids, bob_ids);

    // Alice's signed message still verifies on bob's side, and names her.
    let from_alice = bob
        .store()
        .messages()
        .into_iter()
        .find(|m| m.trimmed_text() == "signed by alice")
        .unwrap();
    assert!(from_alice.verify_sender());
    assert_eq!(from_alice.sender_id().unwrap().to_hex(), alice.node_id());

    alice_server.shutdown().await;
    bob_server.shutdown().await;
}

#[tokio::test]
async fn test_pull_is_idempotent() {
    let alice = Node::new(test_config());
    let bob = Node::new(test_config());
    alice.publish("one", false).unwrap();

    let server = alice.serve().await.unwrap();

    assert_eq!(bob.pull_from("127.0.0.1", server.port()).await.unwrap(), 1);
    assert_eq!(bob.pull_from("127.0.0.1", server.port()).await.unwrap(), 0);
    assert_eq!(bob.store().len(), 1);

    server.shutdown().await;
}

#[tokio::test]
async fn test_peer_version_and_id() {
    let alice = Node::new(test_config());
    let bob = Node::new(test_config());

    let server = alice.serve().await.unwrap();

    let version = bob
        .peer_version("127.0.0.1", server.port())
        .await
        .unwrap();
    assert_eq!(version, PROTOCOL_VERSION);

    let peer_id = bob.peer_id("127.0.0.1", server.port()).await.unwrap();
    assert_eq!(peer_id, alice.node_id());
    assert_eq!(fingerprint(&peer_id), alice.fingerprint());

    server.shutdown().await;
}

#[tokio::test]
async fn test_pull_failure_leaves_store_intact() {
    let bob = Node::new(test_config());
    bob.publish("safe", false).unwrap();

    // Nothing listens on this port.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    assert!(bob.pull_from("127.0.0.1", port).await.is_err());
    assert_eq!(bob.store().len(), 1);
}
