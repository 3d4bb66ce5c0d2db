//! Node identity and message signing.
//!
//! A node is identified by the uppercase hex encoding of its Ed25519 public
//! key. Signatures cover the unpadded message text concatenated with the
//! signer's node id, so a signature binds a text to exactly one author.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use std::fmt;

use crate::error::IdentityError;
use crate::hexfmt;

/// Number of leading digest bytes shown in a fingerprint.
const FINGERPRINT_BYTES: usize = 8;

/// A 32-byte Ed25519 public key identifying a message author.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SenderId(pub [u8; 32]);

impl SenderId {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The node id form: uppercase hex of the public key.
    pub fn to_hex(&self) -> String {
        hexfmt::encode(&self.0)
    }

    /// Parse from hex (either case).
    pub fn from_hex(s: &str) -> Result<Self, IdentityError> {
        let bytes = hexfmt::decode(s).map_err(|_| IdentityError::InvalidSenderKey)?;
        if bytes.len() != 32 {
            return Err(IdentityError::InvalidSenderKey);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Check a signature over `text` claimed by this sender.
    ///
    /// Returns `false` for any failure, including key bytes that do not
    /// decode to a valid public key. Never panics, never errors.
    pub fn verify(&self, text: &str, signature: &SenderSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        let sig = Signature::from_bytes(&signature.0);
        let bytes = signed_bytes(text, &self.to_hex());
        verifying_key.verify(&bytes, &sig).is_ok()
    }
}

impl fmt::Debug for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SenderId({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for SenderId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 64-byte Ed25519 signature over a message text and its author's node id.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SenderSignature(pub [u8; 64]);

impl SenderSignature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to uppercase hex.
    pub fn to_hex(&self) -> String {
        hexfmt::encode(&self.0)
    }

    /// Parse from hex (either case).
    pub fn from_hex(s: &str) -> Result<Self, IdentityError> {
        let bytes = hexfmt::decode(s).map_err(|_| IdentityError::InvalidSignature)?;
        if bytes.len() != 64 {
            return Err(IdentityError::InvalidSignature);
        }
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for SenderSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SenderSignature({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for SenderSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A node's signing identity.
///
/// Wraps ed25519-dalek's SigningKey. Generation cannot fail.
#[derive(Clone)]
pub struct NodeIdentity {
    signing_key: SigningKey,
}

impl NodeIdentity {
    /// Generate a new random identity.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed. Deterministic; used for tests.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// The public key as a sender id.
    pub fn sender_id(&self) -> SenderId {
        SenderId(self.signing_key.verifying_key().to_bytes())
    }

    /// The node id string: uppercase hex of the public key.
    pub fn node_id(&self) -> String {
        self.sender_id().to_hex()
    }

    /// Sign an unpadded message text.
    pub fn sign_text(&self, text: &str) -> SenderSignature {
        let bytes = signed_bytes(text, &self.node_id());
        let sig = self.signing_key.sign(&bytes);
        SenderSignature(sig.to_bytes())
    }
}

impl fmt::Debug for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeIdentity({:?})", self.sender_id())
    }
}

/// The byte string a message signature covers.
fn signed_bytes(text: &str, node_id: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(text.len() + node_id.len());
    buf.extend_from_slice(text.as_bytes());
    buf.extend_from_slice(node_id.as_bytes());
    buf
}

/// Human-checkable fingerprint of a node id.
///
/// SHA-256 over the node id string, space-separated uppercase hex, truncated
/// to the first eight bytes. Display and out-of-band verification only; the
/// protocol always matches on full node ids.
pub fn fingerprint(node_id: &str) -> String {
    use sha2::{Digest, Sha256};

    let digest = Sha256::digest(node_id.as_bytes());
    let formatted = hexfmt::encode_with(&digest, " ");
    formatted[..FINGERPRINT_BYTES * 3 - 1].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let identity = NodeIdentity::generate();
        let signature = identity.sign_text("hello board");
        assert!(identity.sender_id().verify("hello board", &signature));
    }

    #[test]
    fn test_verify_rejects_tampered_text() {
        let identity = NodeIdentity::generate();
        let signature = identity.sign_text("hello board");
        assert!(!identity.sender_id().verify("hello boarD", &signature));
    }

    #[test]
    fn test_verify_rejects_wrong_signer() {
        let alice = NodeIdentity::from_seed(&[1u8; 32]);
        let mallory = NodeIdentity::from_seed(&[2u8; 32]);
        let signature = alice.sign_text("from alice");
        assert!(!mallory.sender_id().verify("from alice", &signature));
    }

    #[test]
    fn test_verify_rejects_invalid_key_bytes() {
        // 0xFF..FF is not a canonical curve point; verify must say no, not panic.
        let bogus = SenderId::from_bytes([0xFF; 32]);
        let identity = NodeIdentity::generate();
        let signature = identity.sign_text("whatever");
        assert!(!bogus.verify("whatever", &signature));
    }

    #[test]
    fn test_verify_rejects_garbage_signature() {
        let identity = NodeIdentity::generate();
        let garbage = SenderSignature::from_bytes([0u8; 64]);
        assert!(!identity.sender_id().verify("hello", &garbage));
    }

    #[test]
    fn test_node_id_is_uppercase_hex() {
        let identity = NodeIdentity::from_seed(&[7u8; 32]);
        let node_id = identity.node_id();
        assert_eq!(node_id.len(), 64);
        assert!(node_id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_deterministic_from_seed() {
        let a = NodeIdentity::from_seed(&[9u8; 32]);
        let b = NodeIdentity::from_seed(&[9u8; 32]);
        assert_eq!(a.node_id(), b.node_id());
    }

    #[test]
    fn test_sender_id_hex_roundtrip() {
        let identity = NodeIdentity::generate();
        let id = identity.sender_id();
        assert_eq!(SenderId::from_hex(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn test_sender_id_from_hex_wrong_length() {
        assert_eq!(
            SenderId::from_hex("ABCD"),
            Err(IdentityError::InvalidSenderKey)
        );
    }

    #[test]
    fn test_signature_from_hex_wrong_length() {
        assert_eq!(
            SenderSignature::from_hex("ABCD"),
            Err(IdentityError::InvalidSignature)
        );
    }

    #[test]
    fn test_fingerprint_shape() {
        let identity = NodeIdentity::from_seed(&[3u8; 32]);
        let fp = fingerprint(&identity.node_id());
        // Eight byte groups, two digits each, single spaces between.
        assert_eq!(fp.len(), 23);
        let groups: Vec<&str> = fp.split(' ').collect();
        assert_eq!(groups.len(), 8);
        for group in groups {
            assert_eq!(group.len(), 2);
            assert!(group.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_fingerprint_deterministic_and_distinct() {
        let a = NodeIdentity::from_seed(&[4u8; 32]);
        let b = NodeIdentity::from_seed(&[5u8; 32]);
        assert_eq!(fingerprint(&a.node_id()), fingerprint(&a.node_id()));
        assert_ne!(fingerprint(&a.node_id()), fingerprint(&b.node_id()));
    }
}
