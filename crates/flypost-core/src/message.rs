//! The content-addressed message record.
//!
//! A message is immutable once built: fixed-width padded text, an optional
//! sender (public key plus signature, both or neither), and an id derived
//! from the other fields. The id is a Blake3 hash over the padded text bytes
//! and, for signed messages, the uppercase hex encodings of the sender key
//! and signature as ASCII. Every constructor computes the id; nothing ever
//! stores one it was handed.

use std::fmt;

use crate::error::MessageError;
use crate::hexfmt;
use crate::identity::{SenderId, SenderSignature};

/// Stored text width. Texts are right-padded with spaces to exactly this
/// many characters before hashing, so the padded form is part of the id.
pub const TEXT_WIDTH: usize = 160;

/// A 32-byte message identifier: Blake3 over the message's own content.
///
/// Two messages with the same text but different signedness, or different
/// signers, have different ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub [u8; 32]);

impl MessageId {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The wire form: uppercase hex.
    pub fn to_hex(&self) -> String {
        hexfmt::encode(&self.0)
    }

    /// Parse from hex (either case).
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hexfmt::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for MessageId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq)]
struct Sender {
    id: SenderId,
    signature: SenderSignature,
}

/// An immutable bulletin board message.
#[derive(Clone, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    text: String,
    sender: Option<Sender>,
}

impl Message {
    /// Create an unsigned message. Fails if `text` exceeds [`TEXT_WIDTH`]
    /// characters before padding.
    pub fn new(text: &str) -> Result<Self, MessageError> {
        let padded = pad_text(text)?;
        let id = compute_id(&padded, None);
        Ok(Self {
            id,
            text: padded,
            sender: None,
        })
    }

    /// Create a signed message from a text and precomputed sender material.
    ///
    /// The signature is attached as given, not checked; call
    /// [`verify_sender`](Self::verify_sender) to check it.
    pub fn new_signed(
        text: &str,
        sender_id: SenderId,
        signature: SenderSignature,
    ) -> Result<Self, MessageError> {
        let padded = pad_text(text)?;
        let sender = Sender {
            id: sender_id,
            signature,
        };
        let id = compute_id(&padded, Some(&sender));
        Ok(Self {
            id,
            text: padded,
            sender: Some(sender),
        })
    }

    /// Derive a signed message from this one, recomputing the id.
    ///
    /// Signing changes the id: the signed and unsigned forms of the same
    /// text are distinct messages.
    pub fn attach_signature(&self, sender_id: SenderId, signature: SenderSignature) -> Self {
        let sender = Sender {
            id: sender_id,
            signature,
        };
        let id = compute_id(&self.text, Some(&sender));
        Self {
            id,
            text: self.text.clone(),
            sender: Some(sender),
        }
    }

    /// The content-derived id.
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// The stored text, padded to [`TEXT_WIDTH`] characters.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text with padding stripped. This is what a signature covers.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim_end_matches(' ')
    }

    /// Whether sender fields are present.
    pub fn has_sender(&self) -> bool {
        self.sender.is_some()
    }

    /// The sender's public key, if signed.
    pub fn sender_id(&self) -> Option<&SenderId> {
        self.sender.as_ref().map(|s| &s.id)
    }

    /// The sender's signature, if signed.
    pub fn signature(&self) -> Option<&SenderSignature> {
        self.sender.as_ref().map(|s| &s.signature)
    }

    /// Check the sender's signature over the unpadded text.
    ///
    /// `false` for unsigned messages and for any signature that does not
    /// validate. Never panics.
    pub fn verify_sender(&self) -> bool {
        match &self.sender {
            Some(sender) => sender.id.verify(self.trimmed_text(), &sender.signature),
            None => false,
        }
    }

    /// The pipe-delimited form: `id|text` or `id|text|senderhex|sighex`.
    ///
    /// This is both the display form and the wire form.
    pub fn serialize(&self) -> String {
        match &self.sender {
            None => format!("{}|{}", self.id.to_hex(), self.text),
            Some(sender) => format!(
                "{}|{}|{}|{}",
                self.id.to_hex(),
                self.text,
                sender.id.to_hex(),
                sender.signature.to_hex()
            ),
        }
    }

    /// Rebuild a message from its [`serialize`](Self::serialize) form.
    ///
    /// The transmitted id field is discarded and the id recomputed from
    /// content; a receiver never trusts a peer-supplied id. Signatures are
    /// not verified here.
    pub fn parse(s: &str) -> Result<Self, MessageError> {
        let fields: Vec<&str> = s.split('|').collect();
        match fields.len() {
            2 => Self::new(fields[1]),
            4 => {
                let sender_id = SenderId::from_hex(fields[2])?;
                let signature = SenderSignature::from_hex(fields[3])?;
                Self::new_signed(fields[1], sender_id, signature)
            }
            n => Err(MessageError::InvalidFormat(n)),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id)
            .field("text", &self.trimmed_text())
            .field("signed", &self.sender.is_some())
            .finish()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

fn pad_text(text: &str) -> Result<String, MessageError> {
    let length = text.chars().count();
    if length > TEXT_WIDTH {
        return Err(MessageError::TextTooLong {
            length,
            max: TEXT_WIDTH,
        });
    }
    let mut padded = String::with_capacity(text.len() + (TEXT_WIDTH - length));
    padded.push_str(text);
    for _ in length..TEXT_WIDTH {
        padded.push(' ');
    }
    Ok(padded)
}

fn compute_id(padded_text: &str, sender: Option<&Sender>) -> MessageId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(padded_text.as_bytes());
    if let Some(sender) = sender {
        hasher.update(sender.id.to_hex().as_bytes());
        hasher.update(sender.signature.to_hex().as_bytes());
    }
    MessageId(*hasher.finalize().as_bytes())
}
