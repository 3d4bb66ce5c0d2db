//! Hex formatting helpers shared by identities, messages, and the wire format.
//!
//! Encoding is always uppercase. `encode_with` appends the separator after
//! every byte, the last one included; fingerprint truncation counts on that
//! trailing separator being present.

/// Encode bytes as plain uppercase hex.
pub fn encode(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Encode bytes as uppercase hex with `separator` appended after each byte.
pub fn encode_with(bytes: &[u8], separator: &str) -> String {
    let mut out = String::with_capacity(bytes.len() * (2 + separator.len()));
    for byte in bytes {
        out.push_str(&hex::encode_upper([*byte]));
        out.push_str(separator);
    }
    out
}

/// Decode a hex string, accepting either letter case.
///
/// An odd digit count is rounded down to the last whole byte rather than
/// rejected; the trailing half-byte is dropped.
pub fn decode(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    decode_with(s, "")
}

/// Decode a hex string produced by [`encode_with`], stripping `separator`
/// occurrences first.
pub fn decode_with(s: &str, separator: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let stripped = if separator.is_empty() {
        s.to_owned()
    } else {
        s.replace(separator, "")
    };
    let digits = stripped.as_bytes();
    let whole = digits.len() & !1;
    hex::decode(&digits[..whole])
}
