use data_encoding::BASE32HEX_NOPAD;
use uuid::Uuid;

/// Generate a fresh calendar event identifier.
///
/// A random UUIDv4 encoded as unpadded lowercase base32hex: 26 characters
/// from `[0-9a-v]`, which the calendar service accepts as a client-chosen id.
pub fn new_event_id() -> String {
    encode_base32hex(Uuid::new_v4().as_bytes())
}

/// Encode bytes as unpadded lowercase base32hex
pub fn encode_base32hex(bytes: &[u8]) -> String {
    BASE32HEX_NOPAD.encode(bytes).to_ascii_lowercase()
}
