//! Public-key reconstruction from the radio address and payload.
//!
//! The tag's compressed public key is not transmitted whole. The link layer
//! forces the top two bits of a random static address to signal the address
//! type, so the key's leading two bits travel in the payload instead and the
//! address octet 0 carries only the key's low six bits. Address octets 1-5
//! and the 22 payload key bytes are used verbatim.

use crate::frame::DecodedFrame;

/// Length of the reassembled compressed public key:
/// 1 merged byte + 5 address octets + 22 payload key bytes.
pub const PUBLIC_KEY_LEN: usize = 28;

/// Reassemble the compressed public key.
///
/// Layout: [merged byte 0][address octets 1-5][payload key bytes 0-21].
pub fn reconstruct_public_key(address: &[u8; 6], frame: &DecodedFrame) -> [u8; PUBLIC_KEY_LEN] {
    let mut key = [0u8; PUBLIC_KEY_LEN];
    key[0] = (frame.key_high_bits << 6) | (address[0] & 0x3f);
    key[1..6].copy_from_slice(&address[1..6]);
    key[6..].copy_from_slice(&frame.key_bytes);
    key
}
