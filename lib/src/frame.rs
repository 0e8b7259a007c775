//! Offline-finding advertisement frame
//!
//! This module defines types and handles extraction of the fixed-layout
//! manufacturer payload broadcast by offline-finding tags (company
//! identifier 0x004C). Payloads of other accessory types are filtered
//! upstream by the marker check, not reported as errors.
use bilge::prelude::*;

/// Two-byte type/length marker opening every offline-finding payload.
pub const FRAME_MARKER: [u8; 2] = [0x12, 0x19];

/// Minimum payload size: marker(2) + battery(1) + key bytes(22)
/// + key high bits(1) + hint(1).
pub const MIN_PAYLOAD_LEN: usize = 27;

const BATTERY_OFFSET: usize = 2;
const KEY_BYTES_OFFSET: usize = 3;
const KEY_HIGH_BITS_OFFSET: usize = 25;
const HINT_OFFSET: usize = 26;

/// Vendor status byte carried in the advertisement.
///
/// The layout is reverse engineered and mostly undocumented; only the
/// accessory-kind bits have a known reading, so the surrounding fields
/// keep neutral names. Field order is LSB first.
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy)]
pub struct StatusByte {
    pub unknown_low: u4,
    pub accessory_kind: u2,
    pub unknown_high: u2,
}

impl StatusByte {
    /// Best-effort classification of the advertiser as the tracked tag type.
    ///
    /// Accessory kind 0b01 has only been observed on the target tags; other
    /// accessories sharing the company identifier use different values. This
    /// is a heuristic over a vendor bit-field, not a protocol constant.
    pub fn is_tracking_tag(self) -> bool {
        self.accessory_kind() == u2::new(0b01)
    }
}

/// Fixed-layout fields extracted from one offline-finding payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub battery: u8,
    pub key_bytes: [u8; 22],
    /// Leading two bits of the public key, carried in the low two bits
    /// of the payload byte they are extracted from.
    pub key_high_bits: u8,
    pub hint: u8,
}

impl DecodedFrame {
    /// Parse a manufacturer payload.
    ///
    /// Returns `None` when the payload is not an offline-finding frame
    /// (wrong marker or too short). That is the common case for unrelated
    /// nearby traffic and deliberately not an error.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        if payload.len() < MIN_PAYLOAD_LEN || payload[..2] != FRAME_MARKER {
            return None;
        }

        let mut key_bytes = [0u8; 22];
        key_bytes.copy_from_slice(&payload[KEY_BYTES_OFFSET..KEY_BYTES_OFFSET + 22]);

        Some(Self {
            battery: payload[BATTERY_OFFSET],
            key_bytes,
            key_high_bits: payload[KEY_HIGH_BITS_OFFSET] & 0b11,
            hint: payload[HINT_OFFSET],
        })
    }

    /// Bit-level view of the battery byte.
    pub fn status(&self) -> StatusByte {
        StatusByte::from(self.battery)
    }
}
