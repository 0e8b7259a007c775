//! Sighting data structs used throughout the library.

use crate::frame::{DecodedFrame, StatusByte};
use crate::identity::{reconstruct_public_key, PUBLIC_KEY_LEN};
use crate::window::Timestamped;

/**
 * One advertisement as delivered by the scanning transport.
 */
#[derive(Debug, Clone)]
pub struct RawAdvertisement {
    /// Randomized link-layer address the tag advertised under.
    pub address: [u8; 6],
    /// Manufacturer data for company identifier 0x004C.
    pub payload: Vec<u8>,
    pub rssi: i32,
    /// Capture time in seconds with sub-second precision.
    pub timestamp: f64,
}

/**
 * A decoded, identity-reconstructed sighting of one tag.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Sighting {
    pub timestamp: f64,
    pub rssi: i32,
    pub public_key: [u8; PUBLIC_KEY_LEN],
    pub battery: u8,
    pub hint: u8,
    pub address: [u8; 6],
    /// Raw manufacturer payload, retained for dedup and audit.
    pub payload: Vec<u8>,
}

impl Sighting {
    /// Decode a raw advertisement and reconstruct the tag identity.
    ///
    /// Returns `None` for payloads that are not offline-finding frames.
    pub fn from_advertisement(raw: &RawAdvertisement) -> Option<Self> {
        let frame = DecodedFrame::parse(&raw.payload)?;
        Some(Self {
            timestamp: raw.timestamp,
            rssi: raw.rssi,
            public_key: reconstruct_public_key(&raw.address, &frame),
            battery: frame.battery,
            hint: frame.hint,
            address: raw.address,
            payload: raw.payload.clone(),
        })
    }

    /// Best-effort tag classification from the vendor status byte.
    pub fn is_tracking_tag(&self) -> bool {
        StatusByte::from(self.battery).is_tracking_tag()
    }
}

impl Timestamped for Sighting {
    fn timestamp(&self) -> f64 {
        self.timestamp
    }
}
