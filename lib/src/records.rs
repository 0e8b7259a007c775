//! Capture-row ingestion.
//!
//! The scanning transport materializes its output as headerless CSV rows:
//! `timestamp,rssi,public_key,battery,hint,radio_address,raw_payload`.
//! This module parses those rows back into [`Sighting`]s and enforces the
//! ascending-timestamp contract the windowing stages rely on, so the core
//! never has to re-check ordering.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::errors::RecordError;
use crate::identity::PUBLIC_KEY_LEN;
use crate::sighting::Sighting;

/// One row of the capture schema, as written by the scanner.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureRow {
    pub timestamp: f64,
    pub rssi: i32,
    pub public_key: String,
    pub battery: String,
    pub hint: String,
    pub radio_address: String,
    pub raw_payload: String,
}

impl CaptureRow {
    pub fn into_sighting(self) -> Result<Sighting, RecordError> {
        let key = decode_hex_field("public_key", &self.public_key)?;
        let public_key: [u8; PUBLIC_KEY_LEN] = key
            .try_into()
            .map_err(|bytes: Vec<u8>| RecordError::KeyLength(bytes.len()))?;

        Ok(Sighting {
            timestamp: self.timestamp,
            rssi: self.rssi,
            public_key,
            battery: parse_hex_byte("battery", &self.battery)?,
            hint: parse_hex_byte("hint", &self.hint)?,
            address: parse_mac(&self.radio_address)?,
            payload: decode_hex_field("raw_payload", &self.raw_payload)?,
        })
    }
}

/// Parse a colon-separated MAC like `D7:34:BC:47:8B:0C`.
pub fn parse_mac(value: &str) -> Result<[u8; 6], RecordError> {
    let mut address = [0u8; 6];
    let mut octets = 0;
    for (i, part) in value.split(':').enumerate() {
        if i >= 6 || part.len() != 2 {
            return Err(RecordError::MacFormat(value.to_string()));
        }
        address[i] = u8::from_str_radix(part, 16)
            .map_err(|_| RecordError::MacFormat(value.to_string()))?;
        octets = i + 1;
    }
    if octets != 6 {
        return Err(RecordError::MacFormat(value.to_string()));
    }
    Ok(address)
}

/// Format a radio address the way the capture schema spells it.
pub fn format_mac(address: &[u8; 6]) -> String {
    address
        .iter()
        .map(|octet| format!("{octet:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

fn decode_hex_field(field: &'static str, value: &str) -> Result<Vec<u8>, RecordError> {
    hex::decode(value).map_err(|source| RecordError::Hex { field, source })
}

fn parse_hex_byte(field: &'static str, value: &str) -> Result<u8, RecordError> {
    match decode_hex_field(field, value)?[..] {
        [byte] => Ok(byte),
        _ => Err(RecordError::Hex {
            field,
            source: hex::FromHexError::InvalidStringLength,
        }),
    }
}

/// Read capture rows from any reader and validate their ordering.
pub fn read_sightings<R: Read>(input: R) -> Result<Vec<Sighting>, RecordError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(input);

    let mut sightings = Vec::new();
    for row in reader.deserialize::<CaptureRow>() {
        sightings.push(row?.into_sighting()?);
    }

    for (index, pair) in sightings.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(RecordError::UnsortedTimestamps { index: index + 1 });
        }
    }

    Ok(sightings)
}

/// Load all capture rows of an aggregate file.
pub fn load_sightings(path: &Path) -> Result<Vec<Sighting>, RecordError> {
    let sightings = read_sightings(File::open(path)?)?;
    log::trace!(
        "Loaded {} capture rows from {}",
        sightings.len(),
        path.display()
    );
    Ok(sightings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sighting::RawAdvertisement;

    const ROW: &str = "1681001000.123,-60,\
        9734bc478b0c0102030405060708090a0b0c0d0e0f10111213141516,90,00,\
        D7:34:BC:47:8B:0C,\
        1219900102030405060708090a0b0c0d0e0f101112131415160200\n";

    #[test]
    fn parses_a_captured_row() {
        let sightings = read_sightings(ROW.as_bytes()).expect("valid row");
        assert_eq!(sightings.len(), 1);

        let s = &sightings[0];
        assert_eq!(s.timestamp, 1681001000.123);
        assert_eq!(s.rssi, -60);
        assert_eq!(s.battery, 0x90);
        assert_eq!(s.hint, 0x00);
        assert_eq!(s.address, [0xd7, 0x34, 0xbc, 0x47, 0x8b, 0x0c]);
        assert!(s.is_tracking_tag());
    }

    #[test]
    fn row_key_matches_reconstruction_from_its_own_payload() {
        let s = &read_sightings(ROW.as_bytes()).expect("valid row")[0];
        let rebuilt = Sighting::from_advertisement(&RawAdvertisement {
            address: s.address,
            payload: s.payload.clone(),
            rssi: s.rssi,
            timestamp: s.timestamp,
        })
        .expect("payload decodes");
        assert_eq!(rebuilt.public_key, s.public_key);
    }

    #[test]
    fn rejects_malformed_mac() {
        assert!(matches!(parse_mac("D7:34:BC"), Err(RecordError::MacFormat(_))));
        assert!(matches!(
            parse_mac("D7:34:BC:47:8B:0C:FF"),
            Err(RecordError::MacFormat(_))
        ));
        assert!(matches!(
            parse_mac("G7:34:BC:47:8B:0C"),
            Err(RecordError::MacFormat(_))
        ));
    }

    #[test]
    fn mac_round_trip() {
        let address = parse_mac("D7:34:BC:47:8B:0C").unwrap();
        assert_eq!(format_mac(&address), "D7:34:BC:47:8B:0C");
    }

    #[test]
    fn rejects_short_public_key() {
        let row = ROW.replacen(
            "9734bc478b0c0102030405060708090a0b0c0d0e0f10111213141516",
            "9734bc",
            1,
        );
        assert!(matches!(
            read_sightings(row.as_bytes()),
            Err(RecordError::KeyLength(3))
        ));
    }

    #[test]
    fn rejects_out_of_order_rows() {
        let mut rows = String::from(ROW);
        rows.push_str(&ROW.replacen("1681001000.123", "1681000999.000", 1));
        assert!(matches!(
            read_sightings(rows.as_bytes()),
            Err(RecordError::UnsortedTimestamps { index: 1 })
        ));
    }
}
