//! Rotation-epoch correlation.
//!
//! A tag resists long-term tracking by rotating its radio address every
//! fixed interval. Each address lifetime gets a stable session identity
//! here, and every sighting is labeled with the rotation interval it fell
//! into. Sightings of the same address within one interval collapse onto
//! one noise point; a rotation always starts a fresh session, so an
//! observer cannot link intervals across it. The number of distinct noise
//! points bounds how many pseudo-identities an observer could form.

use std::collections::HashMap;

use crate::errors::ConfigError;
use crate::sighting::Sighting;

/// Label for one (address lifetime, rotation interval) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoisePoint {
    pub session: u64,
    pub epoch: i64,
}

/// Per-address session state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddressSession {
    /// Monotonically increasing identity, allocated on first sighting.
    pub id: u64,
    /// First sighting time shifted back half an epoch. The fixed shift
    /// decorrelates epoch boundaries across independently rotating
    /// addresses without introducing randomness.
    pub epoch_origin: f64,
}

/// Assigns session identities and epoch indices to sightings.
///
/// Owns the session table and the identity counter, so independent
/// analysis runs never share state. Addresses are never evicted; the
/// input is a closed batch, not a live stream.
pub struct EpochCorrelator {
    epoch_length: f64,
    sessions: HashMap<[u8; 6], AddressSession>,
    next_id: u64,
}

impl EpochCorrelator {
    pub fn new(epoch_length: f64) -> Result<Self, ConfigError> {
        if epoch_length <= 0.0 {
            return Err(ConfigError::NonPositiveEpochLength(epoch_length));
        }
        Ok(Self {
            epoch_length,
            sessions: HashMap::new(),
            next_id: 1,
        })
    }

    /// Label one sighting of `address` at `timestamp`.
    ///
    /// The first sighting of an address allocates the next session
    /// identity and fixes the address's epoch origin.
    pub fn label(&mut self, address: [u8; 6], timestamp: f64) -> NoisePoint {
        let epoch_length = self.epoch_length;
        let next_id = &mut self.next_id;
        let session = self.sessions.entry(address).or_insert_with(|| {
            let id = *next_id;
            *next_id += 1;
            AddressSession {
                id,
                epoch_origin: timestamp - epoch_length / 2.0,
            }
        });
        NoisePoint {
            session: session.id,
            epoch: ((timestamp - session.epoch_origin) / epoch_length).floor() as i64,
        }
    }

    /// Label a batch of sightings, in input order.
    pub fn correlate(&mut self, sightings: &[Sighting]) -> Vec<NoisePoint> {
        sightings
            .iter()
            .map(|s| self.label(s.address, s.timestamp))
            .collect()
    }

    /// The session table built so far, keyed by radio address.
    pub fn sessions(&self) -> &HashMap<[u8; 6], AddressSession> {
        &self.sessions
    }

    pub fn epoch_length(&self) -> f64 {
        self.epoch_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR_A: [u8; 6] = [0xd7, 0x34, 0xbc, 0x47, 0x8b, 0x0c];
    const ADDR_B: [u8; 6] = [0x5e, 0x11, 0x22, 0x33, 0x44, 0x55];

    #[test]
    fn same_interval_same_point() {
        let mut correlator = EpochCorrelator::new(4.0).unwrap();
        // Origin is 100.0 - 2.0 = 98.0; both sightings fall in epoch 0.
        let first = correlator.label(ADDR_A, 100.0);
        let second = correlator.label(ADDR_A, 101.9);
        assert_eq!(first, second);
        assert_eq!(first.session, 1);
        assert_eq!(first.epoch, 0);
    }

    #[test]
    fn next_interval_next_epoch() {
        let mut correlator = EpochCorrelator::new(4.0).unwrap();
        let first = correlator.label(ADDR_A, 100.0);
        // 102.5 - 98.0 = 4.5, past the first epoch boundary.
        let later = correlator.label(ADDR_A, 102.5);
        assert_eq!(later.session, first.session);
        assert_eq!(later.epoch, 1);
    }

    #[test]
    fn rotation_always_starts_a_new_session() {
        let mut correlator = EpochCorrelator::new(4.0).unwrap();
        let before = correlator.label(ADDR_A, 100.0);
        // Same physical tag, new address after rotation: never linkable.
        let after = correlator.label(ADDR_B, 100.5);
        assert_ne!(before.session, after.session);
        assert_eq!(after.session, 2);
    }

    #[test]
    fn half_epoch_shift_keeps_first_sighting_in_epoch_zero() {
        for epoch_length in [0.5, 4.0, 900.0] {
            let mut correlator = EpochCorrelator::new(epoch_length).unwrap();
            let point = correlator.label(ADDR_A, 1681001000.123);
            assert_eq!(point.epoch, 0, "epoch length {epoch_length}");
        }
    }

    #[test]
    fn correlation_is_deterministic() {
        let sightings: Vec<Sighting> = (0..40)
            .map(|i| Sighting {
                timestamp: 1000.0 + i as f64 * 1.3,
                rssi: -50,
                public_key: [0; 28],
                battery: 0x90,
                hint: 0,
                address: if i % 3 == 0 { ADDR_A } else { ADDR_B },
                payload: Vec::new(),
            })
            .collect();

        let mut first_run = EpochCorrelator::new(4.0).unwrap();
        let mut second_run = EpochCorrelator::new(4.0).unwrap();
        assert_eq!(
            first_run.correlate(&sightings),
            second_run.correlate(&sightings)
        );
        assert_eq!(first_run.sessions(), second_run.sessions());
    }

    #[test]
    fn session_ids_count_up_from_one() {
        let mut correlator = EpochCorrelator::new(4.0).unwrap();
        correlator.label(ADDR_A, 1.0);
        correlator.label(ADDR_B, 2.0);
        correlator.label(ADDR_A, 3.0);

        let mut ids: Vec<u64> = correlator.sessions().values().map(|s| s.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn non_positive_epoch_length_is_rejected() {
        assert!(matches!(
            EpochCorrelator::new(0.0),
            Err(ConfigError::NonPositiveEpochLength(_))
        ));
        assert!(matches!(
            EpochCorrelator::new(-4.0),
            Err(ConfigError::NonPositiveEpochLength(_))
        ));
    }
}
