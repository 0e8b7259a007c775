//! Aggregate reports over a capture session.
//!
//! Boundary consumer of the windowing and correlation stages. Everything
//! here is derived statistics; the CLI only prints the `Display` output.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{TimeZone, Utc};

use crate::epoch::NoisePoint;
use crate::sighting::Sighting;
use crate::window::sliding_windows;

/// Span of the device-density window, in seconds.
pub const DENSITY_WINDOW_SECS: f64 = 5.0;
/// Span of the broadcast-rate window, in seconds.
pub const RATE_WINDOW_SECS: f64 = 300.0;

/// Capture duration in hours, from whole-second start and end timestamps.
///
/// Timestamps are truncated to whole seconds before differencing, matching
/// the resolution the per-hour rates are quoted at.
///
/// Covers every captured row, not just tag-classified ones; call this
/// before any tag filtering.
pub fn capture_duration_hours(sightings: &[Sighting]) -> f64 {
    let mut seconds = sightings.iter().map(|s| s.timestamp as i64);
    let Some(first) = seconds.next() else {
        return 0.0;
    };
    let (start, end) = seconds.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
    (end - start) as f64 / 3600.0
}

/// Rate of `count` per `duration`, zero when the capture is too short to
/// span a whole duration unit.
fn per_duration(count: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        count / duration
    } else {
        0.0
    }
}

/**
 * Tracking-exposure figures for one anonymity-epoch configuration.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureStats {
    pub epoch_length: f64,
    pub prefiltering_minimum: usize,
    /// Distinct noise points: upper bound on the pseudo-identities an
    /// observer could form.
    pub unique_points: usize,
    pub unique_points_per_hour: f64,
    /// Distinct noise points seen more than `prefiltering_minimum` times.
    /// A point seen only once is more likely observational noise than a
    /// persistently tracked device.
    pub prefiltered_points: usize,
    pub prefiltered_points_per_hour: f64,
}

impl ExposureStats {
    pub fn from_noise_points(
        points: &[NoisePoint],
        duration_hours: f64,
        epoch_length: f64,
        prefiltering_minimum: usize,
    ) -> Self {
        let mut counts: HashMap<NoisePoint, usize> = HashMap::new();
        for point in points {
            *counts.entry(*point).or_default() += 1;
        }
        let unique_points = counts.len();
        let prefiltered_points = counts
            .values()
            .filter(|&&count| count > prefiltering_minimum)
            .count();

        Self {
            epoch_length,
            prefiltering_minimum,
            unique_points,
            unique_points_per_hour: per_duration(unique_points as f64, duration_hours),
            prefiltered_points,
            prefiltered_points_per_hour: per_duration(prefiltered_points as f64, duration_hours),
        }
    }
}

impl fmt::Display for ExposureStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Anonymity epoch: {} s", self.epoch_length)?;
        writeln!(f, "Prefiltering minimum: {}", self.prefiltering_minimum)?;
        writeln!(f, "Unique noise points: {}", self.unique_points)?;
        writeln!(
            f,
            "Unique noise points per hour: {:.4}",
            self.unique_points_per_hour
        )?;
        writeln!(
            f,
            "Post prefiltering unique noise points: {}",
            self.prefiltered_points
        )?;
        write!(
            f,
            "Post prefiltering unique points per hour: {:.4}",
            self.prefiltered_points_per_hour
        )
    }
}

/**
 * Human-readable summary of one collection session.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    /// Whole-second capture boundaries (Unix time, UTC).
    pub start_time: i64,
    pub end_time: i64,
    pub total_broadcasts: usize,
    /// Distinct radio addresses over the whole session.
    pub total_devices: usize,
    pub devices_per_two_seconds: f64,
    /// Most / least distinct addresses in any 5-second window.
    pub most_devices_in_window: usize,
    pub least_devices_in_window: usize,
    /// Average tags in proximity per instant, assuming a 2-second
    /// advertising interval.
    pub tags_per_instant: f64,
    /// Highest broadcast rate over any 5-minute window, in the same
    /// tags-per-instant unit.
    pub max_rate: f64,
    /// Broadcasts whose exact raw payload had been seen before.
    pub repeated_broadcasts: usize,
    /// Longest span between first and last sighting of one payload,
    /// in minutes.
    pub longest_neighbor_minutes: f64,
}

impl SessionSummary {
    /// Summarize a sorted capture session.
    ///
    /// Session boundaries and the duration denominators cover every
    /// captured row; broadcast, device, and window figures cover only the
    /// rows classified as tracking tags. Returns `None` when no row
    /// classifies as a tag. A capture shorter than one whole second
    /// reports zero for the duration-based rates.
    pub fn compute(rows: &[Sighting]) -> Option<Self> {
        let first = rows.first()?;
        let (start_time, end_time) = rows.iter().map(|s| s.timestamp as i64).fold(
            (first.timestamp as i64, first.timestamp as i64),
            |(lo, hi), t| (lo.min(t), hi.max(t)),
        );
        let duration_secs = (end_time - start_time) as f64;

        let tags: Vec<&Sighting> = rows.iter().filter(|s| s.is_tracking_tag()).collect();
        if tags.is_empty() {
            return None;
        }

        let addresses: HashSet<[u8; 6]> = tags.iter().map(|s| s.address).collect();

        let mut most_devices_in_window = 0;
        let mut least_devices_in_window = usize::MAX;
        let density_windows =
            sliding_windows(&tags, DENSITY_WINDOW_SECS).expect("window length is positive");
        for window in density_windows {
            let devices = window
                .iter()
                .map(|s| s.address)
                .collect::<HashSet<_>>()
                .len();
            most_devices_in_window = most_devices_in_window.max(devices);
            least_devices_in_window = least_devices_in_window.min(devices);
        }

        let mut max_rate = 0.0f64;
        let rate_windows =
            sliding_windows(&tags, RATE_WINDOW_SECS).expect("window length is positive");
        for window in rate_windows {
            let rate = (2 * window.len()) as f64 / RATE_WINDOW_SECS;
            if rate > max_rate {
                max_rate = rate;
            }
        }

        // One pass over the payloads covers both repeat counting and
        // neighbor lifetimes; input order makes first/last trivial.
        let mut repeated_broadcasts = 0;
        let mut lifetimes: HashMap<&[u8], (f64, f64)> = HashMap::new();
        for sighting in &tags {
            match lifetimes.entry(sighting.payload.as_slice()) {
                Entry::Occupied(mut seen) => {
                    repeated_broadcasts += 1;
                    seen.get_mut().1 = sighting.timestamp;
                }
                Entry::Vacant(slot) => {
                    slot.insert((sighting.timestamp, sighting.timestamp));
                }
            }
        }
        let longest_neighbor_minutes = lifetimes
            .values()
            .map(|(first_seen, last_seen)| last_seen - first_seen)
            .fold(0.0, f64::max)
            / 60.0;

        Some(Self {
            start_time,
            end_time,
            total_broadcasts: tags.len(),
            total_devices: addresses.len(),
            devices_per_two_seconds: per_duration(2.0 * addresses.len() as f64, duration_secs),
            most_devices_in_window,
            least_devices_in_window,
            tags_per_instant: per_duration(2.0 * tags.len() as f64, duration_secs),
            max_rate,
            repeated_broadcasts,
            longest_neighbor_minutes,
        })
    }
}

fn format_utc(timestamp: i64) -> String {
    match Utc.timestamp_opt(timestamp, 0).single() {
        Some(instant) => instant.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp.to_string(),
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "START: {} UTC", format_utc(self.start_time))?;
        writeln!(f, "END:   {} UTC", format_utc(self.end_time))?;
        writeln!(f, "Total broadcasts: {}", self.total_broadcasts)?;
        writeln!(f, "Total devices: {}", self.total_devices)?;
        writeln!(
            f,
            "Devices / two seconds: {:.5}",
            self.devices_per_two_seconds
        )?;
        writeln!(
            f,
            "Most devices seen in a 5 second window:  {}",
            self.most_devices_in_window
        )?;
        writeln!(
            f,
            "Least devices seen in a 5 second window: {}",
            self.least_devices_in_window
        )?;
        writeln!(
            f,
            "Average tags in proximity per instant: {:.5}",
            self.tags_per_instant
        )?;
        writeln!(
            f,
            "Max average devices over {} secs: {:.5}",
            RATE_WINDOW_SECS, self.max_rate
        )?;
        writeln!(
            f,
            "Number of repeated broadcasts: {}",
            self.repeated_broadcasts
        )?;
        write!(
            f,
            "Longest lasting neighbor: {:.2} min",
            self.longest_neighbor_minutes
        )
    }
}
