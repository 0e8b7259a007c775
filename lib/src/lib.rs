mod epoch;
mod errors;
mod frame;
mod identity;
mod records;
mod report;
mod sighting;
mod window;

// Public re-export
pub use crate::epoch::{AddressSession, EpochCorrelator, NoisePoint};
pub use crate::errors::{ConfigError, RecordError};
pub use crate::frame::{DecodedFrame, StatusByte, FRAME_MARKER, MIN_PAYLOAD_LEN};
pub use crate::identity::{reconstruct_public_key, PUBLIC_KEY_LEN};
pub use crate::records::{format_mac, load_sightings, parse_mac, read_sightings, CaptureRow};
pub use crate::report::{capture_duration_hours, ExposureStats, SessionSummary};
pub use crate::sighting::{RawAdvertisement, Sighting};
pub use crate::window::{sliding_windows, SlidingWindows, Timestamped};
