//! Observation and alarm engine of a networked weather station.
//!
//! [`Station`] samples the sensors on a fixed cadence, keeps the latest
//! observation, rings a daily alarm by texting a weather report and applies
//! preference changes coming from the device shadow. Hardware, time sync and
//! the cloud are reached through the capability traits [`Sensors`],
//! [`TimeSource`], [`ShadowSync`] and [`Messenger`].

pub mod alarm;
pub mod clock;
pub mod config;
pub mod error;
pub mod messaging;
pub mod observation;
pub mod preferences;
pub mod report;
pub mod sensor;
pub mod shadow;
pub mod station;
pub mod units;

pub use crate::alarm::Alarm;
pub use crate::clock::{TimeSource, Timestamp, Weekday};
pub use crate::config::StationConfig;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::messaging::{IncomingMessage, Messenger, OutgoingMessage};
pub use crate::observation::Observation;
pub use crate::preferences::{FieldValue, PreferenceUpdate, Preferences, Units};
pub use crate::sensor::{SensorReading, Sensors};
pub use crate::shadow::{ShadowDelta, ShadowDocument, ShadowState, ShadowSync};
pub use crate::station::{Capabilities, PollOutcome, Station};
