use std::time::Duration;

/// Every 3 minutes.
pub const RECHECK_WEATHER_INTERVAL: Duration = Duration::from_secs(3 * 60);

pub const DEFAULT_MESSAGING_TOPIC: &str = "twilio";
pub const DEFAULT_SHADOW_TOPIC: &str = "$aws/things/weather/shadow/update";

/// Fixed settings of a station. Preferences that can change at runtime
/// live in [`crate::preferences::Preferences`] instead.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StationConfig {
    /// Minimum spacing between sensor samples. Also sizes the alarm window.
    pub recheck_interval: Duration,
    /// Topic outgoing messages are published on.
    pub messaging_topic: String,
    /// Topic shadow updates are published on.
    pub shadow_topic: String,
}

impl Default for StationConfig {
    fn default() -> Self {
        StationConfig {
            recheck_interval: RECHECK_WEATHER_INTERVAL,
            messaging_topic: DEFAULT_MESSAGING_TOPIC.to_owned(),
            shadow_topic: DEFAULT_SHADOW_TOPIC.to_owned(),
        }
    }
}
