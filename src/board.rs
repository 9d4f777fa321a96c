//! ESP32 glue: WiFi, SNTP, MQTT and the BME280.
//!
//! Credentials and initial preferences are baked in at compile time from the
//! environment, e.g. `WIFI_SSID=... MQTT_URL=... cargo build --features esp`.

pub mod clock;
pub mod cloud;
pub mod sensors;
pub mod wifi;

use weather_station::{Preferences, StationConfig, Units};

pub const WIFI_SSID: &str = env!("WIFI_SSID");
pub const WIFI_PASS: &str = env!("WIFI_PASS");
pub const MQTT_URL: &str = env!("MQTT_URL");

pub const MQTT_CLIENT_ID: &str = match option_env!("MQTT_CLIENT_ID") {
    Some(id) => id,
    None => "rs-weather-station",
};

fn env_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

pub fn station_config() -> StationConfig {
    let mut config = StationConfig::default();

    if let Some(topic) = option_env!("MESSAGING_TOPIC") {
        config.messaging_topic = topic.to_owned();
    }
    if let Some(topic) = option_env!("SHADOW_TOPIC") {
        config.shadow_topic = topic.to_owned();
    }

    config
}

/// Starting preferences until the shadow says otherwise.
pub fn preferences() -> Preferences {
    Preferences {
        units: option_env!("STATION_UNITS")
            .and_then(|u| u.parse().ok())
            .unwrap_or(Units::Imperial),
        altitude: env_number(option_env!("STATION_ALTITUDE"))
            .and_then(|a| i32::try_from(a).ok())
            .unwrap_or(0),
        timezone_offset: env_number(option_env!("STATION_TZ"))
            .and_then(|tz| i32::try_from(tz).ok())
            .unwrap_or(0),
        outgoing_number: option_env!("DEVICE_NUMBER").unwrap_or_default().to_owned(),
        authorized_number: option_env!("MASTER_NUMBER").unwrap_or_default().to_owned(),
    }
}

pub fn initial_alarm() -> i64 {
    env_number(option_env!("STATION_ALARM")).unwrap_or(0)
}
