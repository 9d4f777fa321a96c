use std::fmt::Write;

use crate::observation::Observation;
use crate::preferences::{Preferences, Units};
use crate::units;

/// Longest report that fits in a single SMS.
pub const MAX_REPORT_LEN: usize = 160;

pub const DAILY_REPORT_INTRO: &str = "Daily Report!\n";

/// Renders current conditions as a short text message.
///
/// Pressure is reduced to sea level using the configured altitude. The result
/// is cut to [`MAX_REPORT_LEN`] characters.
pub fn format(observation: &Observation, preferences: &Preferences, intro: &str) -> String {
    let sea_level = observation.sea_level_pressure(preferences.altitude);
    let in_hg = units::hpa_to_inhg(sea_level);

    let (temperature, temperature_unit, converted, converted_unit) = match preferences.units {
        Units::Imperial => (
            units::celsius_to_fahrenheit(observation.temperature),
            "F",
            in_hg,
            "in",
        ),
        Units::Metric => (
            observation.temperature,
            "C",
            units::inches_to_millimeters(in_hg),
            "mm",
        ),
    };

    let ts = &observation.timestamp;
    let mut report = String::with_capacity(MAX_REPORT_LEN);
    report.push_str(intro);
    // writing into a String cannot fail
    let _ = write!(
        report,
        "Conditions as of {} {}:{:02}:{:02}\n\
         {:.2} *{}\n\
         {:.2} % Humidity\n\
         {:.2} hPa ({:.2} {} Hg)\n",
        ts.day,
        ts.hour,
        ts.minute,
        ts.second,
        temperature,
        temperature_unit,
        observation.humidity,
        sea_level,
        converted,
        converted_unit,
    );

    truncate_chars(&mut report, MAX_REPORT_LEN);
    report
}

fn truncate_chars(s: &mut String, max: usize) {
    if let Some((idx, _)) = s.char_indices().nth(max) {
        s.truncate(idx);
    }
}
