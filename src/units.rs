//! Unit conversions used when reporting observations.
//!
//! Every conversion rounds to three decimal places so the values line up
//! with the fixed two-decimal report formatting downstream.

pub const HPA_TO_IN_MERCURY: f64 = 0.0295299830714;
pub const MM_PER_INCH: f64 = 25.4;
pub const GRAVITATIONAL_ACCELERATION: f64 = 9.807;
pub const ATM_JOULES_PER_KILOGRAM_KELVIN: f64 = 287.1;
pub const CELSIUS_TO_KELVIN: f64 = 273.1;

fn round_milli(value: f64) -> f64 {
    // f64::round rounds half away from zero
    value.round() / 1000.0
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    round_milli(celsius * 9.0 / 5.0 * 1000.0 + 32000.0)
}

pub fn hpa_to_inhg(hpa: f64) -> f64 {
    round_milli(HPA_TO_IN_MERCURY * hpa * 1000.0)
}

pub fn inches_to_millimeters(inches: f64) -> f64 {
    round_milli(MM_PER_INCH * inches * 1000.0)
}

/// Reduces a station pressure reading to sea level.
///
/// Uses a single-layer barometric formula with the scale height taken from
/// the station temperature. High stations would want a standard atmosphere
/// table instead; this is accurate enough for most elevations.
pub fn station_to_sea_level(celsius: f64, station_hpa: f64, altitude: i32) -> f64 {
    let kelvin = CELSIUS_TO_KELVIN + celsius;
    let scale_height = (ATM_JOULES_PER_KILOGRAM_KELVIN * kelvin) / GRAVITATIONAL_ACCELERATION;

    round_milli(station_hpa * (f64::from(altitude) / scale_height).exp() * 1000.0)
}
