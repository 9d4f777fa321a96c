use std::fmt;

use crate::clock::{TimeSource, Timestamp};
use crate::error::{ErrorKind, Result};
use crate::sensor::SensorReading;
use crate::units;

/// Current conditions at the station.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Observation {
    /// °C, averaged across both sensors.
    pub temperature: f64,
    /// Percent relative humidity.
    pub humidity: f64,
    /// Station-level pressure in hPa. Not adjusted to sea level.
    pub pressure: f64,
    pub timestamp: Timestamp,
}

impl Observation {
    /// Turns a raw sensor read into an observation.
    ///
    /// The whole read is rejected if either sensor failed; the clock is only
    /// consulted once the read has been accepted.
    pub fn sample<C>(reading: &SensorReading, clock: &mut C) -> Result<Observation>
    where
        C: TimeSource + ?Sized,
    {
        let pressure = match reading.pressure {
            Some(pressure) if reading.is_valid() => pressure,
            _ => return Err(ErrorKind::InvalidSensorReading.into()),
        };

        Ok(Observation {
            temperature: (reading.humidity_temperature + reading.pressure_temperature) / 2.0,
            humidity: reading.humidity,
            pressure,
            timestamp: clock.now(),
        })
    }

    pub fn epoch(&self) -> i64 {
        self.timestamp.epoch
    }

    pub fn sea_level_pressure(&self, altitude: i32) -> f64 {
        units::station_to_sea_level(self.temperature, self.pressure, altitude)
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) temperature: {:.2}°C, pressure: {:.2} hPa, humidity: {:.2}%",
            self.timestamp, self.timestamp.epoch, self.temperature, self.pressure, self.humidity
        )
    }
}
