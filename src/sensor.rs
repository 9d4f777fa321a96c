use std::fmt;

/// One raw read of both sensors.
///
/// The pressure sensor either produces a pressure or nothing at all. The
/// humidity sensor signals failure per value with NaN.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorReading {
    /// Station-level pressure in hPa, `None` when the pressure sensor failed.
    /// Zero or below counts as a failed read.
    pub pressure: Option<f64>,
    /// Temperature measured by the pressure sensor, °C.
    pub pressure_temperature: f64,
    /// Relative humidity in percent, NaN on error.
    pub humidity: f64,
    /// Temperature measured by the humidity sensor, °C, NaN on error.
    pub humidity_temperature: f64,
}

impl SensorReading {
    /// Both sensors produced usable values.
    pub fn is_valid(&self) -> bool {
        match self.pressure {
            Some(pressure) => {
                pressure.is_finite()
                    && pressure > 0.0
                    && self.pressure_temperature.is_finite()
                    && self.humidity_temperature.is_finite()
                    && (0.0..=100.0).contains(&self.humidity)
            }
            None => false,
        }
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pressure {
            Some(pressure) => write!(
                f,
                "pressure: {:.2} hPa ({:.2}°C), ",
                pressure, self.pressure_temperature
            )?,
            None => f.write_str("pressure: n/a, ")?,
        }
        write!(
            f,
            "humidity: {:.2}% ({:.2}°C)",
            self.humidity, self.humidity_temperature
        )
    }
}

/// Temperature/humidity/pressure hardware.
pub trait Sensors {
    fn read(&mut self) -> SensorReading;
}
