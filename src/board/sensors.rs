use anyhow::{anyhow, Result};

use bme280::i2c::BME280;
use embedded_hal::{delay::DelayNs, i2c::I2c};
use esp_idf_hal::delay::Ets;
use log::warn;

use weather_station::{SensorReading, Sensors};

/// BME280 on the primary I2C bus.
///
/// The chip measures pressure and humidity on the same die, so both sides of
/// the reading share one temperature.
pub struct Bme280Sensors<I2C, D = Ets> {
    bme280: BME280<I2C>,
    delay: D,
}

impl<I2C, E> Bme280Sensors<I2C, Ets>
where
    I2C: I2c<Error = E>,
    E: std::fmt::Debug,
{
    pub fn new(i2c: I2C) -> Result<Self> {
        Self::with_delay(i2c, Ets)
    }
}

impl<I2C, D, E> Bme280Sensors<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
    E: std::fmt::Debug,
{
    pub fn with_delay(i2c: I2C, mut delay: D) -> Result<Self> {
        // 0x77
        let mut bme280 = BME280::new_secondary(i2c);
        bme280
            .init(&mut delay)
            .map_err(|e| anyhow!("Failed to init bme280: {e:?}"))?;

        Ok(Bme280Sensors { bme280, delay })
    }
}

impl<I2C, D, E> Sensors for Bme280Sensors<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
    E: std::fmt::Debug,
{
    fn read(&mut self) -> SensorReading {
        match self.bme280.measure(&mut self.delay) {
            Ok(m) => {
                let temperature = f64::from(m.temperature);
                SensorReading {
                    // Pa to hPa
                    pressure: Some(f64::from(m.pressure) / 100.0).filter(|p| *p > 0.0),
                    pressure_temperature: temperature,
                    humidity: f64::from(m.humidity),
                    humidity_temperature: temperature,
                }
            }
            Err(e) => {
                warn!("Failed to read bme280 sensor: {:?}", e);
                SensorReading {
                    pressure: None,
                    pressure_temperature: f64::NAN,
                    humidity: f64::NAN,
                    humidity_temperature: f64::NAN,
                }
            }
        }
    }
}
