use anyhow::Result;
use std::{
    sync::mpsc,
    time::{Duration, Instant},
};

use embedded_hal::delay::DelayNs;
use esp_idf_svc::hal::{
    delay::FreeRtos,
    i2c::{I2cConfig, I2cDriver},
    peripherals::Peripherals,
    prelude::*,
};
use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs::EspDefaultNvsPartition};
use log::{error, info, warn};

use weather_station::{Capabilities, PollOutcome, Station};

pub mod board;

use crate::board::{clock::SntpClock, cloud::Inbox, sensors::Bme280Sensors};

fn main() -> Result<()> {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let _wifi = board::wifi::connect(peripherals.modem, sys_loop, nvs)?;

    let preferences = board::preferences();
    let clock = SntpClock::new(preferences.timezone_offset)?;

    let sda = peripherals.pins.gpio21;
    let scl = peripherals.pins.gpio22;

    let config = I2cConfig::new()
        .baudrate(400.kHz().into())
        .timeout(Duration::from_micros(200).into());
    let i2c = I2cDriver::new(peripherals.i2c0, sda, scl, &config)?;

    let sensors = Bme280Sensors::new(i2c)?;

    let station_config = board::station_config();
    let (inbox_tx, inbox) = mpsc::channel();
    let (shadow, messenger) = board::cloud::connect(&station_config, inbox_tx)?;

    let uptime = Instant::now();
    let mut station = Station::new(
        station_config,
        preferences,
        board::initial_alarm(),
        Capabilities {
            sensors,
            clock,
            shadow,
            messenger,
        },
        uptime.elapsed(),
    );

    if let Err(e) = station.report_state() {
        warn!("{}", e);
    }

    info!("Station running, messages on {}", station.config().messaging_topic);

    // The MQTT thread only decodes; the station is owned by this loop alone.
    loop {
        for event in inbox.try_iter() {
            match event {
                Inbox::Delta(delta) => {
                    if let Err(e) = station.apply_delta(&delta) {
                        warn!("Delta partially applied: {}", e);
                    }
                    if let Err(e) = station.report_state() {
                        warn!("{}", e);
                    }
                }
                Inbox::Message(message) => {
                    if let Err(e) = station.reply(&message) {
                        error!("{}", e);
                    }
                }
            }
        }

        match station.poll(uptime.elapsed()) {
            Ok(PollOutcome::Waiting) => {}
            Ok(outcome) => info!("{:?}", outcome),
            Err(e) => warn!("{}", e),
        }

        FreeRtos.delay_ms(500u32);
    }
}
