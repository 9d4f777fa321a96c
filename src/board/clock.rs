use anyhow::Result;
use std::time::{SystemTime, UNIX_EPOCH};

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::sntp::{EspSntp, SyncStatus};
use log::{info, warn};

use weather_station::{TimeSource, Timestamp};

/// Wall clock kept in sync by ESP-IDF's SNTP client.
///
/// Like the NTP clients on small boards, the reported time is local: the
/// timezone offset is added to the epoch.
pub struct SntpClock {
    sntp: Option<EspSntp<'static>>,
    offset_seconds: i64,
}

impl SntpClock {
    /// Starts SNTP and waits for the first synchronization.
    pub fn new(offset_minutes: i32) -> Result<Self> {
        let sntp = EspSntp::new_default()?;

        info!("Waiting for SNTP time synchronization...");
        while sntp.get_sync_status() != SyncStatus::Completed {
            FreeRtos::delay_ms(100);
        }
        info!("Time synchronized");

        Ok(SntpClock {
            sntp: Some(sntp),
            offset_seconds: i64::from(offset_minutes) * 60,
        })
    }
}

impl TimeSource for SntpClock {
    fn now(&mut self) -> Timestamp {
        let utc = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        Timestamp::from_epoch(utc + self.offset_seconds)
    }

    fn resync(&mut self) {
        // only one SNTP instance may exist at a time
        self.sntp = None;
        self.sntp = match EspSntp::new_default() {
            Ok(sntp) => Some(sntp),
            Err(e) => {
                warn!("Restarting SNTP failed: {}", e);
                None
            }
        };
    }

    fn set_offset_minutes(&mut self, minutes: i32) {
        self.offset_seconds = i64::from(minutes) * 60;
    }
}
