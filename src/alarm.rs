use std::time::Duration;

/// The single scheduled notification of a station.
///
/// A timestamp of `0` disables alarms. Once the alarm's window has been
/// consumed it stays fired until rearmed with a different timestamp.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Alarm {
    timestamp: i64,
    fired: bool,
}

impl Default for Alarm {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Alarm {
    pub fn disabled() -> Alarm {
        Alarm {
            timestamp: 0,
            fired: true,
        }
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn fired(&self) -> bool {
        self.fired
    }

    pub fn is_pending(&self) -> bool {
        !self.fired
    }

    /// Schedules the alarm for `timestamp`.
    ///
    /// Reapplying the current timestamp changes nothing. A disabled (`0`) or
    /// already past timestamp is accepted but created fired. Returns whether
    /// the alarm changed.
    pub fn rearm(&mut self, timestamp: i64, last_observation: i64) -> bool {
        if timestamp == self.timestamp {
            return false;
        }

        self.timestamp = timestamp;
        self.fired = timestamp == 0 || timestamp <= last_observation;

        true
    }

    /// Checks an accepted observation against the alarm.
    ///
    /// Fires when the observation lands strictly after the alarm time and
    /// less than two recheck intervals past it. Returns `true` exactly once
    /// per armed timestamp. Observations that miss the window never fire it.
    pub fn evaluate(&mut self, observation: i64, recheck_interval: Duration) -> bool {
        if self.fired {
            return false;
        }

        let window = 2 * recheck_interval.as_secs() as i64;
        if observation > self.timestamp && observation < self.timestamp.saturating_add(window) {
            self.fired = true;
            return true;
        }

        false
    }
}
