use std::time::Duration;

use log::{debug, error, info, warn};

use crate::alarm::Alarm;
use crate::clock::{TimeSource, SECONDS_PER_DAY};
use crate::config::StationConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::messaging::{IncomingMessage, Messenger, OutgoingMessage};
use crate::observation::Observation;
use crate::preferences::{FieldValue, PreferenceUpdate, Preferences, Units};
use crate::report::{self, DAILY_REPORT_INTRO};
use crate::sensor::Sensors;
use crate::shadow::{ShadowDelta, ShadowState, ShadowSync};
use crate::units;

/// Everything a station talks to.
#[derive(Debug)]
pub struct Capabilities<S, C, H, M> {
    pub sensors: S,
    pub clock: C,
    pub shadow: H,
    pub messenger: M,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PollOutcome {
    /// Recheck interval has not elapsed yet.
    Waiting,
    /// A new observation replaced the previous one.
    Observed,
    /// The observation fired the alarm and the daily report went out.
    AlarmSent,
}

/// The weather station: current conditions, the alarm and preferences.
///
/// All state is owned by the instance and every mutation goes through
/// `&mut self`. When preference updates arrive on another thread, forward
/// them to the thread that owns the station rather than sharing it.
pub struct Station<S, C, H, M> {
    config: StationConfig,
    caps: Capabilities<S, C, H, M>,

    observation: Observation,
    alarm: Alarm,
    preferences: Preferences,

    /// Monotonic uptime of the last sampling attempt.
    last_check: Duration,
}

impl<S, C, H, M> Station<S, C, H, M>
where
    S: Sensors,
    C: TimeSource,
    H: ShadowSync,
    M: Messenger,
{
    /// Sets up a station and makes the first observation, which may already
    /// ring the alarm.
    pub fn new(
        config: StationConfig,
        preferences: Preferences,
        alarm: i64,
        caps: Capabilities<S, C, H, M>,
        uptime: Duration,
    ) -> Self {
        let mut station = Station {
            config,
            caps,
            observation: Observation::default(),
            alarm: Alarm::disabled(),
            preferences,
            last_check: uptime,
        };

        station.set_alarm(alarm);

        if let Err(e) = station.observe() {
            warn!("First observation failed: {}", e);
        }

        station
    }

    /// Heartbeat, call this from the main loop.
    ///
    /// Samples the sensors once the recheck interval has passed since the
    /// last attempt. `uptime` must come from a monotonic source.
    pub fn poll(&mut self, uptime: Duration) -> Result<PollOutcome> {
        self.caps.clock.maintain();

        if uptime.saturating_sub(self.last_check) <= self.config.recheck_interval {
            return Ok(PollOutcome::Waiting);
        }
        self.last_check = uptime;

        self.observe()
    }

    /// Reads the sensors right away, ignoring the recheck interval.
    pub fn observe(&mut self) -> Result<PollOutcome> {
        let reading = self.caps.sensors.read();

        let observation = match Observation::sample(&reading, &mut self.caps.clock) {
            Ok(observation) => observation,
            Err(e) => {
                warn!("{} ({})", e, reading);
                return Err(e);
            }
        };
        self.observation = observation;
        self.log_observation();

        if self
            .alarm
            .evaluate(observation.epoch(), self.config.recheck_interval)
        {
            info!("We just hit an alarm!");
            self.handle_alarm()?;
            return Ok(PollOutcome::AlarmSent);
        }

        Ok(PollOutcome::Observed)
    }

    fn log_observation(&self) {
        let obs = &self.observation;
        let sea_level = obs.sea_level_pressure(self.preferences.altitude);

        info!("{}", obs);
        info!(
            "sea level: {:.2} hPa, {:.3} inHg; {:.2}°F",
            sea_level,
            units::hpa_to_inhg(sea_level),
            units::celsius_to_fahrenheit(obs.temperature)
        );
    }

    /// The alarm is already marked fired; neither step below undoes that.
    fn handle_alarm(&mut self) -> Result<()> {
        // Ask for the same time tomorrow. The new alarm comes back as a delta.
        let next = ShadowState::new(
            self.alarm.timestamp() + SECONDS_PER_DAY,
            &self.preferences,
        );
        if let Err(e) = self.caps.shadow.request_state(&next) {
            warn!("Could not reschedule alarm to {}: {}", next.alarm, e);
        }

        let message = OutgoingMessage {
            topic: self.config.messaging_topic.clone(),
            to: self.preferences.authorized_number.clone(),
            from: self.preferences.outgoing_number.clone(),
            body: self.weather_report(DAILY_REPORT_INTRO),
            media_url: String::new(),
        };

        self.send(&message)
    }

    fn send(&mut self, message: &OutgoingMessage) -> Result<()> {
        self.caps.messenger.send(message).map_err(|e| {
            error!("Sending to {} failed: {}", message.to, e);
            match e.kind() {
                ErrorKind::DeliveryFailed => e,
                _ => Error::new(ErrorKind::DeliveryFailed, e),
            }
        })
    }

    /// Current conditions as a text message, prefixed with `intro`.
    pub fn weather_report(&self, intro: &str) -> String {
        report::format(&self.observation, &self.preferences, intro)
    }

    /// Answers someone texting the station with the current conditions.
    /// Messages that are not marked incoming are ignored.
    pub fn reply(&mut self, message: &IncomingMessage) -> Result<()> {
        if !message.is_incoming() {
            debug!("Ignoring {:?} message from {}", message.kind, message.from);
            return Ok(());
        }

        let reply = OutgoingMessage {
            topic: self.config.messaging_topic.clone(),
            to: message.from.clone(),
            from: message.to.clone(),
            body: self.weather_report(""),
            media_url: String::new(),
        };

        self.send(&reply)
    }

    /// Publishes the current preferences, e.g. after boot. The cloud answers
    /// with a delta if they differ from what is desired.
    pub fn report_state(&mut self) -> Result<()> {
        let state = self.shadow_state();
        info!("Reporting shadow state: {:?}", state);

        self.caps.shadow.report_state(&state).map_err(|e| match e.kind() {
            ErrorKind::ShadowSync => e,
            _ => Error::new(ErrorKind::ShadowSync, e),
        })
    }

    pub fn set_alarm(&mut self, timestamp: i64) {
        if self.alarm.rearm(timestamp, self.observation.epoch()) {
            info!(
                "Alarm updated to: {}{}",
                timestamp,
                if self.alarm.fired() { " (inactive)" } else { "" }
            );
        }
    }

    /// Accepts exactly `imperial` or `metric`; anything else keeps the
    /// current units.
    pub fn set_units(&mut self, units: &str) -> Result<()> {
        match units.parse::<Units>() {
            Ok(units) => {
                self.preferences.units = units;
                info!("Units updated to: {}", units);
                Ok(())
            }
            Err(e) => {
                warn!("{} (got {:?})", e, units);
                Err(e)
            }
        }
    }

    pub fn set_altitude(&mut self, altitude: i32) {
        self.preferences.altitude = altitude;
        info!("Altitude updated to: {}", altitude);
    }

    /// Also shifts the clock and forces a time sync.
    pub fn set_timezone_offset(&mut self, minutes: i32) {
        self.preferences.timezone_offset = minutes;
        info!("Timezone offset set to: {}", minutes);

        self.caps.clock.set_offset_minutes(minutes);
        self.caps.clock.resync();
    }

    // Number formats are not checked.
    pub fn set_outgoing_number(&mut self, number: impl Into<String>) {
        self.preferences.outgoing_number = number.into();
        info!("Device number updated to: {}", self.preferences.outgoing_number);
    }

    pub fn set_authorized_number(&mut self, number: impl Into<String>) {
        self.preferences.authorized_number = number.into();
        info!("Master number updated to: {}", self.preferences.authorized_number);
    }

    pub fn apply_update(&mut self, update: PreferenceUpdate) -> Result<()> {
        debug!("Applying {} update", update.field());

        match update {
            PreferenceUpdate::Alarm(timestamp) => self.set_alarm(timestamp),
            PreferenceUpdate::Units(units) => self.set_units(&units)?,
            PreferenceUpdate::Altitude(altitude) => self.set_altitude(altitude),
            PreferenceUpdate::TimezoneOffset(minutes) => self.set_timezone_offset(minutes),
            PreferenceUpdate::OutgoingNumber(number) => self.set_outgoing_number(number),
            PreferenceUpdate::AuthorizedNumber(number) => self.set_authorized_number(number),
        }

        Ok(())
    }

    /// Applies a preference by its shadow field name. Unknown fields are
    /// ignored.
    pub fn apply_field(&mut self, field: &str, value: &FieldValue) -> Result<()> {
        match PreferenceUpdate::parse(field, value) {
            Ok(Some(update)) => self.apply_update(update),
            Ok(None) => {
                debug!("Ignoring unknown preference {:?}", field);
                Ok(())
            }
            Err(e) => {
                warn!("{}", e);
                Err(e)
            }
        }
    }

    /// Applies every field of a delta. A bad field does not stop the rest;
    /// the first error is returned once all fields have been tried.
    pub fn apply_delta(&mut self, delta: &ShadowDelta) -> Result<()> {
        let mut first_error = None;

        for update in delta.updates() {
            let result = update.and_then(|update| self.apply_update(update));
            if let Err(e) = result {
                warn!("{}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn shadow_state(&self) -> ShadowState {
        ShadowState::new(self.alarm.timestamp(), &self.preferences)
    }

    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    pub fn alarm(&self) -> &Alarm {
        &self.alarm
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities<S, C, H, M> {
        &self.caps
    }

    pub fn capabilities_mut(&mut self) -> &mut Capabilities<S, C, H, M> {
        &mut self.caps
    }
}
