use std::time::Duration;

use weather_station::{
    Capabilities, Error, ErrorKind, FieldValue, IncomingMessage, Messenger, OutgoingMessage,
    PollOutcome, Preferences, Result, SensorReading, Sensors, ShadowDelta, ShadowState,
    ShadowSync, Station, StationConfig, TimeSource, Timestamp, Units,
};

const T: i64 = 1_500_000_000;
const INTERVAL: Duration = Duration::from_secs(180);

struct FakeSensors {
    next: SensorReading,
    reads: usize,
}

impl Sensors for FakeSensors {
    fn read(&mut self) -> SensorReading {
        self.reads += 1;
        self.next
    }
}

#[derive(Default)]
struct FakeClock {
    epoch: i64,
    offset: i32,
    resyncs: usize,
    maintained: usize,
}

impl TimeSource for FakeClock {
    fn now(&mut self) -> Timestamp {
        Timestamp::from_epoch(self.epoch)
    }

    fn resync(&mut self) {
        self.resyncs += 1;
    }

    fn set_offset_minutes(&mut self, minutes: i32) {
        self.offset = minutes;
    }

    fn maintain(&mut self) {
        self.maintained += 1;
    }
}

#[derive(Default)]
struct FakeShadow {
    reported: Vec<ShadowState>,
    requested: Vec<ShadowState>,
    fail: bool,
}

impl ShadowSync for FakeShadow {
    fn report_state(&mut self, state: &ShadowState) -> Result<()> {
        if self.fail {
            return Err(Error::other("not connected"));
        }
        self.reported.push(state.clone());
        Ok(())
    }

    fn request_state(&mut self, state: &ShadowState) -> Result<()> {
        if self.fail {
            return Err(Error::other("not connected"));
        }
        self.requested.push(state.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FakeMessenger {
    sent: Vec<OutgoingMessage>,
    fail: bool,
}

impl Messenger for FakeMessenger {
    fn send(&mut self, message: &OutgoingMessage) -> Result<()> {
        if self.fail {
            return Err(Error::other("publish failed"));
        }
        self.sent.push(message.clone());
        Ok(())
    }
}

type TestStation = Station<FakeSensors, FakeClock, FakeShadow, FakeMessenger>;

fn good_reading() -> SensorReading {
    SensorReading {
        pressure: Some(1000.0),
        pressure_temperature: 20.0,
        humidity: 50.0,
        humidity_temperature: 20.0,
    }
}

fn bad_reading() -> SensorReading {
    SensorReading {
        humidity_temperature: f64::NAN,
        ..good_reading()
    }
}

fn preferences() -> Preferences {
    Preferences {
        units: Units::Metric,
        altitude: 0,
        timezone_offset: 0,
        outgoing_number: "+18005550100".into(),
        authorized_number: "+18005551212".into(),
    }
}

fn station_at(epoch: i64, alarm: i64) -> TestStation {
    station_with(epoch, alarm, FakeShadow::default(), FakeMessenger::default())
}

fn station_with(
    epoch: i64,
    alarm: i64,
    shadow: FakeShadow,
    messenger: FakeMessenger,
) -> TestStation {
    let caps = Capabilities {
        sensors: FakeSensors {
            next: good_reading(),
            reads: 0,
        },
        clock: FakeClock {
            epoch,
            ..Default::default()
        },
        shadow,
        messenger,
    };

    Station::new(
        StationConfig::default(),
        preferences(),
        alarm,
        caps,
        Duration::ZERO,
    )
}

fn set_time(station: &mut TestStation, epoch: i64) {
    station.capabilities_mut().clock.epoch = epoch;
}

/// Uptime after `n` polls spaced just over one recheck interval apart.
fn after(n: u32) -> Duration {
    (INTERVAL + Duration::from_secs(1)) * n
}

#[test]
fn observes_on_construction() {
    let station = station_at(T, 0);

    assert_eq!(station.capabilities().sensors.reads, 1);
    assert_eq!(station.observation().temperature, 20.0);
    assert_eq!(station.observation().epoch(), T);
    assert!(station.alarm().fired());
}

#[test]
fn poll_is_rate_limited() {
    let mut station = station_at(T, 0);

    assert_eq!(station.poll(Duration::from_secs(10)).unwrap(), PollOutcome::Waiting);
    assert_eq!(station.poll(INTERVAL).unwrap(), PollOutcome::Waiting);
    assert_eq!(station.capabilities().sensors.reads, 1);

    set_time(&mut station, T + 181);
    assert_eq!(station.poll(after(1)).unwrap(), PollOutcome::Observed);
    assert_eq!(station.capabilities().sensors.reads, 2);
    assert_eq!(station.observation().epoch(), T + 181);

    // interval restarts from the last sample
    assert_eq!(station.poll(after(1) + Duration::from_secs(5)).unwrap(), PollOutcome::Waiting);
    assert!(station.capabilities().clock.maintained >= 4);
}

#[test]
fn rejected_sample_keeps_previous_observation() {
    let mut station = station_at(T, 0);
    let before = *station.observation();

    station.capabilities_mut().sensors.next = bad_reading();
    set_time(&mut station, T + 200);

    let err = station.poll(after(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSensorReading);
    assert_eq!(*station.observation(), before);

    // a failed attempt still counts against the interval
    assert_eq!(station.poll(after(1) + Duration::from_secs(1)).unwrap(), PollOutcome::Waiting);
}

#[test]
fn alarm_sends_daily_report_once() {
    let mut station = station_at(T - 100, T);
    assert!(station.alarm().is_pending());

    set_time(&mut station, T + 60);
    assert_eq!(station.poll(after(1)).unwrap(), PollOutcome::AlarmSent);
    assert!(station.alarm().fired());

    let caps = station.capabilities();
    assert_eq!(caps.messenger.sent.len(), 1);
    let message = &caps.messenger.sent[0];
    assert_eq!(message.topic, "twilio");
    assert_eq!(message.to, "+18005551212");
    assert_eq!(message.from, "+18005550100");
    assert!(message.body.starts_with("Daily Report!\nConditions as of"));
    assert!(message.body.len() <= 160);

    assert_eq!(caps.shadow.requested.len(), 1);
    let next = &caps.shadow.requested[0];
    assert_eq!(next.alarm, T + 86_400);
    assert_eq!(next.units, Units::Metric);
    assert_eq!(next.m_num, "+18005551212");

    set_time(&mut station, T + 120);
    assert_eq!(station.poll(after(2)).unwrap(), PollOutcome::Observed);
    assert_eq!(station.capabilities().messenger.sent.len(), 1);
}

#[test]
fn alarm_can_fire_on_first_observation() {
    let station = station_at(T + 30, T);

    assert!(station.alarm().fired());
    assert_eq!(station.capabilities().messenger.sent.len(), 1);
}

#[test]
fn missed_window_is_not_caught_up() {
    let mut station = station_at(T - 100, T);

    set_time(&mut station, T + 2 * 180 + 1);
    assert_eq!(station.poll(after(1)).unwrap(), PollOutcome::Observed);
    assert!(station.capabilities().messenger.sent.is_empty());
    assert!(station.capabilities().shadow.requested.is_empty());
}

#[test]
fn failed_reschedule_still_sends_report() {
    let shadow = FakeShadow {
        fail: true,
        ..Default::default()
    };
    let mut station = station_with(T - 100, T, shadow, FakeMessenger::default());

    set_time(&mut station, T + 1);
    assert_eq!(station.poll(after(1)).unwrap(), PollOutcome::AlarmSent);
    assert_eq!(station.capabilities().messenger.sent.len(), 1);
}

#[test]
fn delivery_failure_is_reported_and_alarm_stays_fired() {
    let messenger = FakeMessenger {
        fail: true,
        ..Default::default()
    };
    let mut station = station_with(T - 100, T, FakeShadow::default(), messenger);

    set_time(&mut station, T + 1);
    let err = station.poll(after(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeliveryFailed);
    assert!(station.alarm().fired());
    assert_eq!(station.observation().epoch(), T + 1);

    // no retry on the next sample
    station.capabilities_mut().messenger.fail = false;
    set_time(&mut station, T + 2);
    assert_eq!(station.poll(after(2)).unwrap(), PollOutcome::Observed);
    assert!(station.capabilities().messenger.sent.is_empty());
}

#[test]
fn alarm_in_the_past_or_zero_is_inactive() {
    let mut station = station_at(T, 0);

    station.set_alarm(T - 1);
    assert_eq!(station.alarm().timestamp(), T - 1);
    assert!(station.alarm().fired());

    station.set_alarm(T + 3600);
    assert!(station.alarm().is_pending());

    station.set_alarm(0);
    assert!(station.alarm().fired());
}

#[test]
fn bogus_units_are_rejected() {
    let mut station = station_at(T, 0);
    station.set_units("imperial").unwrap();

    let err = station.set_units("bogus").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidUnits);
    assert_eq!(station.preferences().units, Units::Imperial);
}

#[test]
fn timezone_change_resyncs_clock() {
    let mut station = station_at(T, 0);

    station.set_timezone_offset(-480);
    assert_eq!(station.preferences().timezone_offset, -480);
    assert_eq!(station.capabilities().clock.offset, -480);
    assert_eq!(station.capabilities().clock.resyncs, 1);
}

#[test]
fn simple_setters() {
    let mut station = station_at(T, 0);

    station.set_altitude(-20);
    station.set_outgoing_number("+15550001111");
    station.set_authorized_number("not a number");

    let prefs = station.preferences();
    assert_eq!(prefs.altitude, -20);
    assert_eq!(prefs.outgoing_number, "+15550001111");
    assert_eq!(prefs.authorized_number, "not a number");
}

#[test]
fn keyed_updates() {
    let mut station = station_at(T, 0);

    station.apply_field("alt", &FieldValue::Integer(350)).unwrap();
    station.apply_field("t_num", &"+15550002222".into()).unwrap();
    station.apply_field("colour", &"blue".into()).unwrap();

    let err = station.apply_field("tz", &"soon".into()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidField);

    assert_eq!(station.preferences().altitude, 350);
    assert_eq!(station.preferences().outgoing_number, "+15550002222");
    assert_eq!(station.preferences().timezone_offset, 0);
}

#[test]
fn delta_applies_good_fields_despite_bad_ones() {
    let mut station = station_at(T, 0);
    let delta = ShadowDelta::from_json(
        br#"{"state": {"alarm": 1500003600, "units": "kelvin", "m_num": "+15550003333", "tz": 60, "extra": [1, 2]}}"#,
    )
    .unwrap();

    let err = station.apply_delta(&delta).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidUnits);

    assert_eq!(station.alarm().timestamp(), T + 3600);
    assert!(station.alarm().is_pending());
    assert_eq!(station.preferences().units, Units::Metric);
    assert_eq!(station.preferences().authorized_number, "+15550003333");
    assert_eq!(station.preferences().timezone_offset, 60);
}

#[test]
fn delta_skips_unknown_fields_and_wrong_types() {
    let mut station = station_at(T, 0);
    let delta =
        ShadowDelta::from_json(br#"{"state": {"alt": "high", "color": "red", "t_num": "+15550004444"}}"#)
            .unwrap();

    let err = station.apply_delta(&delta).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidField);
    assert_eq!(station.preferences().altitude, 0);
    assert_eq!(station.preferences().outgoing_number, "+15550004444");
}

#[test]
fn keeps_its_config() {
    let station = station_at(T, 0);

    assert_eq!(station.config().recheck_interval, INTERVAL);
    assert_eq!(station.config().messaging_topic, "twilio");
}

#[test]
fn reports_shadow_state() {
    let mut station = station_at(T, T + 600);
    station.report_state().unwrap();

    let reported = &station.capabilities().shadow.reported;
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0], station.shadow_state());
    assert_eq!(reported[0].alarm, T + 600);
    assert_eq!(reported[0].t_num, "+18005550100");
}

#[test]
fn shadow_failure_is_wrapped() {
    let shadow = FakeShadow {
        fail: true,
        ..Default::default()
    };
    let mut station = station_with(T, 0, shadow, FakeMessenger::default());

    let err = station.report_state().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShadowSync);
}

#[test]
fn replies_to_incoming_messages() {
    let mut station = station_at(T, 0);
    let incoming = IncomingMessage {
        to: "+18005550100".into(),
        from: "+15555550123".into(),
        body: "Give me some weather!".into(),
        kind: "Incoming".into(),
    };

    station.reply(&incoming).unwrap();

    let sent = &station.capabilities().messenger.sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "+15555550123");
    assert_eq!(sent[0].from, "+18005550100");
    assert!(sent[0].body.starts_with("Conditions as of"));
}

#[test]
fn ignores_echoed_outgoing_messages() {
    let mut station = station_at(T, 0);
    let echo = IncomingMessage {
        to: "+18005551212".into(),
        from: "+18005550100".into(),
        body: String::new(),
        kind: "Outgoing".into(),
    };

    station.reply(&echo).unwrap();
    assert!(station.capabilities().messenger.sent.is_empty());
}

#[test]
fn metric_report_end_to_end() {
    let station = station_at(T, 0);
    let report = station.weather_report("");

    assert!(report.contains("20.00"), "{report}");
    assert!(report.contains("50.00"), "{report}");
    assert!(report.contains("1000.00"), "{report}");
}

#[test]
fn imperial_report_end_to_end() {
    let mut station = station_at(T, 0);
    station.set_units("imperial").unwrap();
    let report = station.weather_report("");

    assert!(report.contains("68.00 *F"), "{report}");
    assert!(report.contains("50.00"), "{report}");
}
