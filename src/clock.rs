use std::fmt;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Day of the week as reported by network time, with Sunday at index 0.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Weekday {
    #[default]
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Returns `None` for indices outside `0..=6`.
    pub fn from_index(index: u8) -> Option<Weekday> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn short_name(&self) -> &'static str {
        use Weekday::*;
        match *self {
            Sunday => "Sun",
            Monday => "Mon",
            Tuesday => "Tue",
            Wednesday => "Wed",
            Thursday => "Thu",
            Friday => "Fri",
            Saturday => "Sat",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Wall-clock time of an observation.
///
/// The calendar fields are what gets printed; `epoch` is what gets compared.
/// Both are already shifted by the station's timezone offset.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Timestamp {
    pub day: Weekday,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub epoch: i64,
}

impl Timestamp {
    /// Breaks epoch seconds down into weekday and time of day.
    /// 1970-01-01 was a Thursday.
    pub fn from_epoch(epoch: i64) -> Timestamp {
        let days = epoch.div_euclid(SECONDS_PER_DAY);
        let seconds = epoch.rem_euclid(SECONDS_PER_DAY);

        let day = (days + 4).rem_euclid(7) as u8;

        Timestamp {
            day: Weekday::from_index(day).unwrap_or_default(),
            hour: (seconds / 3600) as u8,
            minute: (seconds % 3600 / 60) as u8,
            second: (seconds % 60) as u8,
            epoch,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{:02}:{:02}",
            self.day, self.hour, self.minute, self.second
        )
    }
}

/// Network-synchronized wall clock.
pub trait TimeSource {
    /// Current local time, offset applied.
    fn now(&mut self) -> Timestamp;

    /// Forces a synchronization with the time server.
    fn resync(&mut self);

    fn set_offset_minutes(&mut self, minutes: i32);

    /// Called on every poll of the station; sync clients that like to be
    /// polled do their periodic update here.
    fn maintain(&mut self) {}
}
