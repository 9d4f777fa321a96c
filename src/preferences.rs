use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

impl FromStr for Units {
    type Err = Error;

    /// Only the exact lowercase names are accepted.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(ErrorKind::InvalidUnits.into()),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User preferences of a station.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Preferences {
    pub units: Units,
    /// Meters above sea level.
    pub altitude: i32,
    /// Minutes east of UTC.
    pub timezone_offset: i32,
    /// Number the station sends from.
    pub outgoing_number: String,
    /// Number allowed to control the station; daily reports go here.
    pub authorized_number: String,
}

/// Value of a keyed preference update as it arrives in a delta document.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
    Other(serde_json::Value),
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_owned())
    }
}

/// A single typed preference change.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PreferenceUpdate {
    Alarm(i64),
    /// Validated when applied.
    Units(String),
    Altitude(i32),
    TimezoneOffset(i32),
    OutgoingNumber(String),
    AuthorizedNumber(String),
}

impl PreferenceUpdate {
    /// Maps a shadow field name and value onto an update.
    ///
    /// Unknown fields yield `Ok(None)`. Known fields with a value of the
    /// wrong type are an `InvalidField` error.
    pub fn parse(field: &str, value: &FieldValue) -> Result<Option<PreferenceUpdate>> {
        let update = match field {
            "alarm" => PreferenceUpdate::Alarm(integer(field, value)?),
            "units" => PreferenceUpdate::Units(text(field, value)?),
            "alt" => PreferenceUpdate::Altitude(narrow(field, integer(field, value)?)?),
            "tz" => PreferenceUpdate::TimezoneOffset(narrow(field, integer(field, value)?)?),
            "t_num" => PreferenceUpdate::OutgoingNumber(text(field, value)?),
            "m_num" => PreferenceUpdate::AuthorizedNumber(text(field, value)?),
            _ => return Ok(None),
        };

        Ok(Some(update))
    }

    pub fn field(&self) -> &'static str {
        match self {
            PreferenceUpdate::Alarm(_) => "alarm",
            PreferenceUpdate::Units(_) => "units",
            PreferenceUpdate::Altitude(_) => "alt",
            PreferenceUpdate::TimezoneOffset(_) => "tz",
            PreferenceUpdate::OutgoingNumber(_) => "t_num",
            PreferenceUpdate::AuthorizedNumber(_) => "m_num",
        }
    }
}

fn integer(field: &str, value: &FieldValue) -> Result<i64> {
    match value {
        FieldValue::Integer(v) => Ok(*v),
        other => Err(Error::new(
            ErrorKind::InvalidField,
            format!("{field} expects an integer, got {other:?}"),
        )),
    }
}

fn text(field: &str, value: &FieldValue) -> Result<String> {
    match value {
        FieldValue::Text(v) => Ok(v.clone()),
        other => Err(Error::new(
            ErrorKind::InvalidField,
            format!("{field} expects a string, got {other:?}"),
        )),
    }
}

fn narrow(field: &str, value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|e| Error::new(ErrorKind::InvalidField, format!("{field}: {e}")))
}
