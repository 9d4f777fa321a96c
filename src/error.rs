use std::{error, fmt};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum ErrorKind {
    /// One or both sensors reported an error this tick.
    InvalidSensorReading,
    /// Unit system other than `imperial` or `metric`.
    InvalidUnits,
    /// A keyed preference update carried the wrong value type.
    InvalidField,
    DeliveryFailed,
    ShadowSync,
    Codec,
    Other,
}

#[derive(Debug, thiserror::Error)]
pub struct Error {
    kind: ErrorKind,
    #[source]
    repr: Option<Box<dyn error::Error + Send + Sync>>,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn new<E>(kind: ErrorKind, error: E) -> Error
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Error {
            kind,
            repr: Some(error.into()),
        }
    }

    pub fn other<E>(error: E) -> Error
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Other, error)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(value: ErrorKind) -> Self {
        Error {
            kind: value,
            repr: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::new(ErrorKind::Codec, value)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Some(e) => write!(f, "{}: {}", self.kind, e),
            None => f.write_str(self.kind.as_str()),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    pub(crate) fn as_str(&self) -> &'static str {
        use ErrorKind::*;
        match *self {
            InvalidSensorReading => "sensor errors, please check your board",
            InvalidUnits => "unit type must be 'imperial' or 'metric'",
            InvalidField => "preference value has the wrong type",
            DeliveryFailed => "message delivery failed",
            ShadowSync => "shadow state update failed",
            Codec => "malformed document",
            Other => "other",
        }
    }
}
