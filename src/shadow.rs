//! Device shadow documents.
//!
//! The station keeps its preferences in a cloud shadow. It reports its
//! current state on boot, asks for changes through the desired section, and
//! receives deltas holding only the fields that differ.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::preferences::{FieldValue, PreferenceUpdate, Preferences, Units};

/// Every preference mirrored in the shadow.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShadowState {
    pub alarm: i64,
    pub units: Units,
    pub alt: i32,
    pub tz: i32,
    pub t_num: String,
    pub m_num: String,
}

impl ShadowState {
    pub fn new(alarm: i64, preferences: &Preferences) -> ShadowState {
        ShadowState {
            alarm,
            units: preferences.units,
            alt: preferences.altitude,
            tz: preferences.timezone_offset,
            t_num: preferences.outgoing_number.clone(),
            m_num: preferences.authorized_number.clone(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Reported(ShadowState),
    Desired(ShadowState),
}

/// Outbound `{"state": {"reported"|"desired": {...}}}` document.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ShadowDocument {
    pub state: Section,
}

impl ShadowDocument {
    pub fn reported(state: ShadowState) -> ShadowDocument {
        ShadowDocument {
            state: Section::Reported(state),
        }
    }

    pub fn desired(state: ShadowState) -> ShadowDocument {
        ShadowDocument {
            state: Section::Desired(state),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Inbound delta: only the fields that changed, keyed by shadow name.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ShadowDelta {
    #[serde(default)]
    pub state: BTreeMap<String, FieldValue>,
}

impl ShadowDelta {
    pub fn from_json(data: &[u8]) -> Result<ShadowDelta> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Typed updates for every recognised field. Unknown fields are skipped;
    /// fields with a value of the wrong type come back as errors so the
    /// caller can log them and carry on with the rest.
    pub fn updates(&self) -> impl Iterator<Item = Result<PreferenceUpdate>> + '_ {
        self.state
            .iter()
            .filter_map(|(field, value)| PreferenceUpdate::parse(field, value).transpose())
    }
}

/// Cloud side of the shadow.
pub trait ShadowSync {
    /// Publishes the station's current state.
    fn report_state(&mut self, state: &ShadowState) -> Result<()>;

    /// Asks the cloud to change the desired state; changes come back as a
    /// delta.
    fn request_state(&mut self, state: &ShadowState) -> Result<()>;
}
