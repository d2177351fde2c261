//! Flatten raw API records into `Observation`s.
//!
//! The API nests `country` and `indicator` as `{ "id": .., "value": .. }`
//! objects. Normalization keeps only the display string. A label that is
//! already a flat string passes through unchanged, so normalizing twice is a
//! no-op.

use serde::{Deserialize, Serialize};

use crate::domain::{Indicator, Observation, ObservationSet};

/// A country or indicator label as it appears in a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Nested {
        #[serde(default)]
        id: Option<String>,
        value: String,
    },
    Flat(String),
}

impl Label {
    pub fn into_display(self) -> String {
        match self {
            Label::Nested { value, .. } => value,
            Label::Flat(value) => value,
        }
    }
}

/// One record of the response's observation page. Unused fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub country: Label,
    pub indicator: Label,
    pub date: String,
    #[serde(default)]
    pub value: Option<f64>,
}

impl From<Observation> for RawObservation {
    fn from(obs: Observation) -> Self {
        Self {
            country: Label::Flat(obs.country),
            indicator: Label::Flat(obs.indicator),
            date: obs.date,
            value: obs.value,
        }
    }
}

pub fn normalize(raw: RawObservation) -> Observation {
    Observation {
        country: raw.country.into_display(),
        indicator: raw.indicator.into_display(),
        date: raw.date,
        value: raw.value,
    }
}

pub fn normalize_set(indicator: Indicator, raw: Vec<RawObservation>) -> ObservationSet {
    ObservationSet::new(indicator, raw.into_iter().map(normalize).collect())
}
