//! Loosely typed config values, modelled as a closed variant.
//!
//! Tracked keys hold whatever the user wrote. Comparisons and restores go
//! through [`TrackedValue`] so they are exhaustive and never coerce across
//! types (`true` is not `["approval-requested"]`, `1` is not `1.0`).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackedValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<TrackedValue>),
    Table(BTreeMap<String, TrackedValue>),
}

impl TrackedValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TrackedValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[TrackedValue]> {
        match self {
            TrackedValue::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TrackedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The set of string tokens in a list of strings.
    ///
    /// `None` if this is not a list or any element is not a string.
    #[must_use]
    pub fn token_set(&self) -> Option<BTreeSet<&str>> {
        self.as_list()?.iter().map(TrackedValue::as_str).collect()
    }

    #[must_use]
    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TrackedValue::List(
            items
                .into_iter()
                .map(|s| TrackedValue::String(s.into()))
                .collect(),
        )
    }
}

impl From<bool> for TrackedValue {
    fn from(value: bool) -> Self {
        TrackedValue::Bool(value)
    }
}

impl From<&str> for TrackedValue {
    fn from(value: &str) -> Self {
        TrackedValue::String(value.to_string())
    }
}

impl From<String> for TrackedValue {
    fn from(value: String) -> Self {
        TrackedValue::String(value)
    }
}

/// Presence and value of a tracked key at one point in time.
///
/// On disk this is `{"present": false}` or `{"present": true, "value": ...}`.
/// A present entry without a value is rejected rather than restored as a
/// placeholder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawPriorState", into = "RawPriorState")]
pub enum PriorState {
    #[default]
    Absent,
    Present(TrackedValue),
}

impl PriorState {
    #[must_use]
    pub fn value(&self) -> Option<&TrackedValue> {
        match self {
            PriorState::Absent => None,
            PriorState::Present(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriorStateError {
    #[error("entry is marked present but carries no value")]
    MissingValue,
}

#[derive(Serialize, Deserialize)]
struct RawPriorState {
    present: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<TrackedValue>,
}

impl TryFrom<RawPriorState> for PriorState {
    type Error = PriorStateError;

    fn try_from(raw: RawPriorState) -> Result<Self, Self::Error> {
        match (raw.present, raw.value) {
            (false, _) => Ok(PriorState::Absent),
            (true, Some(value)) => Ok(PriorState::Present(value)),
            (true, None) => Err(PriorStateError::MissingValue),
        }
    }
}

impl From<PriorState> for RawPriorState {
    fn from(state: PriorState) -> Self {
        match state {
            PriorState::Absent => RawPriorState {
                present: false,
                value: None,
            },
            PriorState::Present(value) => RawPriorState {
                present: true,
                value: Some(value),
            },
        }
    }
}
