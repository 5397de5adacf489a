//! The fixed set of config entries the engine owns.
//!
//! Every read and write of a tracked key goes through this module. Values
//! cross the `toml_edit` boundary as [`TrackedValue`]s so comparisons are
//! semantic: quoting style, whitespace and comments never decide whether a key
//! is "on". Writes replace values in place and keep the key's surrounding
//! decoration.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use notifications_config::{ConfigDocument, normalize_lexically};
use notifications_types::{PriorState, TrackedValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use toml_edit::{Array, InlineTable, Item, Table, TableLike, Value};

pub const TUI_SECTION: &str = "tui";
/// Program that runs the hook script.
pub const HOOK_LAUNCHER: &str = "python3";
pub const APPROVAL_EVENT: &str = "approval-requested";
pub const BELL_METHOD: &str = "bel";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedKey {
    /// Top-level `notify`: the command run on agent events.
    Notify,
    /// `[tui] notifications`: `true`/`false` or a list of event names.
    TuiNotifications,
    /// `[tui] notification_method`: `auto | osc9 | bel`.
    TuiNotificationMethod,
}

impl TrackedKey {
    pub const ALL: [TrackedKey; 3] = [
        TrackedKey::Notify,
        TrackedKey::TuiNotifications,
        TrackedKey::TuiNotificationMethod,
    ];

    /// Dotted name, also used as the snapshot entry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TrackedKey::Notify => "notify",
            TrackedKey::TuiNotifications => "tui.notifications",
            TrackedKey::TuiNotificationMethod => "tui.notification_method",
        }
    }

    const fn section(self) -> Option<&'static str> {
        match self {
            TrackedKey::Notify => None,
            TrackedKey::TuiNotifications | TrackedKey::TuiNotificationMethod => Some(TUI_SECTION),
        }
    }

    const fn leaf(self) -> &'static str {
        match self {
            TrackedKey::Notify => "notify",
            TrackedKey::TuiNotifications => "notifications",
            TrackedKey::TuiNotificationMethod => "notification_method",
        }
    }
}

impl fmt::Display for TrackedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackedError {
    #[error("Config key '{key}' holds a {kind} value, which cannot be snapshotted")]
    Unsupported {
        key: &'static str,
        kind: &'static str,
    },
    #[error("Config entry '{section}' is not a table; refusing to modify it")]
    SectionConflict { section: &'static str },
}

/// How the `[tui]` section appeared before the engine touched it.
///
/// "on" may have to give the section a header; "off" uses this to take the
/// header away again without dropping one the user wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionState {
    #[default]
    Absent,
    /// Only implied by a sub-table header such as `[tui.theme]`.
    Implicit,
    /// Written by the user: a header, dotted keys, or an inline table.
    Explicit,
}

impl SectionState {
    #[must_use]
    pub fn detect(document: &ConfigDocument, section: &str) -> Self {
        match document.root().get(section) {
            None | Some(Item::None) => SectionState::Absent,
            Some(Item::Table(table)) if table.is_implicit() && !table.is_dotted() => {
                SectionState::Implicit
            }
            Some(_) => SectionState::Explicit,
        }
    }
}

/// Canonical "on" values for one hook script location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnTarget {
    notify_script: PathBuf,
}

impl OnTarget {
    #[must_use]
    pub fn new(notify_script: impl Into<PathBuf>) -> Self {
        Self {
            notify_script: notify_script.into(),
        }
    }

    #[must_use]
    pub fn notify_script(&self) -> &Path {
        &self.notify_script
    }

    #[must_use]
    pub fn value(&self, key: TrackedKey) -> TrackedValue {
        match key {
            TrackedKey::Notify => TrackedValue::string_list([
                HOOK_LAUNCHER.to_string(),
                self.notify_script.to_string_lossy().into_owned(),
            ]),
            TrackedKey::TuiNotifications => TrackedValue::string_list([APPROVAL_EVENT]),
            TrackedKey::TuiNotificationMethod => TrackedValue::from(BELL_METHOD),
        }
    }

    /// Whether `state` already means the same thing as the "on" value.
    #[must_use]
    pub fn matches(&self, key: TrackedKey, state: &PriorState) -> bool {
        let Some(value) = state.value() else {
            return false;
        };
        match key {
            TrackedKey::Notify => self.is_hook_command(value),
            TrackedKey::TuiNotifications => value
                .token_set()
                .is_some_and(|tokens| tokens.len() == 1 && tokens.contains(APPROVAL_EVENT)),
            TrackedKey::TuiNotificationMethod => value.as_str() == Some(BELL_METHOD),
        }
    }

    /// `["python3", <this hook script>]`, with the script path compared after
    /// normalization.
    #[must_use]
    pub fn is_hook_command(&self, value: &TrackedValue) -> bool {
        let Some([launcher, script]) = value.as_list() else {
            return false;
        };
        launcher.as_str() == Some(HOOK_LAUNCHER)
            && script.as_str().is_some_and(|script| {
                let script = Path::new(script);
                script.is_absolute() && normalize_lexically(script) == self.notify_script
            })
    }
}

/// Logical policy state derived from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyState {
    /// Every tracked key absent or at its off value.
    Off,
    /// Every tracked key at its on value.
    On,
    /// Anything else, typically pre-existing user configuration.
    Custom,
}

impl PolicyState {
    pub fn detect(document: &ConfigDocument, target: &OnTarget) -> Result<Self, TrackedError> {
        let mut on = true;
        let mut off = true;
        for key in TrackedKey::ALL {
            let state = read(document, key)?;
            on &= target.matches(key, &state);
            off &= match (key, &state) {
                (_, PriorState::Absent) => true,
                (TrackedKey::TuiNotifications, PriorState::Present(value)) => {
                    value.as_bool() == Some(false)
                }
                _ => false,
            };
        }
        Ok(if on {
            PolicyState::On
        } else if off {
            PolicyState::Off
        } else {
            PolicyState::Custom
        })
    }
}

pub fn read(document: &ConfigDocument, key: TrackedKey) -> Result<PriorState, TrackedError> {
    let item = match key.section() {
        None => document.root().get(key.leaf()),
        Some(section) => match document.root().get(section) {
            None => None,
            Some(item) => item
                .as_table_like()
                .ok_or(TrackedError::SectionConflict { section })?
                .get(key.leaf()),
        },
    };

    match item {
        None | Some(Item::None) => Ok(PriorState::Absent),
        Some(item) => item_to_tracked(item)
            .map(PriorState::Present)
            .map_err(|kind| TrackedError::Unsupported {
                key: key.name(),
                kind,
            }),
    }
}

/// Set `key` to `value`, creating its section if needed.
pub fn write(
    document: &mut ConfigDocument,
    key: TrackedKey,
    value: &TrackedValue,
) -> Result<(), TrackedError> {
    let new_value = tracked_to_value(value);
    let table = match key.section() {
        None => document.root_mut() as &mut dyn TableLike,
        Some(section) => section_mut(document, section)?,
    };

    match table.get_mut(key.leaf()) {
        Some(Item::Value(existing)) => replace_keeping_decor(existing, new_value),
        Some(item) => *item = Item::Value(new_value),
        None => {
            table.insert(key.leaf(), Item::Value(new_value));
        }
    }
    Ok(())
}

/// Remove `key`. The enclosing section stays, even if now empty.
pub fn remove(document: &mut ConfigDocument, key: TrackedKey) -> Result<bool, TrackedError> {
    let Some(section) = key.section() else {
        return Ok(document.root_mut().remove(key.leaf()).is_some());
    };

    let Some(item) = document.root_mut().get_mut(section) else {
        return Ok(false);
    };
    let table = item
        .as_table_like_mut()
        .ok_or(TrackedError::SectionConflict { section })?;
    Ok(table.remove(key.leaf()).is_some())
}

/// Return `section` to how it appeared before, once its own keys are gone.
///
/// A section that still holds key/values is left alone. Otherwise an
/// originally absent section is dropped (or hidden, if sub-tables live under
/// it), an implied one loses its header again, and a user-written one stays.
pub fn restore_section(document: &mut ConfigDocument, section: &str, prior: SectionState) {
    if prior == SectionState::Explicit {
        return;
    }
    let root = document.root_mut();
    let Some(table) = root.get_mut(section).and_then(Item::as_table_mut) else {
        return;
    };
    if !table.get_values().is_empty() {
        return;
    }
    if prior == SectionState::Absent && table.is_empty() {
        root.remove(section);
    } else {
        table.set_implicit(true);
    }
}

/// Put `key` back into the state recorded in `prior`.
pub fn restore(
    document: &mut ConfigDocument,
    key: TrackedKey,
    prior: &PriorState,
) -> Result<(), TrackedError> {
    match prior {
        PriorState::Present(value) => write(document, key, value),
        PriorState::Absent => remove(document, key).map(|_| ()),
    }
}

/// Move every tracked key to its "on" value. Keys that already match
/// semantically are left byte-for-byte alone.
pub fn apply_on_values(
    document: &mut ConfigDocument,
    target: &OnTarget,
) -> Result<bool, TrackedError> {
    let mut changed = false;
    for key in TrackedKey::ALL {
        let state = read(document, key)?;
        if !target.matches(key, &state) {
            write(document, key, &target.value(key))?;
            changed = true;
        }
    }
    Ok(changed)
}

/// Turn off only what this tool manages, without a snapshot to go on.
///
/// Acts only when every tracked key is exactly at its "on" value, the one
/// state that can only come from a completed "on". The hook command is
/// removed and `tui.notifications` set to `false`; the method is left as is.
/// Anything else may be the user's own setting (including a state an earlier
/// "off" restored) and is left untouched.
pub fn disable_managed(
    document: &mut ConfigDocument,
    target: &OnTarget,
) -> Result<bool, TrackedError> {
    if PolicyState::detect(document, target)? != PolicyState::On {
        return Ok(false);
    }

    remove(document, TrackedKey::Notify)?;
    write(
        document,
        TrackedKey::TuiNotifications,
        &TrackedValue::Bool(false),
    )?;
    Ok(true)
}

fn section_mut<'a>(
    document: &'a mut ConfigDocument,
    section: &'static str,
) -> Result<&'a mut dyn TableLike, TrackedError> {
    let root = document.root_mut();
    if !root.contains_key(section) {
        let mut table = Table::new();
        table.set_implicit(true);
        root.insert(section, Item::Table(table));
    }
    root.get_mut(section)
        .and_then(Item::as_table_like_mut)
        .ok_or(TrackedError::SectionConflict { section })
}

fn replace_keeping_decor(slot: &mut Value, mut value: Value) {
    *value.decor_mut() = slot.decor().clone();
    *slot = value;
}

fn item_to_tracked(item: &Item) -> Result<TrackedValue, &'static str> {
    match item {
        Item::None => Err("missing"),
        Item::Value(value) => value_to_tracked(value),
        Item::Table(table) => table_to_tracked(table),
        Item::ArrayOfTables(tables) => tables
            .iter()
            .map(table_to_tracked)
            .collect::<Result<Vec<_>, _>>()
            .map(TrackedValue::List),
    }
}

fn table_to_tracked(table: &Table) -> Result<TrackedValue, &'static str> {
    table
        .iter()
        .map(|(name, item)| item_to_tracked(item).map(|value| (name.to_string(), value)))
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map(TrackedValue::Table)
}

fn value_to_tracked(value: &Value) -> Result<TrackedValue, &'static str> {
    match value {
        Value::String(s) => Ok(TrackedValue::String(s.value().clone())),
        Value::Integer(i) => Ok(TrackedValue::Integer(*i.value())),
        Value::Float(f) => Ok(TrackedValue::Float(*f.value())),
        Value::Boolean(b) => Ok(TrackedValue::Bool(*b.value())),
        Value::Datetime(_) => Err("datetime"),
        Value::Array(items) => items
            .iter()
            .map(value_to_tracked)
            .collect::<Result<Vec<_>, _>>()
            .map(TrackedValue::List),
        Value::InlineTable(table) => table
            .iter()
            .map(|(name, value)| value_to_tracked(value).map(|value| (name.to_string(), value)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(TrackedValue::Table),
    }
}

fn tracked_to_value(value: &TrackedValue) -> Value {
    match value {
        TrackedValue::Bool(b) => Value::from(*b),
        TrackedValue::Integer(i) => Value::from(*i),
        TrackedValue::Float(f) => Value::from(*f),
        TrackedValue::String(s) => Value::from(s.as_str()),
        TrackedValue::List(items) => Value::Array(items.iter().map(tracked_to_value).collect::<Array>()),
        TrackedValue::Table(entries) => Value::InlineTable(
            entries
                .iter()
                .map(|(name, value)| (name.clone(), tracked_to_value(value)))
                .collect::<InlineTable>(),
        ),
    }
}
