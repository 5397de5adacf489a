//! Persisted record of tracked keys before an "on" transition.
//!
//! The snapshot lives next to the config file and is written once per
//! effective "on", consumed by the matching "off". Loading never fails on bad
//! content: a garbled, foreign, or wrong-version snapshot is reported as
//! [`SnapshotLoad::Invalid`] so "off" can fall back to the safe path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use notifications_config::{ConfigDocument, normalize_lexically};
use notifications_types::PriorState;
use notifications_utils::atomic_write;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::tracked::{self, SectionState, TUI_SECTION, TrackedError, TrackedKey};

pub const SNAPSHOT_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub config_path: PathBuf,
    pub prior: PriorRecord,
    /// Shape of `[tui]` before "on"; older snapshots without it read as absent.
    #[serde(default)]
    pub tui_section: SectionState,
}

/// One entry per tracked key, keyed by the key's dotted name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorRecord {
    pub notify: PriorState,
    #[serde(rename = "tui.notifications")]
    pub tui_notifications: PriorState,
    #[serde(rename = "tui.notification_method")]
    pub tui_notification_method: PriorState,
}

impl PriorRecord {
    #[must_use]
    pub fn get(&self, key: TrackedKey) -> &PriorState {
        match key {
            TrackedKey::Notify => &self.notify,
            TrackedKey::TuiNotifications => &self.tui_notifications,
            TrackedKey::TuiNotificationMethod => &self.tui_notification_method,
        }
    }
}

impl Snapshot {
    /// Record the current presence and value of every tracked key.
    pub fn capture(document: &ConfigDocument, config_path: &Path) -> Result<Self, TrackedError> {
        Ok(Self {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            config_path: config_path.to_path_buf(),
            prior: PriorRecord {
                notify: tracked::read(document, TrackedKey::Notify)?,
                tui_notifications: tracked::read(document, TrackedKey::TuiNotifications)?,
                tui_notification_method: tracked::read(
                    document,
                    TrackedKey::TuiNotificationMethod,
                )?,
            },
            tui_section: SectionState::detect(document, TUI_SECTION),
        })
    }

    /// Put every tracked key back the way it was captured.
    pub fn restore_into(&self, document: &mut ConfigDocument) -> Result<(), TrackedError> {
        for key in TrackedKey::ALL {
            tracked::restore(document, key, self.prior.get(key))?;
        }
        tracked::restore_section(document, TUI_SECTION, self.tui_section);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotLoad {
    Missing,
    Valid(Snapshot),
    /// Present but unusable; the reason is surfaced to the user.
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Cannot read snapshot '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot write snapshot '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot remove snapshot '{}': {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SnapshotError {
    #[must_use]
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            SnapshotError::Read { source, .. }
            | SnapshotError::Write { source, .. }
            | SnapshotError::Remove { source, .. } => Some(source),
            SnapshotError::Encode(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pretty JSON with a trailing newline, written atomically.
    pub fn write(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let mut json = serde_json::to_string_pretty(snapshot)?;
        json.push('\n');
        self.write_bytes(json.as_bytes())
    }

    /// Load and validate the snapshot meant for `config_path`.
    pub fn load(&self, config_path: &Path) -> Result<SnapshotLoad, SnapshotError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(SnapshotLoad::Missing),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                return Ok(SnapshotLoad::Invalid(
                    "Snapshot format invalid: not valid UTF-8".to_string(),
                ));
            }
            Err(source) => {
                return Err(SnapshotError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        Ok(parse_snapshot(&raw, config_path))
    }

    /// Raw bytes of the current snapshot, if any.
    pub fn read_raw(&self) -> Result<Option<Vec<u8>>, SnapshotError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SnapshotError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Put back what [`Self::read_raw`] returned: rewrite it, or remove the
    /// file if there was none.
    pub fn restore_raw(&self, previous: Option<&[u8]>) -> Result<(), SnapshotError> {
        match previous {
            Some(bytes) => self.write_bytes(bytes),
            None => self.remove(),
        }
    }

    /// Remove the snapshot. Already gone is fine.
    pub fn remove(&self) -> Result<(), SnapshotError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SnapshotError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write_bytes(&self, bytes: &[u8]) -> Result<(), SnapshotError> {
        atomic_write(&self.path, bytes).map_err(|source| SnapshotError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn parse_snapshot(raw: &str, config_path: &Path) -> SnapshotLoad {
    let payload: Value = match serde_json::from_str(raw) {
        Ok(payload) => payload,
        Err(e) => return SnapshotLoad::Invalid(format!("Snapshot format invalid: {e}")),
    };

    let Some(object) = payload.as_object() else {
        return SnapshotLoad::Invalid("Snapshot format invalid: root is not an object".into());
    };
    match object.get("version").and_then(Value::as_u64) {
        Some(SNAPSHOT_VERSION) => {}
        Some(other) => {
            return SnapshotLoad::Invalid(format!("Snapshot version {other} is not supported"));
        }
        None => {
            return SnapshotLoad::Invalid("Snapshot format invalid: missing 'version'".into());
        }
    }
    if !object.get("prior").is_some_and(Value::is_object) {
        return SnapshotLoad::Invalid("Snapshot format invalid: missing 'prior' object".into());
    }

    let snapshot: Snapshot = match serde_json::from_value(payload) {
        Ok(snapshot) => snapshot,
        Err(e) => return SnapshotLoad::Invalid(format!("Snapshot format invalid: {e}")),
    };

    if normalize_lexically(&snapshot.config_path) != config_path {
        debug!(
            recorded = %snapshot.config_path.display(),
            expected = %config_path.display(),
            "Snapshot config path mismatch"
        );
        return SnapshotLoad::Invalid(format!(
            "Snapshot belongs to a different config '{}'",
            snapshot.config_path.display()
        ));
    }

    SnapshotLoad::Valid(snapshot)
}
