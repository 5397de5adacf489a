//! The on/off state machine.

use notifications_config::{ConfigDocument, DocumentStore, PathInputs, ResolvedPaths, resolve};
use notifications_types::{ACTION_PREFIX, Direction, DirectionParseError, Outcome};
use notifications_utils::FailureClass;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::snapshot::{Snapshot, SnapshotLoad, SnapshotStore};
use crate::tracked::{self, OnTarget, PolicyState};

/// Validate `raw`, resolve paths, and run the transition.
///
/// Every failure mode becomes an [`Outcome`]; nothing escapes as an error.
#[must_use]
pub fn execute(raw: &str, inputs: &PathInputs) -> Outcome {
    let direction = match raw.parse::<Direction>() {
        Ok(direction) => direction,
        Err(err) => return invalid_direction(&err),
    };

    match resolve(inputs) {
        Ok(paths) => StateEngine::new(paths).apply(direction),
        Err(err) => {
            warn!("Path resolution failed: {err}");
            Outcome::failed(direction.action(), format!("Cannot resolve config paths: {err}."))
        }
    }
}

fn invalid_direction(err: &DirectionParseError) -> Outcome {
    Outcome::invalid_input(format!("{ACTION_PREFIX} {}", err.raw()), err.to_string())
}

/// Applies or reverts the notifications policy against one config file.
#[derive(Debug, Clone)]
pub struct StateEngine {
    paths: ResolvedPaths,
    documents: DocumentStore,
    snapshots: SnapshotStore,
    target: OnTarget,
}

impl StateEngine {
    #[must_use]
    pub fn new(paths: ResolvedPaths) -> Self {
        Self {
            documents: DocumentStore::new(paths.config.clone()),
            snapshots: SnapshotStore::new(paths.snapshot.clone()),
            target: OnTarget::new(paths.notify_script.clone()),
            paths,
        }
    }

    #[must_use]
    pub fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    #[must_use]
    pub fn apply(&self, direction: Direction) -> Outcome {
        match direction {
            Direction::On => self.apply_on(),
            Direction::Off => self.apply_off(),
        }
    }

    /// Like [`Self::apply`] for unvalidated input; anything but `on`/`off`
    /// is `invalid-input`.
    #[must_use]
    pub fn apply_raw(&self, raw: &str) -> Outcome {
        match raw.parse::<Direction>() {
            Ok(direction) => self.apply(direction),
            Err(err) => invalid_direction(&err),
        }
    }

    #[must_use]
    pub fn apply_on(&self) -> Outcome {
        self.try_on()
            .unwrap_or_else(|err| self.error_outcome(Direction::On, &err))
    }

    #[must_use]
    pub fn apply_off(&self) -> Outcome {
        self.try_off()
            .unwrap_or_else(|err| self.error_outcome(Direction::Off, &err))
    }

    fn try_on(&self) -> Result<Outcome, EngineError> {
        let action = Direction::On.action();
        self.documents.prepare_directory()?;
        let mut document = self.documents.load()?;

        let state = PolicyState::detect(&document, &self.target)?;
        debug!(?state, config = %self.paths.config.display(), "Loaded config for on");
        if state == PolicyState::On {
            return Ok(Outcome::already_applied(
                action,
                "Config already matches the v1 notifications-on target state.",
            ));
        }

        let snapshot = Snapshot::capture(&document, &self.paths.config)?;
        tracked::apply_on_values(&mut document, &self.target)?;
        self.commit_on(&snapshot, &document)?;

        info!(
            config = %self.paths.config.display(),
            snapshot = %self.paths.snapshot.display(),
            "Notifications policy applied"
        );
        Ok(Outcome::applied(
            action,
            "Snapshot saved and global config updated for completion and approval alerts.",
        ))
    }

    /// Snapshot first, then config. If the config save fails the snapshot
    /// file goes back to what it was.
    fn commit_on(&self, snapshot: &Snapshot, document: &ConfigDocument) -> Result<(), EngineError> {
        let previous = self.snapshots.read_raw()?;
        self.snapshots.write(snapshot)?;
        if let Err(err) = self.documents.save(document) {
            self.roll_back_snapshot(previous.as_deref());
            return Err(err.into());
        }
        Ok(())
    }

    fn try_off(&self) -> Result<Outcome, EngineError> {
        self.documents.prepare_directory()?;
        let document = self.documents.load()?;

        match self.snapshots.load(&self.paths.config)? {
            SnapshotLoad::Valid(snapshot) => self.restore_from(document, &snapshot),
            SnapshotLoad::Missing => self.safe_off(document, None),
            SnapshotLoad::Invalid(reason) => {
                warn!(
                    snapshot = %self.paths.snapshot.display(),
                    "Ignoring unusable snapshot: {reason}"
                );
                self.safe_off(document, Some(&reason))
            }
        }
    }

    fn restore_from(
        &self,
        mut document: ConfigDocument,
        snapshot: &Snapshot,
    ) -> Result<Outcome, EngineError> {
        let action = Direction::Off.action();
        let before = document.render();
        snapshot.restore_into(&mut document)?;

        let changed = document.render() != before;
        if changed {
            self.documents.save(&document)?;
        }
        self.snapshots.remove()?;

        if changed {
            info!(config = %self.paths.config.display(), "Restored prior notification settings");
            Ok(Outcome::applied(
                action,
                "Restored prior user notification settings from snapshot.",
            ))
        } else {
            debug!("Snapshot matched current config; removed without rewriting");
            Ok(Outcome::already_applied(
                action,
                "Config already matched the snapshot; removed the consumed snapshot.",
            ))
        }
    }

    fn safe_off(
        &self,
        mut document: ConfigDocument,
        warning: Option<&str>,
    ) -> Result<Outcome, EngineError> {
        let action = Direction::Off.action();
        let suffix = warning.map(|w| format!(" ({w})")).unwrap_or_default();

        if !tracked::disable_managed(&mut document, &self.target)? {
            return Ok(Outcome::already_applied(
                action,
                format!(
                    "Notifications policy is not in its on state and there is no snapshot to restore; config left unchanged{suffix}."
                ),
            ));
        }

        self.documents.save(&document)?;
        info!(config = %self.paths.config.display(), "Disabled managed notification keys without snapshot");
        Ok(Outcome::applied(
            action,
            format!("Disabled skill-managed notification overrides without snapshot restore{suffix}."),
        ))
    }

    fn roll_back_snapshot(&self, previous: Option<&[u8]>) {
        if let Err(e) = self.snapshots.restore_raw(previous) {
            warn!(
                snapshot = %self.paths.snapshot.display(),
                "Failed to roll back snapshot after config write failure: {e}"
            );
        }
    }

    fn error_outcome(&self, direction: Direction, err: &EngineError) -> Outcome {
        let action = direction.action();
        match err.class() {
            FailureClass::PermissionBlock => {
                warn!(config = %self.paths.config.display(), "Blocked: {err}");
                Outcome::blocked(action, format!("Global config access blocked: {err}"))
            }
            FailureClass::Other => {
                warn!(config = %self.paths.config.display(), "Failed: {err}");
                Outcome::failed(action, format!("Failed to apply notifications {direction}: {err}"))
            }
        }
    }
}
