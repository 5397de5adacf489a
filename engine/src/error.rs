use std::io;

use notifications_config::DocumentError;
use notifications_utils::{FailureClass, classify};
use thiserror::Error;

use crate::snapshot::SnapshotError;
use crate::tracked::TrackedError;

/// Anything that can abort a transition. Converted into exactly one
/// [`notifications_types::Outcome`] at the engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Tracked(#[from] TrackedError),
}

impl EngineError {
    #[must_use]
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            EngineError::Document(err) => err.io_error(),
            EngineError::Snapshot(err) => err.io_error(),
            EngineError::Tracked(_) => None,
        }
    }

    #[must_use]
    pub fn class(&self) -> FailureClass {
        self.io_error().map_or(FailureClass::Other, classify)
    }
}
