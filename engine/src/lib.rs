//! Transactional on/off engine for the notifications policy.
//!
//! # Architecture
//!
//! ```text
//! execute(raw, inputs)
//!   -> Direction::from_str          (invalid-input)
//!   -> notifications_config::resolve (paths)
//!   -> StateEngine::apply
//!        prepare dir -> load -> [snapshot capture/write | load/restore/remove]
//!        -> in-memory edit -> atomic save
//!   -> Outcome
//! ```
//!
//! Each call is one isolated read-mutate-write transaction. No state survives
//! between calls except the config file and the snapshot file.

mod error;
mod snapshot;
mod state;
mod tracked;

pub use error::EngineError;
pub use snapshot::{PriorRecord, SNAPSHOT_VERSION, Snapshot, SnapshotError, SnapshotLoad, SnapshotStore};
pub use state::{StateEngine, execute};
pub use tracked::{
    APPROVAL_EVENT, BELL_METHOD, HOOK_LAUNCHER, OnTarget, PolicyState, SectionState, TUI_SECTION,
    TrackedError, TrackedKey,
};
