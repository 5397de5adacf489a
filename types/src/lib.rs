//! Core domain types for the notifications policy engine.
//!
//! This crate contains pure domain types with no IO and minimal dependencies.
//! Every layer (engine, CLI, tests) speaks in these types.

mod direction;
mod outcome;
mod value;

pub use direction::{ACTION_PREFIX, Direction, DirectionParseError, USAGE_TEXT};
pub use outcome::{BLOCKED_NEXT_ACTION, FAILED_NEXT_ACTION, Outcome, Status};
pub use value::{PriorState, PriorStateError, TrackedValue};
