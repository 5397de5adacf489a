//! The structured result every engine invocation produces.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::direction::USAGE_TEXT;

pub const BLOCKED_NEXT_ACTION: &str = "Add the config directory to sandbox_workspace_write.writable_roots or rerun with a policy that permits writing the global Codex config.";

pub const FAILED_NEXT_ACTION: &str =
    "Inspect the error and rerun after correcting the config or filesystem state.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Applied,
    AlreadyApplied,
    Blocked,
    InvalidInput,
    Failed,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Applied => "applied",
            Status::AlreadyApplied => "already-applied",
            Status::Blocked => "blocked",
            Status::InvalidInput => "invalid-input",
            Status::Failed => "failed",
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Status::Applied | Status::AlreadyApplied)
    }

    /// Process exit code for the command-line surface.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Status::Applied | Status::AlreadyApplied => 0,
            Status::InvalidInput => 2,
            Status::Blocked => 3,
            Status::Failed => 4,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{action, status, rationale, next_action}`.
///
/// Only constructible through the status-specific constructors, so a value
/// is never partially filled: `next_action` is set exactly for the statuses
/// that require caller follow-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    action: String,
    status: Status,
    rationale: String,
    next_action: Option<String>,
}

impl Outcome {
    fn build(
        action: impl Into<String>,
        status: Status,
        rationale: impl Into<String>,
        next_action: Option<&str>,
    ) -> Self {
        Self {
            action: action.into(),
            status,
            rationale: rationale.into(),
            next_action: next_action.map(ToString::to_string),
        }
    }

    #[must_use]
    pub fn applied(action: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self::build(action, Status::Applied, rationale, None)
    }

    #[must_use]
    pub fn already_applied(action: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self::build(action, Status::AlreadyApplied, rationale, None)
    }

    #[must_use]
    pub fn blocked(action: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self::build(action, Status::Blocked, rationale, Some(BLOCKED_NEXT_ACTION))
    }

    #[must_use]
    pub fn failed(action: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self::build(action, Status::Failed, rationale, Some(FAILED_NEXT_ACTION))
    }

    #[must_use]
    pub fn invalid_input(action: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self::build(action, Status::InvalidInput, rationale, Some(USAGE_TEXT))
    }

    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    #[must_use]
    pub fn next_action(&self) -> Option<&str> {
        self.next_action.as_deref()
    }
}
