//! The two transitions a caller may request.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Prefix shared by every outcome's `action` field.
pub const ACTION_PREFIX: &str = "$notifications";

pub const USAGE_TEXT: &str = "Usage: $notifications on|off";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    On,
    Off,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::On => "on",
            Direction::Off => "off",
        }
    }

    /// The `action` label reported back to the caller, e.g. `$notifications on`.
    #[must_use]
    pub fn action(self) -> String {
        format!("{ACTION_PREFIX} {}", self.as_str())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid command argument '{raw}'.")]
pub struct DirectionParseError {
    raw: String,
}

impl DirectionParseError {
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl FromStr for Direction {
    type Err = DirectionParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "on" => Ok(Direction::On),
            "off" => Ok(Direction::Off),
            _ => Err(DirectionParseError {
                raw: raw.to_string(),
            }),
        }
    }
}
