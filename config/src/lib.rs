//! Configuration file location, loading, and persistence.
//!
//! Paths are resolved purely from [`PathInputs`]; the only boundary that
//! queries the process environment is [`PathInputs::from_env`]. Documents are
//! edited in place with `toml_edit` so comments and formatting of entries we
//! do not own survive every write.

mod document;
mod paths;

pub use document::{ConfigDocument, DocumentError, DocumentStore};
pub use paths::{
    CONFIG_FILENAME, CONFIG_HOME_ENV, DEFAULT_ROOT_DIR, HOOK_SCRIPT_FILENAME, PathError,
    PathInputs, PathOverrides, ResolvedPaths, SNAPSHOT_FILENAME, normalize_lexically, resolve,
};
