//! Shared infrastructure utilities.
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename)
//! - **`permission`**: Classifies filesystem failures as policy blocks vs. generic errors

pub mod atomic_write;
pub mod permission;

pub use atomic_write::atomic_write;
pub use permission::{FailureClass, classify, is_permission_block};
