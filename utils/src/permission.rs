//! Classification of filesystem failures.
//!
//! A failure caused by OS or sandbox policy (access denied, read-only
//! filesystem, operation not permitted) is reported to the user as a block
//! with remediation guidance. Everything else is a generic failure. A missing
//! path is never a block: callers create missing directories instead.

use std::error::Error;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    PermissionBlock,
    Other,
}

#[must_use]
pub fn classify(err: &io::Error) -> FailureClass {
    if is_permission_block(err) {
        FailureClass::PermissionBlock
    } else {
        FailureClass::Other
    }
}

#[must_use]
pub fn is_permission_block(err: &io::Error) -> bool {
    match err.kind() {
        io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => return true,
        io::ErrorKind::NotFound => return false,
        _ => {}
    }

    if err.raw_os_error().is_some_and(is_permission_errno) {
        return true;
    }

    // tempfile and friends wrap the OS error in a custom payload.
    let mut source = err
        .get_ref()
        .map(|inner| inner as &(dyn Error + 'static));
    while let Some(inner) = source {
        if let Some(io_err) = inner.downcast_ref::<io::Error>() {
            return is_permission_block(io_err);
        }
        source = inner.source();
    }
    false
}

#[cfg(unix)]
fn is_permission_errno(code: i32) -> bool {
    matches!(code, libc::EACCES | libc::EPERM | libc::EROFS)
}

#[cfg(windows)]
fn is_permission_errno(code: i32) -> bool {
    // ERROR_ACCESS_DENIED, ERROR_WRITE_PROTECT
    matches!(code, 5 | 19)
}

#[cfg(not(any(unix, windows)))]
fn is_permission_errno(_code: i32) -> bool {
    false
}
