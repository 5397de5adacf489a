//! Atomic file write helpers.
//!
//! Content goes to a temp file in the target's own directory, is synced, and
//! is then renamed over the target. Readers see either the old file or the
//! new one. If anything fails before the rename the temp file is dropped
//! (and deleted) and the target is left untouched.
//!
//! On Windows, rename-over-existing can fail, so we use a backup-and-restore
//! fallback to avoid data loss when overwriting.

#[cfg(unix)]
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use tempfile::{Builder, NamedTempFile};
#[cfg(unix)]
use tracing::debug;

/// Replace `path` with `bytes` atomically.
///
/// The temp file is fsynced before the rename and the parent directory is
/// synced best-effort afterwards. An existing target's permission bits carry
/// over to the new file; a new file keeps the temp file's owner-only mode.
pub fn atomic_write(path: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let parent = parent_dir(path);

    let prefix = temp_prefix(path);
    let mut tmp = Builder::new().prefix(&prefix).tempfile_in(parent)?;
    match_existing_mode(&tmp, path)?;

    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;

    persist(tmp, path)?;
    best_effort_sync_parent_dir(parent);

    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// `.config.toml.tmp-XXXXXX`, so stray temp files are recognizable.
fn temp_prefix(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(".{name}.tmp-")
}

#[cfg(unix)]
fn match_existing_mode(tmp: &NamedTempFile, target: &Path) -> io::Result<()> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    if let Ok(meta) = fs::metadata(target) {
        let mode = meta.permissions().mode() & 0o777;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(mode))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn match_existing_mode(_tmp: &NamedTempFile, _target: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(not(windows))]
fn persist(tmp: NamedTempFile, path: &Path) -> io::Result<()> {
    tmp.persist(path).map(|_| ()).map_err(|err| err.error)
}

#[cfg(windows)]
fn persist(tmp: NamedTempFile, path: &Path) -> io::Result<()> {
    use std::fs;

    let Err(err) = tmp.persist(path) else {
        return Ok(());
    };
    if !path.is_file() {
        return Err(err.error);
    }

    // Windows fallback: backup and restore.
    let backup_path = path.with_extension("bak");
    let _ = fs::remove_file(&backup_path);
    fs::rename(path, &backup_path)?;

    if let Err(rename_err) = err.file.persist(path) {
        let _ = fs::rename(&backup_path, path);
        return Err(rename_err.error);
    }
    if let Err(e) = fs::remove_file(&backup_path) {
        tracing::warn!(
            path = %backup_path.display(),
            "Failed to remove .bak after atomic write: {e}"
        );
    }
    Ok(())
}

#[cfg(unix)]
fn best_effort_sync_parent_dir(parent: &Path) {
    if let Err(e) = File::open(parent).and_then(|d| d.sync_all()) {
        debug!(path = %parent.display(), "Parent directory sync_all failed (best-effort): {e}");
    }
}

#[cfg(not(unix))]
fn best_effort_sync_parent_dir(_parent: &Path) {}
