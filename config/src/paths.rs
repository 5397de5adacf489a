use std::env;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Environment variable that relocates the config root.
pub const CONFIG_HOME_ENV: &str = "CODEX_HOME";
pub const DEFAULT_ROOT_DIR: &str = ".codex";
pub const CONFIG_FILENAME: &str = "config.toml";
pub const SNAPSHOT_FILENAME: &str = ".codex-notifications-v1-snapshot.json";
pub const HOOK_SCRIPT_FILENAME: &str = "notify_event.py";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathOverrides {
    pub config: Option<PathBuf>,
    pub snapshot: Option<PathBuf>,
    pub notify_script: Option<PathBuf>,
}

/// Everything path resolution depends on, gathered up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathInputs {
    pub overrides: PathOverrides,
    /// Value of `CODEX_HOME`; empty values count as unset.
    pub config_home: Option<PathBuf>,
    pub home_dir: Option<PathBuf>,
    pub cwd: PathBuf,
    /// Directory the hook script ships in by default.
    pub install_dir: Option<PathBuf>,
}

impl PathInputs {
    /// Boundary code: queries the process environment once.
    #[must_use]
    pub fn from_env(overrides: PathOverrides) -> Self {
        let config_home = env::var_os(CONFIG_HOME_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let install_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        Self {
            overrides,
            config_home,
            home_dir: dirs::home_dir(),
            cwd: env::current_dir().unwrap_or_default(),
            install_dir,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub config: PathBuf,
    pub snapshot: PathBuf,
    pub notify_script: PathBuf,
}

impl ResolvedPaths {
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        self.config.parent().unwrap_or_else(|| Path::new("/"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("cannot resolve an absolute {what} path from '{}'", path.display())]
    NotAbsolute { what: &'static str, path: PathBuf },
    #[error("cannot determine a root directory for the {what} path")]
    NoRoot { what: &'static str },
}

/// Resolve the config, snapshot, and hook script paths.
///
/// Pure: no filesystem access. Every returned path is absolute and lexically
/// normalized.
pub fn resolve(inputs: &PathInputs) -> Result<ResolvedPaths, PathError> {
    let config = match &inputs.overrides.config {
        Some(path) => absolutize(path, inputs, "config")?,
        None => default_config_path(inputs)?,
    };

    let snapshot = match &inputs.overrides.snapshot {
        Some(path) => absolutize(path, inputs, "snapshot")?,
        None => match config.parent() {
            Some(dir) => dir.join(SNAPSHOT_FILENAME),
            None => return Err(PathError::NoRoot { what: "snapshot" }),
        },
    };

    let notify_script = match &inputs.overrides.notify_script {
        Some(path) => absolutize(path, inputs, "notify hook script")?,
        None => match &inputs.install_dir {
            Some(dir) => absolutize(&dir.join(HOOK_SCRIPT_FILENAME), inputs, "notify hook script")?,
            None => {
                return Err(PathError::NoRoot {
                    what: "notify hook script",
                });
            }
        },
    };

    Ok(ResolvedPaths {
        config,
        snapshot,
        notify_script,
    })
}

fn default_config_path(inputs: &PathInputs) -> Result<PathBuf, PathError> {
    if let Some(root) = &inputs.config_home {
        return absolutize(&root.join(CONFIG_FILENAME), inputs, "config");
    }
    match &inputs.home_dir {
        Some(home) => absolutize(
            &home.join(DEFAULT_ROOT_DIR).join(CONFIG_FILENAME),
            inputs,
            "config",
        ),
        None => Err(PathError::NoRoot { what: "config" }),
    }
}

fn absolutize(path: &Path, inputs: &PathInputs, what: &'static str) -> Result<PathBuf, PathError> {
    let expanded = expand_tilde(path, inputs.home_dir.as_deref())
        .ok_or(PathError::NoRoot { what })?;
    let joined = if expanded.is_absolute() {
        expanded
    } else if inputs.cwd.is_absolute() {
        inputs.cwd.join(expanded)
    } else {
        return Err(PathError::NotAbsolute {
            what,
            path: path.to_path_buf(),
        });
    };
    Ok(normalize_lexically(&joined))
}

/// Expand a leading `~` component. `None` if one is present but there is no
/// home directory to expand it to.
fn expand_tilde(path: &Path, home: Option<&Path>) -> Option<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => home.map(|home| {
            if rest.as_os_str().is_empty() {
                home.to_path_buf()
            } else {
                home.join(rest)
            }
        }),
        Err(_) => Some(path.to_path_buf()),
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                );
                if !at_root {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(OsString::from("."));
    }
    out
}
