//! Loading and saving the user's config document.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use notifications_utils::atomic_write;
use tempfile::Builder;
use thiserror::Error;
use toml_edit::{DocumentMut, Table, TomlError};
use tracing::debug;

const WRITE_CHECK_PREFIX: &str = ".codexnotifications-write-check-";

/// An editable, format-preserving TOML document.
///
/// Mutations happen in place on the parsed tree, so entries nobody touches
/// render exactly as they were read. A file that did not end with a newline
/// is rendered without one.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    doc: DocumentMut,
    final_newline: bool,
}

impl ConfigDocument {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            doc: DocumentMut::new(),
            final_newline: true,
        }
    }

    /// Parse document text. Whitespace-only text is an empty document.
    pub fn parse(text: &str) -> Result<Self, TomlError> {
        if text.trim().is_empty() {
            return Ok(Self::empty());
        }
        let doc = text.parse::<DocumentMut>()?;
        Ok(Self {
            doc,
            final_newline: text.ends_with('\n'),
        })
    }

    #[must_use]
    pub fn render(&self) -> String {
        let text = self.doc.to_string();
        if self.final_newline {
            return text;
        }
        match text.strip_suffix('\n') {
            Some(trimmed) => trimmed.to_string(),
            None => text,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Table {
        self.doc.as_table()
    }

    pub fn root_mut(&mut self) -> &mut Table {
        self.doc.as_table_mut()
    }
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Cannot create config directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Config directory '{}' is not writable: {source}", path.display())]
    NotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse config TOML '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: TomlError,
    },
    #[error("Cannot write config '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DocumentError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            DocumentError::CreateDir { path, .. }
            | DocumentError::NotWritable { path, .. }
            | DocumentError::Read { path, .. }
            | DocumentError::Parse { path, .. }
            | DocumentError::Write { path, .. } => path,
        }
    }

    /// The underlying filesystem error, if this failure came from one.
    #[must_use]
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            DocumentError::CreateDir { source, .. }
            | DocumentError::NotWritable { source, .. }
            | DocumentError::Read { source, .. }
            | DocumentError::Write { source, .. } => Some(source),
            DocumentError::Parse { .. } => None,
        }
    }
}

/// Reads and writes one config file.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Create the config directory if needed and prove it is writable.
    ///
    /// The check writes a temp file that is removed again before returning.
    pub fn prepare_directory(&self) -> Result<(), DocumentError> {
        let dir = self.directory();
        fs::create_dir_all(dir).map_err(|source| DocumentError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let scratch = Builder::new()
            .prefix(WRITE_CHECK_PREFIX)
            .tempfile_in(dir)
            .map_err(|source| DocumentError::NotWritable {
                path: dir.to_path_buf(),
                source,
            })?;
        if let Err(e) = scratch.close() {
            debug!(dir = %dir.display(), "Failed to remove write check file: {e}");
        }
        Ok(())
    }

    /// Load the document. A missing file is an empty document.
    pub fn load(&self) -> Result<ConfigDocument, DocumentError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Config file missing; starting empty");
                return Ok(ConfigDocument::empty());
            }
            Err(source) => {
                return Err(DocumentError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        ConfigDocument::parse(&text).map_err(|source| DocumentError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, document: &ConfigDocument) -> Result<(), DocumentError> {
        atomic_write(&self.path, document.render().as_bytes()).map_err(|source| {
            DocumentError::Write {
                path: self.path.clone(),
                source,
            }
        })
    }
}
