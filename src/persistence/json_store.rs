//! JSON file implementation of the persistence gateway.
//!
//! The document is a pretty-printed array of events, each tagged with its
//! `"type"` discriminator. Writes are whole-file and not atomic; reads are
//! whole-file. No locking is done: one writer per path is assumed.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::Event;
use crate::error::CatalogError;

/// Snapshot file bound to one path.
#[derive(Debug, Clone)]
pub struct JsonEventStore {
    path: PathBuf,
}

impl JsonEventStore {
    /// Creates a store for the given file path. Nothing is touched on disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the file with `events`.
    ///
    /// # Errors
    ///
    /// See [`save_events`].
    pub fn save(&self, events: &[Event]) -> Result<(), CatalogError> {
        save_events(events, &self.path)
    }

    /// Reads the file, failing on I/O or format errors.
    ///
    /// # Errors
    ///
    /// See [`try_load_events`].
    pub fn try_load(&self) -> Result<Vec<Event>, CatalogError> {
        try_load_events(&self.path)
    }

    /// Reads the file, degrading to an empty list on any error.
    #[must_use]
    pub fn load(&self) -> Vec<Event> {
        load_events(&self.path)
    }
}

/// Writes `events` to `path` as a pretty-printed JSON array, replacing any
/// previous content.
///
/// # Errors
///
/// Returns [`CatalogError::MalformedDocument`] if serialization fails and
/// [`CatalogError::Io`] if the file cannot be written. A failed write may
/// leave a truncated file behind.
pub fn save_events(events: &[Event], path: &Path) -> Result<(), CatalogError> {
    let json = serde_json::to_string_pretty(events).map_err(|source| {
        CatalogError::MalformedDocument {
            path: path.to_path_buf(),
            source,
        }
    })?;
    std::fs::write(path, json).map_err(|source| {
        tracing::error!(path = %path.display(), error = %source, "error saving events");
        CatalogError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::info!(path = %path.display(), count = events.len(), "events saved");
    Ok(())
}

/// Reads events from `path`.
///
/// A missing or zero-length file is the "no prior state" case and yields an
/// empty list.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] if the file exists but cannot be read, and
/// [`CatalogError::MalformedDocument`] if its content is not a valid event
/// array (including unknown `"type"` discriminators).
pub fn try_load_events(path: &Path) -> Result<Vec<Event>, CatalogError> {
    let io_err = |source: std::io::Error| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    };
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "file not found, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(io_err(e)),
    };
    if metadata.len() == 0 {
        tracing::info!(path = %path.display(), "file empty, starting empty");
        return Ok(Vec::new());
    }

    let raw = std::fs::read_to_string(path).map_err(io_err)?;
    let events: Vec<Event> =
        serde_json::from_str(&raw).map_err(|source| CatalogError::MalformedDocument {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), count = events.len(), "events loaded");
    Ok(events)
}

/// Reads events from `path`, reporting any failure and returning an empty
/// list instead of partial data.
#[must_use]
pub fn load_events(path: &Path) -> Vec<Event> {
    match try_load_events(path) {
        Ok(events) => events,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "error loading events");
            Vec::new()
        }
    }
}
