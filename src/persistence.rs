//! Session persistence: the `SessionStore` boundary and a JSON file implementation.
//!
//! A failed load is reported as "no saved session" and never touches the
//! in-memory state.

use crate::models::Tournament;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Envelope version written by this crate.
pub const FORMAT_VERSION: u32 = 2;

/// Errors that can occur while saving or clearing a session.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "Session storage I/O failed: {}", e),
            StoreError::Serialize(e) => write!(f, "Failed to serialize session: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Serialize(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialize(e)
    }
}

/// Where a session lives between runs.
pub trait SessionStore {
    fn save(&self, state: &Tournament) -> Result<(), StoreError>;
    /// The saved session, or `None` if absent or unreadable.
    fn load(&self) -> Option<Tournament>;
    fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Serialize, Deserialize)]
struct SavedSession {
    format_version: u32,
    saved_at: DateTime<Utc>,
    tournament: Tournament,
}

/// Accepts the current envelope and bare states from older saves.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSession {
    Envelope(SavedSession),
    Bare(Tournament),
}

fn encode(state: &Tournament) -> Result<String, StoreError> {
    let saved = SavedSession {
        format_version: FORMAT_VERSION,
        saved_at: Utc::now(),
        tournament: state.clone(),
    };
    Ok(serde_json::to_string_pretty(&saved)?)
}

fn decode(json: &str) -> Option<Tournament> {
    match serde_json::from_str::<StoredSession>(json) {
        Ok(StoredSession::Envelope(saved)) => {
            log::debug!(
                "Loaded session saved at {} (format {})",
                saved.saved_at,
                saved.format_version
            );
            Some(saved.tournament)
        }
        Ok(StoredSession::Bare(tournament)) => {
            log::info!("Loaded session from a pre-envelope save");
            Some(tournament)
        }
        Err(e) => {
            log::warn!("Ignoring unreadable saved session: {}", e);
            None
        }
    }
}

/// Stores the session as pretty JSON in one file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonFileStore {
    /// Writes to a sibling temp file first so a crash never leaves a half-written session.
    fn save(&self, state: &Tournament) -> Result<(), StoreError> {
        let json = encode(state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Option<Tournament> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => decode(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Failed to read {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Keeps the encoded session in memory (tests, embedding).
#[derive(Debug, Default)]
pub struct MemoryStore {
    json: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw JSON as if another version of the app had written it.
    pub fn with_raw(json: impl Into<String>) -> Self {
        Self {
            json: Mutex::new(Some(json.into())),
        }
    }
}

impl SessionStore for MemoryStore {
    fn save(&self, state: &Tournament) -> Result<(), StoreError> {
        let json = encode(state)?;
        if let Ok(mut slot) = self.json.lock() {
            *slot = Some(json);
        }
        Ok(())
    }

    fn load(&self) -> Option<Tournament> {
        let slot = self.json.lock().ok()?;
        slot.as_deref().and_then(decode)
    }

    fn clear(&self) -> Result<(), StoreError> {
        if let Ok(mut slot) = self.json.lock() {
            *slot = None;
        }
        Ok(())
    }
}
