//! Persisted user preferences.
//!
//! SYSTEM CONTEXT
//! ==============
//! Stores the last display name and the chat panel position as a small JSON
//! file under the platform data directory, so the next session can prefill
//! the join form. A missing or unreadable file just yields defaults.

#[cfg(test)]
#[path = "prefs_test.rs"]
mod prefs_test;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const APP_DIR: &str = "deepboard";
const FILE_NAME: &str = "prefs.json";

#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("no data directory available")]
    NoDataDir,
    #[error("prefs io: {0}")]
    Io(#[from] std::io::Error),
    #[error("prefs encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Top-left corner of the floating chat panel, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Prefs {
    pub display_name: Option<String>,
    pub panel_position: Option<PanelPosition>,
}

/// A prefs file at a fixed path.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    path: PathBuf,
}

impl PrefsStore {
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store under the user's data directory (home as fallback).
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError::NoDataDir`] when neither directory is known.
    pub fn default_location() -> Result<Self, PrefsError> {
        let base = dirs::data_local_dir().or_else(dirs::home_dir).ok_or(PrefsError::NoDataDir)?;
        Ok(Self::at(base.join(APP_DIR).join(FILE_NAME)))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read prefs, falling back to defaults when absent or corrupt.
    #[must_use]
    pub fn load(&self) -> Prefs {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no prefs file");
                return Prefs::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read prefs");
                return Prefs::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "ignoring corrupt prefs");
            Prefs::default()
        })
    }

    /// Write prefs, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] on serialization or filesystem failure.
    pub fn save(&self, prefs: &Prefs) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(prefs)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Load, apply `f`, and save.
    ///
    /// # Errors
    ///
    /// See [`PrefsStore::save`].
    pub fn update(&self, f: impl FnOnce(&mut Prefs)) -> Result<Prefs, PrefsError> {
        let mut prefs = self.load();
        f(&mut prefs);
        self.save(&prefs)?;
        Ok(prefs)
    }
}
