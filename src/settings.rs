//! Persisted per-module settings.
//!
//! Snapshots are JSON objects stored under a module key in a key/value store.
//! Loading merges field by field over the defaults: a stored value wins only if
//! it has the right type. A snapshot that is not a JSON object is discarded and
//! its key removed. Saving never fails the caller; errors are logged and the
//! in-memory settings stay authoritative.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::CoreError;

/// Atom colouring in structure models.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// By donor element.
    #[default]
    Donor,
    /// By formal charge class (metal / neutral / anionic).
    Charge,
}

impl ColorMode {
    pub fn cycle(self) -> Self {
        match self {
            ColorMode::Donor => ColorMode::Charge,
            ColorMode::Charge => ColorMode::Donor,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSettings {
    pub adaptive: bool,
    pub rigor_mode: bool,
    /// Scaffold visibility (atom and orbital labels).
    pub show_labels: bool,
    /// Mastery lock flag.
    pub labels_locked: bool,
    pub color_mode: ColorMode,
    pub difficulty: String,
    pub show_overlap: bool,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            adaptive: true,
            rigor_mode: false,
            show_labels: true,
            labels_locked: false,
            color_mode: ColorMode::Donor,
            difficulty: "all".into(),
            show_overlap: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
}

/// Generic string key/value store.
pub trait SettingsStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, SettingsError>;
    fn write(&self, key: &str, value: &str) -> Result<(), SettingsError>;
    fn remove(&self, key: &str) -> Result<(), SettingsError>;
}

/// One `<key>.json` file per key under a directory.
#[derive(Clone, Debug)]
pub struct FileSettingsStore {
    dir: PathBuf,
}

impl FileSettingsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory from SETTINGS_DIR, default `./.settings`.
    pub fn from_env() -> Self {
        let dir = std::env::var("SETTINGS_DIR").unwrap_or_else(|_| "./.settings".into());
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl SettingsStore for FileSettingsStore {
    fn read(&self, key: &str) -> Result<Option<String>, SettingsError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store for tests and ephemeral servers. `failing()` builds one
/// whose writes always error, as a full or disabled storage would.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    entries: Mutex<HashMap<String, String>>,
    reject_writes: bool,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            entries: Mutex::default(),
            reject_writes: true,
        }
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        if let Ok(mut map) = self.entries.lock() {
            map.insert(key.to_string(), value.to_string());
        }
        self
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, SettingsError> {
        self.entries
            .lock()
            .map_err(|e| SettingsError::Unavailable(e.to_string()))
    }
}

impl SettingsStore for MemorySettingsStore {
    fn read(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        if self.reject_writes {
            return Err(SettingsError::Unavailable("quota exceeded".into()));
        }
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Load the snapshot under `key` merged over the defaults. Never fails.
pub fn load_settings(store: &dyn SettingsStore, key: &str) -> ModuleSettings {
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return ModuleSettings::default(),
        Err(e) => {
            warn!(target: "settings", %key, error = %e, "Settings read failed; using defaults");
            return ModuleSettings::default();
        }
    };

    match parse_object(&raw) {
        Ok(stored) => merge_over_defaults(&stored),
        Err(err) => {
            warn!(target: "settings", %key, error = %err, "Discarding malformed settings");
            if let Err(e) = store.remove(key) {
                warn!(target: "settings", %key, error = %e, "Could not remove malformed settings");
            }
            ModuleSettings::default()
        }
    }
}

/// Write-through save. Returns whether the snapshot was persisted.
pub fn save_settings(store: &dyn SettingsStore, key: &str, settings: &ModuleSettings) -> bool {
    let result = serde_json::to_string(settings)
        .map_err(SettingsError::from)
        .and_then(|json| store.write(key, &json));
    match result {
        Ok(()) => {
            debug!(target: "settings", %key, "Saved settings");
            true
        }
        Err(e) => {
            warn!(target: "settings", %key, error = %e, "Settings write failed; keeping in-memory state");
            false
        }
    }
}

fn parse_object(raw: &str) -> Result<Map<String, Value>, CoreError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CoreError::MalformedSettings(format!("expected an object, got {other}"))),
        Err(e) => Err(CoreError::MalformedSettings(e.to_string())),
    }
}

/// Take each stored field only if the result still deserializes; unknown and
/// mistyped fields fall back to their defaults.
fn merge_over_defaults(stored: &Map<String, Value>) -> ModuleSettings {
    let mut merged = ModuleSettings::default();
    let Ok(Value::Object(mut current)) = serde_json::to_value(&merged) else {
        return merged;
    };
    let keys: Vec<String> = current.keys().cloned().collect();
    for field in keys {
        let Some(value) = stored.get(&field) else { continue };
        let mut candidate = current.clone();
        candidate.insert(field.clone(), value.clone());
        match serde_json::from_value::<ModuleSettings>(Value::Object(candidate.clone())) {
            Ok(next) => {
                merged = next;
                current = candidate;
            }
            Err(_) => {
                debug!(target: "settings", %field, "Ignoring mistyped settings field");
            }
        }
    }
    merged
}
