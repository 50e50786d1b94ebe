//! Persistent settings collaborators.
//!
//! The runtime consumes settings as a plain `get`/`set` capability pair;
//! where and how values persist is the implementation's concern.
//! `JsonSettings` is the bundled file-backed implementation with dot-notation
//! nested keys ("ui.theme"); `MemorySettings` backs hosts and tests that
//! need no persistence.

use crate::types::Result;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// `get(key, default)` / `set(key, value)` capability pair.
pub trait SettingsStore: Send + Sync + fmt::Debug {
    /// Fetch a value, falling back to `default` when the key is absent.
    fn get(&self, key: &str, default: Value) -> Value;

    /// Store a value. Whether this persists immediately is up to the
    /// implementation; `JsonSettings` persists on explicit `save()`.
    fn set(&self, key: &str, value: Value);
}

// =============================================================================
// JSON-file-backed settings
// =============================================================================

/// User-level settings with JSON persistence and dot-notation keys.
#[derive(Debug)]
pub struct JsonSettings {
    path: PathBuf,
    data: RwLock<Map<String, Value>>,
}

impl JsonSettings {
    /// Open settings stored at `path`, loading existing content if present.
    ///
    /// A missing file yields empty settings; an unreadable or malformed file
    /// is logged and treated as empty rather than failing construction.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match Self::load_file(&path) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "could not load settings, starting empty");
                Map::new()
            }
        };
        Self {
            path,
            data: RwLock::new(data),
        }
    }

    fn load_file(path: &Path) -> Result<Map<String, Value>> {
        if !path.exists() {
            return Ok(Map::new());
        }
        let text = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&text)?;
        Ok(value.as_object().cloned().unwrap_or_default())
    }

    /// Persist current settings to disk, creating parent directories.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        let text = serde_json::to_string_pretty(&Value::Object(data.clone()))?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    /// Re-read settings from disk, discarding unsaved changes.
    pub fn reload(&self) -> Result<()> {
        let fresh = Self::load_file(&self.path)?;
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        Ok(())
    }
}

/// Walk a dot-notation key down a JSON object tree.
fn get_nested<'a>(root: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let mut segments = key.split('.');
    let first = segments.next()?;
    let mut current = root.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Insert at a dot-notation key, materializing (or clobbering non-object)
/// intermediate levels.
fn set_nested(root: &mut Map<String, Value>, key: &str, value: Value) {
    let mut segments: Vec<&str> = key.split('.').collect();
    let last = match segments.pop() {
        Some(last) => last,
        None => return,
    };

    let mut current = root;
    for segment in segments {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        // Safe: just ensured the slot holds an object.
        current = match slot.as_object_mut() {
            Some(map) => map,
            None => return,
        };
    }
    current.insert(last.to_string(), value);
}

impl SettingsStore for JsonSettings {
    fn get(&self, key: &str, default: Value) -> Value {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        get_nested(&data, key).cloned().unwrap_or(default)
    }

    fn set(&self, key: &str, value: Value) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        set_nested(&mut data, key, value);
    }
}

// =============================================================================
// In-memory settings
// =============================================================================

/// Non-persistent settings store for headless hosts and tests.
#[derive(Debug, Default)]
pub struct MemorySettings {
    data: RwLock<Map<String, Value>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str, default: Value) -> Value {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        get_nested(&data, key).cloned().unwrap_or(default)
    }

    fn set(&self, key: &str, value: Value) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        set_nested(&mut data, key, value);
    }
}
