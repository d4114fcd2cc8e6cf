//! Key/value preference storage
//!
//! Reads never fail: a missing key or an unreadable value yields the
//! caller's default. Write failures are logged and dropped.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::Result;

pub trait Storage {
    fn get_value(&self, key: &str) -> Option<Value>;

    fn set_value(&mut self, key: &str, value: Value);

    fn remove(&mut self, key: &str);

    /// Typed read; `default` when absent or not decodable as `T`
    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.get_value(key) else {
            return default;
        };
        match serde_json::from_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Stored value has an unexpected shape, using default");
                default
            }
        }
    }

    fn set<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => self.set_value(key, value),
            Err(e) => warn!(key, error = %e, "Failed to encode value for storage"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, Value>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// A JSON object on disk, rewritten after every change
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStorage {
    /// Open `path`; a missing or corrupt file starts empty
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read preferences, starting empty");
                Map::new()
            }
        };
        Self { path, values }
    }

    fn read(path: &Path) -> Result<Map<String, Value>> {
        if !path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;
        debug!(path = %self.path.display(), "Preferences written");
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.flush() {
            warn!(path = %self.path.display(), error = %e, "Failed to write preferences");
        }
    }
}

impl Storage for JsonFileStorage {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.persist();
        }
    }
}
