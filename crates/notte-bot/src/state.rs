//! Small persistent key/value state, such as the news watermark.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use notte_news::Watermark;

use crate::error::{BotError, BotResult};

/// Key of the stored news watermark.
pub const WATERMARK_KEY: &str = "news_watermark";

/// Persistent bot state.
pub trait ConfigStore: Send + Sync {
    /// The value stored under `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`.
    fn set(&self, key: &str, value: Value) -> BotResult<()>;
}

/// State kept in one JSON object file. Every `set` rewrites the file and
/// only takes effect once the write succeeds. Writes are serialized.
#[derive(Debug)]
pub struct JsonConfigStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl JsonConfigStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: &Path) -> BotResult<Self> {
        let values = match fs::read_to_string(path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| BotError::State {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No state file yet");
                Map::new()
            }
            Err(source) => {
                return Err(BotError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            values: Mutex::new(values),
        })
    }
}

impl ConfigStore for JsonConfigStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> BotResult<()> {
        let mut values = self.values.lock();
        let mut updated = values.clone();
        updated.insert(key.to_string(), value);
        let text = serde_json::to_string_pretty(&updated).map_err(|source| BotError::State {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(|source| BotError::Io {
            path: self.path.clone(),
            source,
        })?;
        *values = updated;
        Ok(())
    }
}

/// The stored news watermark. An unreadable value counts as none.
pub fn load_watermark(store: &dyn ConfigStore) -> Option<Watermark> {
    let value = store.get(WATERMARK_KEY)?;
    match serde_json::from_value(value) {
        Ok(watermark) => Some(watermark),
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable news watermark");
            None
        }
    }
}

/// Store the news watermark.
pub fn save_watermark(store: &dyn ConfigStore, watermark: Watermark) -> BotResult<()> {
    let value = serde_json::to_value(watermark).map_err(|source| BotError::State {
        path: PathBuf::from(WATERMARK_KEY),
        source,
    })?;
    store.set(WATERMARK_KEY, value)
}
