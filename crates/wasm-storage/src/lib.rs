//! Persistent toggle storage
//!
//! Checkbox states are kept per toggle key so a reload restores the views and
//! series the user picked. Browsers store them as cookies or in web storage;
//! native builds and tests use the in-memory store.

use parking_lot::RwLock;
use std::collections::HashMap;

pub mod cookie;
pub mod web_storage;

pub use cookie::CookieToggleStore;
pub use web_storage::{StorageArea, WebStorageToggleStore};

/// Typed boolean storage keyed by toggle key.
///
/// `get` returns `None` when nothing usable was stored, in which case the
/// caller applies its own default.
pub trait ToggleStore {
    fn get(&self, key: &str) -> Option<bool>;
    fn set(&self, key: &str, value: bool);
}

/// Key under which a view checkbox is stored
pub fn view_toggle_key(view_key: &str) -> String {
    format!("cb{view_key}")
}

/// Key under which a series checkbox of a chart is stored
pub fn series_toggle_key(chart_id: &str, column: usize) -> String {
    format!("cb{chart_id}{column}")
}

/// Decode a stored value. Anything but `true`/`false` counts as unset.
pub fn decode_toggle(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        other => {
            log::warn!("Ignoring unexpected toggle value {other:?}");
            None
        }
    }
}

pub fn encode_toggle(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Toggle store that lives as long as the process
#[derive(Debug, Default)]
pub struct MemoryToggleStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryToggleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw values, as a browser would hold them
    pub fn with_raw<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl ToggleStore for MemoryToggleStore {
    fn get(&self, key: &str) -> Option<bool> {
        self.values.read().get(key).and_then(|raw| decode_toggle(raw))
    }

    fn set(&self, key: &str, value: bool) {
        self.values
            .write()
            .insert(key.to_string(), encode_toggle(value).to_string());
    }
}
