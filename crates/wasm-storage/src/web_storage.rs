use crate::{decode_toggle, encode_toggle, ToggleStore};
use wasm_bindgen::prelude::*;

/// Which web storage area toggles are written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Local,
    Session,
}

/// Toggle storage backed by LocalStorage or SessionStorage
#[derive(Debug, Clone, Copy)]
pub struct WebStorageToggleStore {
    area: StorageArea,
}

impl WebStorageToggleStore {
    pub fn new(area: StorageArea) -> Self {
        Self { area }
    }

    pub fn local() -> Self {
        Self::new(StorageArea::Local)
    }

    pub fn session() -> Self {
        Self::new(StorageArea::Session)
    }

    fn storage(&self) -> Result<web_sys::Storage, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;

        let (storage, name) = match self.area {
            StorageArea::Local => (window.local_storage(), "LocalStorage"),
            StorageArea::Session => (window.session_storage(), "SessionStorage"),
        };
        storage
            .map_err(|_| JsValue::from_str(&format!("{name} not available")))?
            .ok_or_else(|| JsValue::from_str(&format!("{name} not supported")))
    }
}

impl ToggleStore for WebStorageToggleStore {
    fn get(&self, key: &str) -> Option<bool> {
        match self.storage().and_then(|s| s.get_item(key)) {
            Ok(raw) => raw.as_deref().and_then(decode_toggle),
            Err(e) => {
                log::warn!("Reading toggle {key} from {:?} storage failed: {e:?}", self.area);
                None
            }
        }
    }

    fn set(&self, key: &str, value: bool) {
        let result = self
            .storage()
            .and_then(|s| s.set_item(key, encode_toggle(value)));
        if let Err(e) = result {
            log::warn!("Persisting toggle {key} to {:?} storage failed: {e:?}", self.area);
        }
    }
}
