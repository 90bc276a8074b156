//! Cookie backed toggle storage, compatible with cookies written by
//! earlier versions of the dashboard

use crate::{decode_toggle, encode_toggle, ToggleStore};
use wasm_bindgen::prelude::*;
use web_sys::HtmlDocument;

/// Stores each toggle as its own cookie
#[derive(Debug, Clone, Default)]
pub struct CookieToggleStore {
    path: Option<String>,
    max_age_secs: Option<u64>,
}

impl CookieToggleStore {
    /// Session cookies scoped to the current path
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_max_age(mut self, secs: u64) -> Self {
        self.max_age_secs = Some(secs);
        self
    }

    fn document() -> Result<HtmlDocument, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object"))?;
        document
            .dyn_into::<HtmlDocument>()
            .map_err(|_| JsValue::from_str("Document is not an HTML document"))
    }

    fn read(&self, key: &str) -> Result<Option<String>, JsValue> {
        let cookies = Self::document()?.cookie()?;
        Ok(find_cookie(&cookies, key, |name| {
            js_sys::decode_uri_component(name)
                .map(Into::into)
                .unwrap_or_else(|_| name.to_string())
        }))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), JsValue> {
        let name: String = js_sys::encode_uri_component(key).into();
        Self::document()?.set_cookie(&self.cookie_string(&name, value))
    }

    /// The `document.cookie` assignment for an already encoded name
    fn cookie_string(&self, name: &str, value: &str) -> String {
        let mut cookie = format!("{name}={value}");
        if let Some(path) = &self.path {
            cookie.push_str(&format!("; path={path}"));
        }
        if let Some(max_age) = self.max_age_secs {
            cookie.push_str(&format!("; max-age={max_age}"));
        }
        cookie
    }
}

/// Find a cookie's value in a `document.cookie` string. Names are compared
/// after `decode`; entries without `=` are skipped.
fn find_cookie(cookies: &str, key: &str, decode: impl Fn(&str) -> String) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (decode(name) == key).then(|| value.to_string())
    })
}

impl ToggleStore for CookieToggleStore {
    fn get(&self, key: &str) -> Option<bool> {
        match self.read(key) {
            Ok(raw) => raw.as_deref().and_then(decode_toggle),
            Err(e) => {
                log::warn!("Reading cookie {key} failed: {e:?}");
                None
            }
        }
    }

    fn set(&self, key: &str, value: bool) {
        if let Err(e) = self.write(key, encode_toggle(value)) {
            log::warn!("Writing cookie {key} failed: {e:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(cookies: &str, key: &str) -> Option<String> {
        find_cookie(cookies, key, str::to_string)
    }

    #[test]
    fn test_find_cookie_in_document_string() {
        let cookies = "JSESSIONID=1A2B; cbjvm=false;cbmemory2=true";

        assert_eq!(find(cookies, "JSESSIONID").as_deref(), Some("1A2B"));
        assert_eq!(find(cookies, "cbjvm").as_deref(), Some("false"));
        assert_eq!(find(cookies, "cbmemory2").as_deref(), Some("true"));
        assert_eq!(find(cookies, "cbos"), None);
        assert_eq!(find("", "cbjvm"), None);
    }

    #[test]
    fn test_find_cookie_edge_entries() {
        // the first '=' splits, entries without one are skipped
        let cookies = "flag; token=a=b; cbjvm=";
        assert_eq!(find(cookies, "flag"), None);
        assert_eq!(find(cookies, "token").as_deref(), Some("a=b"));
        assert_eq!(find(cookies, "cbjvm").as_deref(), Some(""));

        // only whole names match
        assert_eq!(find("cbmemory12=true", "cbmemory1"), None);
    }

    #[test]
    fn test_find_cookie_decodes_names() {
        let decode = |name: &str| name.replace("%20", " ");
        assert_eq!(
            find_cookie("cb%20os=true", "cb os", decode).as_deref(),
            Some("true")
        );
    }

    #[test]
    fn test_cookie_attributes() {
        assert_eq!(CookieToggleStore::new().cookie_string("cbjvm", "true"), "cbjvm=true");

        let store = CookieToggleStore::new()
            .with_path("/carbon")
            .with_max_age(86400);
        assert_eq!(
            store.cookie_string("cbjvm", "false"),
            "cbjvm=false; path=/carbon; max-age=86400"
        );
    }
}
