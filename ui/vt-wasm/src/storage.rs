//! `localStorage` / `sessionStorage` behind the [`KeyValueStore`] seam.

use anyhow::{Result, anyhow};
use vt_storage::KeyValueStore;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserStorage {
    Local,
    Session,
}

fn js_err(err: JsValue) -> anyhow::Error {
    anyhow!("storage error: {err:?}")
}

impl BrowserStorage {
    fn raw(self) -> Result<web_sys::Storage> {
        let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
        let storage = match self {
            Self::Local => window.local_storage(),
            Self::Session => window.session_storage(),
        };
        storage.map_err(js_err)?.ok_or_else(|| anyhow!("{self:?} storage unavailable"))
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.raw()?.get_item(key).map_err(js_err)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.raw()?.set_item(key, value).map_err(js_err)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.raw()?.remove_item(key).map_err(js_err)
    }
}
