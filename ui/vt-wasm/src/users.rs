use crate::api::BrowserFetcher;
use crate::collection::Collection;
use js_sys::{Function, Promise};
use std::rc::Rc;
use vt_core::{SourceConfig, users_chain};
use vt_types::User;
use wasm_bindgen::prelude::*;

/// User directory: stored cache first, then the demo API.
#[wasm_bindgen]
pub struct UsersApp {
    inner: Collection<User>,
}

#[wasm_bindgen]
impl UsersApp {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let chain = users_chain(Rc::new(BrowserFetcher), &SourceConfig::default());
        Self {
            inner: Collection::new(chain),
        }
    }

    pub fn load(&self) -> Promise {
        self.inner.load()
    }

    pub fn list(&self) -> Result<JsValue, JsValue> {
        self.inner.list()
    }

    /// `draft` is `{ firstName, lastName, email, age, image }`.
    pub fn add(&self, draft: JsValue) -> Result<JsValue, JsValue> {
        self.inner.add(draft)
    }

    #[wasm_bindgen(js_name = removeAt)]
    pub fn remove_at(&self, index: usize) -> Result<JsValue, JsValue> {
        self.inner.remove_at(index)
    }

    pub fn subscribe(&self, callback: Function) {
        self.inner.subscribe(callback);
    }
}

impl Default for UsersApp {
    fn default() -> Self {
        Self::new()
    }
}
