//! Shared plumbing behind the exported `ProductsApp` / `UsersApp` classes.

use crate::dom;
use crate::storage::BrowserStorage;
use js_sys::{Function, Promise};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::rc::Rc;
use vt_core::{Entity, LoadOrigin, Notice, Repository, SourceChain, ValidationErrors};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

pub(crate) fn alert_notice(notice: &Notice) {
    gloo_console::warn!(format!("[{}] {}", notice.source, notice.message));
    dom::alert(&notice.message);
}

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

#[derive(Serialize)]
struct FieldMessage {
    field: &'static str,
    message: String,
}

/// `[{ field, message }, ...]`, thrown back to the form.
pub(crate) fn validation_to_js(errors: &ValidationErrors) -> JsValue {
    let messages: Vec<FieldMessage> = errors
        .errors()
        .iter()
        .map(|e| FieldMessage {
            field: e.field(),
            message: e.to_string(),
        })
        .collect();
    to_js(&messages).unwrap_or_else(|_| JsValue::from_str(&errors.to_string()))
}

fn origin_label(origin: &LoadOrigin) -> String {
    match origin {
        LoadOrigin::Source(name) => name.clone(),
        LoadOrigin::Stored => "stored".to_owned(),
        LoadOrigin::Exhausted => "none".to_owned(),
    }
}

pub(crate) struct Collection<T: Entity> {
    repo: Rc<RefCell<Repository<T, BrowserStorage>>>,
    chain: Rc<SourceChain<T>>,
}

impl<T> Collection<T>
where
    T: Entity + 'static,
    T::Draft: DeserializeOwned,
{
    pub(crate) fn new(chain: SourceChain<T>) -> Self {
        Self {
            repo: Rc::new(RefCell::new(Repository::new(BrowserStorage::Local))),
            chain: Rc::new(chain),
        }
    }

    /// Resolves to the name of the source that won.
    pub(crate) fn load(&self) -> Promise {
        let repo = self.repo.clone();
        let chain = self.chain.clone();
        future_to_promise(async move {
            let store = BrowserStorage::Local;
            let report = chain.run(&store, &alert_notice).await;
            repo.borrow_mut().replace(report.items);
            Ok(JsValue::from_str(&origin_label(&report.origin)))
        })
    }

    pub(crate) fn list(&self) -> Result<JsValue, JsValue> {
        to_js(self.repo.borrow().list())
    }

    pub(crate) fn with_list<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(self.repo.borrow().list())
    }

    pub(crate) fn add(&self, draft: JsValue) -> Result<JsValue, JsValue> {
        let draft: T::Draft = serde_wasm_bindgen::from_value(draft)?;
        let mut repo = self.repo.borrow_mut();
        let added = repo.add(&draft).map_err(|errors| validation_to_js(&errors))?;
        to_js(added)
    }

    /// Returns the removed item, or `undefined` when nothing was removed.
    pub(crate) fn remove_at(&self, index: usize) -> Result<JsValue, JsValue> {
        let removed = self
            .repo
            .borrow_mut()
            .remove_at(index, |item| dom::confirm(&format!("Remove \"{}\"?", item.label())));
        match removed {
            Some(item) => to_js(&item),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// `callback(list)` after every change. Calls are queued so the callback
    /// may read the collection again.
    pub(crate) fn subscribe(&self, callback: Function) {
        let callback = Rc::new(callback);
        self.repo.borrow_mut().subscribe(move |items: &[T]| {
            let snapshot = match to_js(items) {
                Ok(value) => value,
                Err(err) => {
                    gloo_console::error!("failed to serialize collection", err);
                    return;
                }
            };
            let callback = callback.clone();
            spawn_local(async move {
                if let Err(err) = callback.call1(&JsValue::NULL, &snapshot) {
                    gloo_console::error!("subscriber threw", err);
                }
            });
        });
    }
}
