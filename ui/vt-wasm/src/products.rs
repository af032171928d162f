use crate::api::BrowserFetcher;
use crate::collection::{Collection, to_js};
use js_sys::{Function, Promise};
use serde::Serialize;
use std::rc::Rc;
use vt_core::{ProductFilter, SourceConfig, products_chain};
use vt_types::Product;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct FilteredProduct<'a> {
    index: usize,
    product: &'a Product,
}

/// Product catalog: seed, stored cache, scraped store page, demo API.
#[wasm_bindgen]
pub struct ProductsApp {
    inner: Collection<Product>,
}

#[wasm_bindgen]
impl ProductsApp {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let chain = products_chain(Rc::new(BrowserFetcher), &SourceConfig::default());
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

    /// `draft` is `{ title, description, price, brand, category, thumbnail }`,
    /// all strings. Throws `[{ field, message }]` when invalid.
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

    /// `[{ index, product }]`; `index` addresses the unfiltered list, so it
    /// can be passed straight to `removeAt`.
    pub fn filter(&self, search: String, min: Option<f64>, max: Option<f64>) -> Result<JsValue, JsValue> {
        let filter = ProductFilter {
            search,
            price_min: min,
            price_max: max,
        };
        self.inner.with_list(|products| {
            let matches: Vec<FilteredProduct<'_>> = filter
                .apply(products)
                .into_iter()
                .map(|(index, product)| FilteredProduct { index, product })
                .collect();
            to_js(&matches)
        })
    }
}

impl Default for ProductsApp {
    fn default() -> Self {
        Self::new()
    }
}
