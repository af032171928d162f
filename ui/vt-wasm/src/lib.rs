//! Vitrine browser frontend.
//!
//! Exposes the product catalog, the user directory and the submission wizard
//! to the page as `wasm_bindgen` classes. Rendering stays in the page; these
//! classes own loading, validation and persistence.

pub mod api;
mod collection;
pub mod dom;
pub mod products;
pub mod storage;
pub mod users;
pub mod wizard;

pub use products::ProductsApp;
pub use users::UsersApp;
pub use wizard::WizardApp;

use wasm_bindgen::prelude::*;

/// WASM entry point, run when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}
