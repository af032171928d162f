use crate::collection::{to_js, validation_to_js};
use crate::dom;
use crate::storage::BrowserStorage;
use vt_core::{DownloadArtifact, Wizard, WizardError, WizardStep};
use vt_types::SubmissionDraft;
use wasm_bindgen::prelude::*;

/// Form → review → confirm, with the pending draft in `sessionStorage`.
#[wasm_bindgen]
pub struct WizardApp {
    inner: Wizard<BrowserStorage, BrowserStorage>,
}

fn optional(draft: Option<SubmissionDraft>) -> Result<JsValue, JsValue> {
    match draft {
        Some(draft) => to_js(&draft),
        None => Ok(JsValue::UNDEFINED),
    }
}

#[wasm_bindgen]
impl WizardApp {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: Wizard::new(BrowserStorage::Local, BrowserStorage::Session),
        }
    }

    /// `"form"`, `"review"` or `"done"`.
    pub fn step(&self) -> String {
        match self.inner.step() {
            WizardStep::Form => "form",
            WizardStep::Review => "review",
            WizardStep::Done => "done",
        }
        .to_owned()
    }

    /// `draft` is `{ nome, sobrenome, email, idade }`. Throws
    /// `[{ field, message }]` when invalid.
    pub fn submit(&mut self, draft: JsValue) -> Result<(), JsValue> {
        let draft: SubmissionDraft = serde_wasm_bindgen::from_value(draft)?;
        self.inner.submit(&draft).map_err(|errors| validation_to_js(&errors))
    }

    pub fn review(&self) -> Result<JsValue, JsValue> {
        optional(self.inner.review())
    }

    pub fn prefill(&self) -> Result<JsValue, JsValue> {
        optional(self.inner.prefill())
    }

    /// Back to the form; returns the values to pre-fill it with.
    pub fn edit(&mut self) -> Result<JsValue, JsValue> {
        optional(self.inner.edit())
    }

    /// Persist the pending draft and download it as `data.json`.
    pub fn confirm(&mut self) -> Result<(), JsValue> {
        let DownloadArtifact { file_name, contents } = match self.inner.confirm() {
            Ok(artifact) => artifact,
            Err(err) => {
                if matches!(err, WizardError::Invalid(_)) {
                    dom::alert(&err.to_string());
                }
                return Err(JsValue::from_str(&err.to_string()));
            }
        };
        dom::download_json(&file_name, &contents)
    }
}

impl Default for WizardApp {
    fn default() -> Self {
        Self::new()
    }
}
