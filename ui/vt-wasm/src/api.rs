//! `fetch`-backed [`Fetcher`].
//!
//! Relative URLs (the bundled seed file) resolve against the page origin.

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use vt_source::Fetcher;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserFetcher;

#[async_trait(?Send)]
impl Fetcher for BrowserFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        let request =
            Request::new_with_str_and_init(url, &opts).map_err(|e| anyhow!("bad request {url}: {e:?}"))?;

        let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| anyhow!("fetch error for {url}: {e:?}"))?;
        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| anyhow!("not a Response"))?;

        if !resp.ok() {
            bail!("{} {} from {url}", resp.status(), resp.status_text());
        }

        let text = JsFuture::from(resp.text().map_err(|e| anyhow!("{e:?}"))?)
            .await
            .map_err(|e| anyhow!("text error: {e:?}"))?;
        text.as_string().ok_or_else(|| anyhow!("response body is not text"))
    }
}
