//! Catalog data sources.
//!
//! A [`CatalogSource`] produces a [`SourceOutcome`]; the transport underneath is
//! the [`Fetcher`] seam, implemented over `reqwest` natively and `fetch` in the
//! browser.

pub mod api;
pub mod scrape;
pub mod seed;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::HashMap;

pub use api::{ProductApiSource, UserApiSource};
pub use scrape::{Candidate, MAX_SCRAPED_ITEMS, ScrapeSource, extract_candidates};
pub use seed::SeedSource;

pub const DEFAULT_API_BASE: &str = "https://dummyjson.com";
pub const DEFAULT_SCRAPE_URL: &str = "https://sufgang.com.br/collections/all";
pub const DEFAULT_SCRAPE_ORIGIN: &str = "https://sufgang.com.br";
pub const DEFAULT_SEED_PATH: &str = "assets/products-seed.json";

/// Fetches a document as text. Non-success statuses are errors.
#[async_trait(?Send)]
pub trait Fetcher {
    async fn get_text(&self, url: &str) -> Result<String>;
}

#[async_trait(?Send)]
impl<F: Fetcher + ?Sized> Fetcher for &F {
    async fn get_text(&self, url: &str) -> Result<String> {
        (**self).get_text(url).await
    }
}

#[async_trait(?Send)]
impl<F: Fetcher + ?Sized> Fetcher for std::rc::Rc<F> {
    async fn get_text(&self, url: &str) -> Result<String> {
        (**self).get_text(url).await
    }
}

/// Canned responses keyed by URL; unknown URLs fail like an unreachable host.
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, std::result::Result<String, String>>,
    requested: RefCell<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_owned(), Ok(body.to_owned()));
        self
    }

    pub fn with_failure(mut self, url: &str, reason: &str) -> Self {
        self.responses.insert(url.to_owned(), Err(reason.to_owned()));
        self
    }

    /// URLs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Fetcher for StaticFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.requested.borrow_mut().push(url.to_owned());
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(reason)) => Err(anyhow!("{reason}")),
            None => Err(anyhow!("no route to {url}")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected document shape: {0}")]
    Parse(String),
}

/// Result of asking one source for data.
#[derive(Debug)]
pub enum SourceOutcome<T> {
    /// Non-empty collection.
    Items(Vec<T>),
    /// The source answered but had nothing usable.
    Empty,
    Failed(SourceError),
}

impl<T> SourceOutcome<T> {
    /// Wraps a collection, folding an empty one into [`SourceOutcome::Empty`].
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Items(items)
        }
    }

    pub fn is_items(&self) -> bool {
        matches!(self, Self::Items(_))
    }
}

#[async_trait(?Send)]
pub trait CatalogSource<T> {
    fn name(&self) -> &str;
    async fn fetch(&self) -> SourceOutcome<T>;
}
