pub mod chain;
pub mod filter;
pub mod notice;
pub mod promotion;
pub mod repository;
pub mod validation;
pub mod wizard;

use std::rc::Rc;
use vt_source::{
    DEFAULT_API_BASE, DEFAULT_SCRAPE_ORIGIN, DEFAULT_SCRAPE_URL, DEFAULT_SEED_PATH, Fetcher,
    ProductApiSource, ScrapeSource, SeedSource, UserApiSource,
};
use vt_types::{Product, User};

pub use chain::{LoadOrigin, LoadReport, SourceChain};
pub use filter::ProductFilter;
pub use notice::{Notice, Notifier};
pub use promotion::{is_promotion, sort_promotion_first};
pub use repository::{Entity, Repository};
pub use validation::{FieldError, ProductDraft, UserDraft, ValidationErrors};
pub use wizard::{DownloadArtifact, Wizard, WizardError, WizardStep};

/// Where each source in the chains reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub seed_path: String,
    pub scrape_url: String,
    pub scrape_origin: String,
    pub api_base: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            seed_path: DEFAULT_SEED_PATH.to_owned(),
            scrape_url: DEFAULT_SCRAPE_URL.to_owned(),
            scrape_origin: DEFAULT_SCRAPE_ORIGIN.to_owned(),
            api_base: DEFAULT_API_BASE.to_owned(),
        }
    }
}

/// Seed, then stored cache, then the scraped catalog page, then the demo API.
pub fn products_chain<F>(fetcher: Rc<F>, config: &SourceConfig) -> SourceChain<Product>
where
    F: Fetcher + 'static,
{
    SourceChain::new(Product::STORAGE_KEY)
        .then_source(SeedSource::new(fetcher.clone(), config.seed_path.clone()))
        .then_stored()
        .then_source(ScrapeSource::new(
            fetcher.clone(),
            config.scrape_url.clone(),
            config.scrape_origin.clone(),
        ))
        .then_terminal(ProductApiSource::new(fetcher, &config.api_base))
        .with_post_process(sort_promotion_first)
}

/// Stored cache, then the demo API.
pub fn users_chain<F>(fetcher: Rc<F>, config: &SourceConfig) -> SourceChain<User>
where
    F: Fetcher + 'static,
{
    SourceChain::new(User::STORAGE_KEY)
        .then_stored()
        .then_terminal(UserApiSource::new(fetcher, &config.api_base))
}
