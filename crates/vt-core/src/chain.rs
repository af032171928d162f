//! Ordered, short-circuiting initialization pipeline.
//!
//! Steps are tried one at a time. The first source that yields a non-empty
//! collection wins; its items go through the post-process policy and are
//! persisted. A stored record, when present, wins as-is and is neither
//! re-sorted nor re-written. The terminal source always settles: on failure it
//! raises a [`Notice`] and the chain settles on an empty collection.

use crate::notice::{Notice, Notifier};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use vt_source::{CatalogSource, SourceOutcome};
use vt_storage::{KeyValueStore, PersistedCollection};

enum Step<T> {
    Source(Box<dyn CatalogSource<T>>),
    Stored,
    Terminal(Box<dyn CatalogSource<T>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOrigin {
    /// A regular or terminal source, by name.
    Source(String),
    Stored,
    /// Every step missed and there was no terminal source.
    Exhausted,
}

#[derive(Debug)]
pub struct LoadReport<T> {
    pub items: Vec<T>,
    pub origin: LoadOrigin,
    pub persisted: bool,
}

pub struct SourceChain<T> {
    collection: PersistedCollection<T>,
    steps: Vec<Step<T>>,
    post_process: fn(Vec<T>) -> Vec<T>,
}

impl<T> SourceChain<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(key: &'static str) -> Self {
        Self {
            collection: PersistedCollection::new(key),
            steps: Vec::new(),
            post_process: |items| items,
        }
    }

    pub fn then_source(mut self, source: impl CatalogSource<T> + 'static) -> Self {
        self.steps.push(Step::Source(Box::new(source)));
        self
    }

    pub fn then_stored(mut self) -> Self {
        self.steps.push(Step::Stored);
        self
    }

    pub fn then_terminal(mut self, source: impl CatalogSource<T> + 'static) -> Self {
        self.steps.push(Step::Terminal(Box::new(source)));
        self
    }

    pub fn with_post_process(mut self, policy: fn(Vec<T>) -> Vec<T>) -> Self {
        self.post_process = policy;
        self
    }

    pub fn key(&self) -> &'static str {
        self.collection.key()
    }

    pub async fn run<S>(&self, store: &S, notifier: &dyn Notifier) -> LoadReport<T>
    where
        S: KeyValueStore + ?Sized,
    {
        let key = self.collection.key();
        for step in &self.steps {
            match step {
                Step::Source(source) => match source.fetch().await {
                    SourceOutcome::Items(items) => {
                        return self.settle(store, items, LoadOrigin::Source(source.name().to_owned()));
                    }
                    SourceOutcome::Empty => debug!(key, source = source.name(), "source had no items"),
                    SourceOutcome::Failed(err) => {
                        warn!(key, source = source.name(), error = %err, "source missed")
                    }
                },
                Step::Stored => {
                    if let Some(items) = self.collection.load(store) {
                        info!(key, count = items.len(), "using stored collection");
                        return LoadReport {
                            items,
                            origin: LoadOrigin::Stored,
                            persisted: false,
                        };
                    }
                    debug!(key, "no stored collection");
                }
                Step::Terminal(source) => {
                    let origin = LoadOrigin::Source(source.name().to_owned());
                    let items = match source.fetch().await {
                        SourceOutcome::Items(items) => items,
                        SourceOutcome::Empty => Vec::new(),
                        SourceOutcome::Failed(err) => {
                            warn!(key, source = source.name(), error = %err, "terminal source failed");
                            notifier.notify(&Notice::terminal_failure(source.name()));
                            Vec::new()
                        }
                    };
                    return self.settle(store, items, origin);
                }
            }
        }
        self.settle(store, Vec::new(), LoadOrigin::Exhausted)
    }

    fn settle<S>(&self, store: &S, items: Vec<T>, origin: LoadOrigin) -> LoadReport<T>
    where
        S: KeyValueStore + ?Sized,
    {
        let items = (self.post_process)(items);
        let persisted = self.collection.save(store, &items);
        info!(key = self.collection.key(), count = items.len(), ?origin, persisted, "collection settled");
        LoadReport {
            items,
            origin,
            persisted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SourceConfig, products_chain, users_chain};
    use std::cell::RefCell;
    use std::rc::Rc;
    use vt_source::StaticFetcher;
    use vt_storage::InMemoryStore;
    use vt_types::{PRODUCTS_KEY, Price, Product, USERS_KEY, User};

    const SEED: &str = "assets/products-seed.json";
    const PAGE: &str = "https://shop.example/all";
    const API_PRODUCTS: &str = "https://api.example/products";
    const API_USERS: &str = "https://api.example/users";

    fn config() -> SourceConfig {
        SourceConfig {
            seed_path: SEED.to_owned(),
            scrape_url: PAGE.to_owned(),
            scrape_origin: "https://shop.example".to_owned(),
            api_base: "https://api.example".to_owned(),
        }
    }

    #[derive(Default)]
    struct Recorder(RefCell<Vec<Notice>>);

    impl Notifier for Recorder {
        fn notify(&self, notice: &Notice) {
            self.0.borrow_mut().push(notice.clone());
        }
    }

    fn stored_products(store: &InMemoryStore) -> Option<Vec<Product>> {
        PersistedCollection::<Product>::new(PRODUCTS_KEY).load(store)
    }

    fn titles(items: &[Product]) -> Vec<&str> {
        items.iter().map(|p| p.title.as_str()).collect()
    }

    #[tokio::test]
    async fn seed_wins_over_cache_and_network() {
        let fetcher = Rc::new(
            StaticFetcher::new()
                .with_body(SEED, r#"[{"name":"Caro","price":250},{"name":"Barato","preco":"50"}]"#)
                .with_body(API_PRODUCTS, r#"{"products":[{"title":"api"}]}"#),
        );
        let store = InMemoryStore::new();
        PersistedCollection::<Product>::new(PRODUCTS_KEY).save(&store, &[Product::default()]);

        let report = products_chain(fetcher.clone(), &config())
            .run(&store, &Recorder::default())
            .await;

        assert_eq!(report.origin, LoadOrigin::Source("seed".into()));
        assert_eq!(titles(&report.items), vec!["Barato", "Caro"]);
        assert!(report.persisted);
        assert_eq!(stored_products(&store), Some(report.items));
        assert_eq!(fetcher.requested(), vec![SEED]);
    }

    #[tokio::test]
    async fn stored_collection_is_used_as_is() {
        let fetcher = Rc::new(StaticFetcher::new().with_body(SEED, "[]"));
        let store = InMemoryStore::new();
        let cached = vec![
            Product { title: "expensive".into(), price: Price::from(900.0), ..Product::default() },
            Product { title: "cheap".into(), price: Price::from(5.0), ..Product::default() },
        ];
        PersistedCollection::<Product>::new(PRODUCTS_KEY).save(&store, &cached);

        let report = products_chain(fetcher.clone(), &config())
            .run(&store, &Recorder::default())
            .await;

        assert_eq!(report.origin, LoadOrigin::Stored);
        assert!(!report.persisted);
        assert_eq!(titles(&report.items), vec!["expensive", "cheap"]);
        assert_eq!(fetcher.requested(), vec![SEED]);
    }

    #[tokio::test]
    async fn empty_stored_list_still_short_circuits() {
        let fetcher = Rc::new(StaticFetcher::new());
        let store = InMemoryStore::new();
        PersistedCollection::<Product>::new(PRODUCTS_KEY).save(&store, &[]);

        let report = products_chain(fetcher.clone(), &config())
            .run(&store, &Recorder::default())
            .await;

        assert_eq!(report.origin, LoadOrigin::Stored);
        assert!(report.items.is_empty());
        assert_eq!(fetcher.requested(), vec![SEED]);
    }

    #[tokio::test]
    async fn falls_through_to_scrape() {
        let page = r#"<img src="/products/a.jpg" alt="Moletom"><img src="/products/b.jpg" alt="">"#;
        let fetcher = Rc::new(StaticFetcher::new().with_body(PAGE, page));
        let store = InMemoryStore::new();

        let report = products_chain(fetcher.clone(), &config())
            .run(&store, &Recorder::default())
            .await;

        assert_eq!(report.origin, LoadOrigin::Source("scrape".into()));
        assert_eq!(titles(&report.items), vec!["Moletom", "Produto 2"]);
        assert_eq!(stored_products(&store).map(|p| p.len()), Some(2));
        assert_eq!(fetcher.requested(), vec![SEED, PAGE]);
    }

    #[tokio::test]
    async fn falls_through_to_api_and_sorts() {
        let api = r#"{"products":[{"title":"a","price":549.99},{"title":"b","price":9.99}]}"#;
        let fetcher = Rc::new(
            StaticFetcher::new()
                .with_body(PAGE, "<html></html>")
                .with_body(API_PRODUCTS, api),
        );
        let store = InMemoryStore::new();
        let notices = Recorder::default();

        let report = products_chain(fetcher.clone(), &config()).run(&store, &notices).await;

        assert_eq!(report.origin, LoadOrigin::Source("api".into()));
        assert_eq!(titles(&report.items), vec!["b", "a"]);
        assert!(notices.0.borrow().is_empty());
        assert_eq!(fetcher.requested(), vec![SEED, PAGE, API_PRODUCTS]);
    }

    #[tokio::test]
    async fn terminal_failure_notifies_and_persists_empty() {
        let fetcher = Rc::new(StaticFetcher::new());
        let store = InMemoryStore::new();
        let notices = Recorder::default();

        let report = products_chain(fetcher, &config()).run(&store, &notices).await;

        assert!(report.items.is_empty());
        assert!(report.persisted);
        assert_eq!(stored_products(&store), Some(Vec::new()));
        assert_eq!(*notices.0.borrow(), vec![Notice::terminal_failure("api")]);
    }

    #[tokio::test]
    async fn users_prefer_cache_then_api() {
        let body = r#"{"users":[{"firstName":"Emily","lastName":"Johnson","email":"e@x.com","age":28}]}"#;
        let fetcher = Rc::new(StaticFetcher::new().with_body(API_USERS, body));
        let store = InMemoryStore::new();
        let chain = users_chain(fetcher.clone(), &config());

        let first = chain.run(&store, &Recorder::default()).await;
        assert_eq!(first.origin, LoadOrigin::Source("api".into()));
        assert_eq!(first.items[0].first_name, "Emily");

        let second = chain.run(&store, &Recorder::default()).await;
        assert_eq!(second.origin, LoadOrigin::Stored);
        assert_eq!(second.items, first.items);
        assert_eq!(fetcher.requested(), vec![API_USERS]);
        assert!(PersistedCollection::<User>::new(USERS_KEY).load(&store).is_some());
    }

    #[tokio::test]
    async fn chain_without_terminal_settles_exhausted() {
        let chain = SourceChain::<Product>::new("scratch");
        let store = InMemoryStore::new();
        let report = chain.run(&store, &Recorder::default()).await;
        assert_eq!(report.origin, LoadOrigin::Exhausted);
        assert!(report.persisted);
    }
}
