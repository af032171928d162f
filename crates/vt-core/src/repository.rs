use crate::chain::{LoadOrigin, SourceChain};
use crate::notice::Notifier;
use crate::validation::{ProductDraft, UserDraft, ValidationErrors};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use vt_storage::{KeyValueStore, PersistedCollection};
use vt_types::{PRODUCTS_KEY, Product, USERS_KEY, User};

/// A collection member with its own storage key and user-entry form.
pub trait Entity: Serialize + DeserializeOwned + Clone {
    const STORAGE_KEY: &'static str;
    type Draft;

    fn from_draft(draft: &Self::Draft) -> Result<Self, ValidationErrors>;

    /// Short human label, used in confirmation prompts.
    fn label(&self) -> String;
}

impl Entity for Product {
    const STORAGE_KEY: &'static str = PRODUCTS_KEY;
    type Draft = ProductDraft;

    fn from_draft(draft: &ProductDraft) -> Result<Self, ValidationErrors> {
        draft.validate()
    }

    fn label(&self) -> String {
        if self.title.is_empty() {
            "item".to_owned()
        } else {
            self.title.clone()
        }
    }
}

impl Entity for User {
    const STORAGE_KEY: &'static str = USERS_KEY;
    type Draft = UserDraft;

    fn from_draft(draft: &UserDraft) -> Result<Self, ValidationErrors> {
        draft.validate()
    }

    fn label(&self) -> String {
        self.full_name()
    }
}

type Observer<T> = Box<dyn Fn(&[T])>;

/// Owns the active collection; every mutation rewrites the whole record.
pub struct Repository<T: Entity, S> {
    store: S,
    collection: PersistedCollection<T>,
    items: Vec<T>,
    observers: Vec<Observer<T>>,
}

impl<T, S> Repository<T, S>
where
    T: Entity,
    S: KeyValueStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            collection: PersistedCollection::new(T::STORAGE_KEY),
            items: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn list(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn subscribe(&mut self, observer: impl Fn(&[T]) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Run the chain against this repository's store and adopt its result.
    pub async fn load(&mut self, chain: &SourceChain<T>, notifier: &dyn Notifier) -> LoadOrigin {
        let report = chain.run(&self.store, notifier).await;
        self.replace(report.items);
        report.origin
    }

    /// Adopt an already-settled collection without writing it back.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.notify();
    }

    /// Validate `draft` and insert the result at the front.
    pub fn add(&mut self, draft: &T::Draft) -> Result<&T, ValidationErrors> {
        let item = T::from_draft(draft)?;
        info!(key = T::STORAGE_KEY, label = %item.label(), "adding item");
        self.items.insert(0, item);
        self.persist();
        self.notify();
        Ok(&self.items[0])
    }

    /// Remove the item at `index` if `confirm` approves it.
    ///
    /// Out-of-range indices and declined confirmations leave everything as is.
    pub fn remove_at(&mut self, index: usize, confirm: impl FnOnce(&T) -> bool) -> Option<T> {
        let Some(target) = self.items.get(index) else {
            debug!(key = T::STORAGE_KEY, index, "remove index out of range");
            return None;
        };
        if !confirm(target) {
            return None;
        }
        let removed = self.items.remove(index);
        info!(key = T::STORAGE_KEY, index, label = %removed.label(), "removed item");
        self.persist();
        self.notify();
        Some(removed)
    }

    fn persist(&self) {
        self.collection.save(&self.store, &self.items);
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer(&self.items);
        }
    }
}
