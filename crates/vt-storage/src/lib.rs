use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use tracing::warn;

/// String-keyed, string-valued durable store (the shape of browser `Storage`).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Store that never holds anything; every read is a miss.
#[derive(Default)]
pub struct NoopStore;

impl KeyValueStore for NoopStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create store directory: {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            bail!("invalid storage key: {key:?}");
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to remove {}", path.display())),
        }
    }
}

#[cfg(feature = "rocksdb")]
pub struct RocksDbStore {
    db: Arc<rocksdb::DB>,
}

#[cfg(feature = "rocksdb")]
impl RocksDbStore {
    pub fn open_default(path: &str) -> Result<Self> {
        let mut options = rocksdb::Options::default();
        options.create_if_missing(true);
        let db = rocksdb::DB::open(&options, path)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn key_for(key: &str) -> String {
        format!("vitrine:{key}")
    }
}

#[cfg(feature = "rocksdb")]
impl KeyValueStore for RocksDbStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.db.get(Self::key_for(key).as_bytes())?;
        match value {
            Some(raw) => Ok(Some(String::from_utf8(raw).context("stored value is not UTF-8")?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db.put(Self::key_for(key).as_bytes(), value.as_bytes())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db.delete(Self::key_for(key).as_bytes())?;
        Ok(())
    }
}

// ── JSON records ──

/// Serialize `value` under `key`. Failures are logged and reported as `false`.
pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> bool
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(key, error = %err, "failed to serialize record");
            return false;
        }
    };
    match store.set(key, &raw) {
        Ok(()) => true,
        Err(err) => {
            warn!(key, error = %err, "failed to persist record");
            false
        }
    }
}

/// Read and deserialize the record under `key`.
///
/// Absent, blank, unreadable or corrupt records all come back as `None`.
pub fn load_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) if !raw.is_empty() => raw,
        Ok(_) => return None,
        Err(err) => {
            warn!(key, error = %err, "failed to read record");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "discarding corrupt record");
            None
        }
    }
}

/// An ordered JSON array of `T` stored under a fixed key, rewritten whole on save.
#[derive(Debug, Clone, Copy)]
pub struct PersistedCollection<T> {
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PersistedCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn load<S: KeyValueStore + ?Sized>(&self, store: &S) -> Option<Vec<T>> {
        load_json(store, self.key)
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S, items: &[T]) -> bool {
        save_json(store, self.key, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
        qty: u32,
    }

    fn items() -> Vec<Item> {
        vec![
            Item { name: "b".into(), qty: 2 },
            Item { name: "a".into(), qty: 1 },
        ]
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            bail!("storage disabled")
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            bail!("quota exceeded")
        }

        fn remove(&self, _key: &str) -> Result<()> {
            bail!("storage disabled")
        }
    }

    #[test]
    fn collection_roundtrip_preserves_order() {
        let store = InMemoryStore::new();
        let collection = PersistedCollection::<Item>::new("items");
        assert!(collection.save(&store, &items()));
        assert_eq!(collection.load(&store), Some(items()));
    }

    #[test]
    fn corrupt_or_blank_record_is_a_miss() {
        let store = InMemoryStore::new();
        let collection = PersistedCollection::<Item>::new("items");
        store.set("items", "{not json").unwrap();
        assert_eq!(collection.load(&store), None);
        store.set("items", "").unwrap();
        assert_eq!(collection.load(&store), None);
    }

    #[test]
    fn empty_array_is_present() {
        let store = InMemoryStore::new();
        let collection = PersistedCollection::<Item>::new("items");
        collection.save(&store, &[]);
        assert_eq!(collection.load(&store), Some(Vec::new()));
    }

    #[test]
    fn storage_errors_are_swallowed() {
        let collection = PersistedCollection::<Item>::new("items");
        assert!(!collection.save(&BrokenStore, &items()));
        assert_eq!(collection.load(&BrokenStore), None);
    }

    #[test]
    fn file_store_roundtrip_and_remove() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path().join("data"))?;
        assert_eq!(store.get("products")?, None);

        store.set("products", "[1,2]")?;
        assert_eq!(store.get("products")?.as_deref(), Some("[1,2]"));

        let reopened = FileStore::open(dir.path().join("data"))?;
        assert_eq!(reopened.get("products")?.as_deref(), Some("[1,2]"));

        reopened.remove("products")?;
        reopened.remove("products")?;
        assert_eq!(reopened.get("products")?, None);
        Ok(())
    }

    #[test]
    fn file_store_rejects_path_like_keys() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path())?;
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
        Ok(())
    }

    #[cfg(feature = "rocksdb")]
    #[test]
    fn rocksdb_store_roundtrip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("db");
        let store = RocksDbStore::open_default(path.to_str().unwrap_or("db"))?;
        let collection = PersistedCollection::<Item>::new("items");
        assert!(collection.save(&store, &items()));
        assert_eq!(collection.load(&store), Some(items()));
        Ok(())
    }
}
