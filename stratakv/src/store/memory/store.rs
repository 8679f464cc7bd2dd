use crate::errors::{ErrorKind, StrataError, StrataResult};
use crate::store::{KeyIterator, KeyValueStoreProvider, ReadStream};
use dashmap::DashMap;
use std::io::Cursor;
use std::sync::Arc;

/// In-memory implementation of the key-value store contract.
///
/// # Purpose
/// `InMemoryStore` keeps all data in a concurrent map, making it suitable
/// for testing, caching, and temporary data. All data is lost when the
/// store is dropped.
///
/// # Characteristics
/// - **Thread-Safe**: fully concurrent via a sharded map
/// - **No Persistence**: nothing survives the process
/// - **Permissive Keys**: any non-empty key is accepted; nothing maps keys
///   to files or wire names here, so there is no character restriction
/// - **Copy Capability**: advertises `copy` by overriding it
///
/// # Usage
/// ```text
/// let store = KeyValueStore::new(InMemoryStore::new());
/// store.put("key1", b"value1")?;
/// assert_eq!(store.get("key1")?, b"value1");
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> InMemoryStore {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner::new()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.inner.data.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }
}

#[derive(Default)]
struct InMemoryStoreInner {
    data: DashMap<String, Vec<u8>>,
}

impl InMemoryStoreInner {
    fn new() -> InMemoryStoreInner {
        InMemoryStoreInner { data: DashMap::new() }
    }

    fn check_key(&self, key: &str) -> StrataResult<()> {
        if key.is_empty() {
            return Err(StrataError::new("Key must not be empty", ErrorKind::InvalidKey));
        }
        Ok(())
    }

    fn lookup(&self, key: &str) -> StrataResult<Vec<u8>> {
        self.check_key(key)?;
        self.data
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StrataError::new(&format!("Key '{}' not found", key), ErrorKind::NotFound))
    }
}

impl KeyValueStoreProvider for InMemoryStore {
    fn get(&self, key: &str) -> StrataResult<Vec<u8>> {
        self.inner.lookup(key)
    }

    fn put(&self, key: &str, data: &[u8]) -> StrataResult<String> {
        self.inner.check_key(key)?;
        self.inner.data.insert(key.to_string(), data.to_vec());
        Ok(key.to_string())
    }

    fn open(&self, key: &str) -> StrataResult<Box<dyn ReadStream>> {
        let data = self.inner.lookup(key)?;
        Ok(Box::new(Cursor::new(data)))
    }

    fn delete(&self, key: &str) -> StrataResult<()> {
        self.inner.check_key(key)?;
        self.inner.data.remove(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> StrataResult<bool> {
        self.inner.check_key(key)?;
        Ok(self.inner.data.contains_key(key))
    }

    fn iter_keys(&self, prefix: &str) -> StrataResult<KeyIterator> {
        // point-in-time snapshot of matching keys; a fresh call may observe
        // different data
        let keys = self
            .inner
            .data
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|key| key.starts_with(prefix))
            .collect();
        Ok(KeyIterator::from_keys(keys))
    }

    fn copy(&self, source: &str, dest: &str) -> StrataResult<String> {
        self.inner.check_key(dest)?;
        let data = self.inner.lookup(source)?;
        self.inner.data.insert(dest.to_string(), data);
        Ok(dest.to_string())
    }
}
