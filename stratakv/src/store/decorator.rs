use crate::errors::StrataResult;
use crate::store::{KeyIterator, KeyValueStore, KeyValueStoreProvider, ReadStream};
use std::io::{Read, Write};

/// Transparent forwarding base for store decorators.
///
/// # Purpose
/// `StoreDecorator` wraps exactly one inner store and forwards every
/// contract operation to it verbatim, making the wrapping invisible. It is
/// the neutral element of decorator composition: wrapping a store in a
/// `StoreDecorator` changes nothing observable.
///
/// # Full-interface forwarding
/// Every operation is forwarded explicitly, including `contains`, both
/// iteration operations, and the optional capabilities `copy` and
/// `url_for`. Forwarding the optional capabilities matters: if a decorator
/// relied on the trait's default bodies instead, an inner store's own
/// `copy` or `url_for` implementation would be shadowed by the default
/// `UnsupportedOperation` error, and the decorator would silently drop a
/// capability the caller expects to exist.
///
/// The wrapped store reference is fixed at construction and never
/// reassigned, so the decorator is safe to share across threads whenever
/// the wrapped store is.
pub struct StoreDecorator {
    inner: KeyValueStore,
}

impl StoreDecorator {
    /// Creates a decorator forwarding to `inner`.
    pub fn new(inner: KeyValueStore) -> Self {
        StoreDecorator { inner }
    }

    /// Wraps `inner` and returns the decorated handle.
    pub fn wrap(inner: KeyValueStore) -> KeyValueStore {
        KeyValueStore::new(StoreDecorator::new(inner))
    }

    /// The wrapped store.
    pub fn inner(&self) -> &KeyValueStore {
        &self.inner
    }
}

impl KeyValueStoreProvider for StoreDecorator {
    fn get(&self, key: &str) -> StrataResult<Vec<u8>> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, data: &[u8]) -> StrataResult<String> {
        self.inner.put(key, data)
    }

    fn open(&self, key: &str) -> StrataResult<Box<dyn ReadStream>> {
        self.inner.open(key)
    }

    fn delete(&self, key: &str) -> StrataResult<()> {
        self.inner.delete(key)
    }

    fn contains(&self, key: &str) -> StrataResult<bool> {
        self.inner.contains(key)
    }

    fn iter_keys(&self, prefix: &str) -> StrataResult<KeyIterator> {
        self.inner.iter_keys(prefix)
    }

    fn get_file(&self, key: &str, target: &mut dyn Write) -> StrataResult<u64> {
        self.inner.get_file(key, target)
    }

    fn put_file(&self, key: &str, source: &mut dyn Read) -> StrataResult<String> {
        self.inner.put_file(key, source)
    }

    fn keys(&self, prefix: &str) -> StrataResult<Vec<String>> {
        self.inner.keys(prefix)
    }

    fn iter_prefixes(&self, delimiter: &str, prefix: &str) -> StrataResult<KeyIterator> {
        self.inner.iter_prefixes(delimiter, prefix)
    }

    fn copy(&self, source: &str, dest: &str) -> StrataResult<String> {
        self.inner.copy(source, dest)
    }

    fn url_for(&self, key: &str) -> StrataResult<String> {
        self.inner.url_for(key)
    }
}
