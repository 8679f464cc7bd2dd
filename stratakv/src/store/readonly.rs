use crate::errors::{ErrorKind, StrataError, StrataResult};
use crate::store::{KeyIterator, KeyValueStore, KeyValueStoreProvider, ReadStream};
use std::io::{Read, Write};

/// A read-only view of an underlying store.
///
/// Exposes only `get`, `get_file`, `open`, `iter_keys`, `keys`, and
/// `contains`. Any other operation fails with `UnsupportedOperation`, so an
/// attempted mutation fails immediately and loudly instead of silently
/// succeeding or being mistaken for a missing key.
///
/// Note that the original store remains writable through any other
/// reference that was not wrapped; this decorator only protects against
/// bugs and other unintentional writes through this particular handle. It
/// is not a security measure.
pub struct ReadOnlyDecorator {
    inner: KeyValueStore,
}

impl ReadOnlyDecorator {
    pub fn new(inner: KeyValueStore) -> KeyValueStore {
        KeyValueStore::new(ReadOnlyDecorator { inner })
    }

    fn unsupported(operation: &str) -> StrataError {
        StrataError::new(
            &format!("'{}' is not available on a read-only store", operation),
            ErrorKind::UnsupportedOperation,
        )
    }
}

impl KeyValueStoreProvider for ReadOnlyDecorator {
    fn get(&self, key: &str) -> StrataResult<Vec<u8>> {
        self.inner.get(key)
    }

    fn put(&self, _key: &str, _data: &[u8]) -> StrataResult<String> {
        Err(Self::unsupported("put"))
    }

    fn open(&self, key: &str) -> StrataResult<Box<dyn ReadStream>> {
        self.inner.open(key)
    }

    fn delete(&self, _key: &str) -> StrataResult<()> {
        Err(Self::unsupported("delete"))
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

    fn put_file(&self, _key: &str, _source: &mut dyn Read) -> StrataResult<String> {
        Err(Self::unsupported("put_file"))
    }

    fn keys(&self, prefix: &str) -> StrataResult<Vec<String>> {
        self.inner.keys(prefix)
    }

    fn iter_prefixes(&self, _delimiter: &str, _prefix: &str) -> StrataResult<KeyIterator> {
        // outside the allow-list, like every operation not named above
        Err(Self::unsupported("iter_prefixes"))
    }

    fn copy(&self, _source: &str, _dest: &str) -> StrataResult<String> {
        Err(Self::unsupported("copy"))
    }

    fn url_for(&self, _key: &str) -> StrataResult<String> {
        Err(Self::unsupported("url_for"))
    }
}
