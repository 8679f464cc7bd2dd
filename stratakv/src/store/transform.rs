use crate::errors::{ErrorKind, StrataResult};
use crate::store::{
    KeyIterator, KeyIteratorProvider, KeyValueStore, KeyValueStoreProvider, ReadStream,
};
use std::io::{Read, Write};
use std::sync::Arc;

/// Key transformation strategy for decorators.
///
/// # Purpose
/// `KeyTransform` bundles the four hook points a key-transforming decorator
/// needs. Each hook defaults to the identity/no-op, so a transform only
/// implements the hooks it actually changes. The generic
/// [`KeyTransformingDecorator`] composes a transform with an inner store
/// and implements the whole contract in terms of these hooks.
///
/// # Laws
/// For every key `k` the transform accepts:
/// - round trip: `unmap_key(map_key(k)) == k`
/// - injectivity: distinct accepted keys map to distinct mapped keys
pub trait KeyTransform: Send + Sync {
    /// Maps a caller-facing key to the key sent to the inner store.
    ///
    /// Fails with `ErrorKind::InvalidKey` when `key` is not well-formed
    /// for this transform.
    fn map_key(&self, key: &str) -> StrataResult<String> {
        Ok(key.to_string())
    }

    /// Maps a caller-facing listing prefix.
    ///
    /// Kept separate from `map_key` because a listing prefix may be a
    /// partial key; in particular an empty prefix must still map to a
    /// valid listing root for this transform.
    fn map_key_prefix(&self, prefix: &str) -> StrataResult<String> {
        Ok(prefix.to_string())
    }

    /// Maps a key coming back from the inner store to its caller-facing
    /// form. Inverse of `map_key` on its image.
    ///
    /// A mapped key that violates the transform's structural precondition
    /// fails with `ErrorKind::InvariantViolation`; that signals an internal
    /// bug and is deliberately distinct from `NotFound`.
    fn unmap_key(&self, mapped: &str) -> StrataResult<String> {
        Ok(mapped.to_string())
    }

    /// Whether a mapped key seen while iterating the inner store should be
    /// exposed through this decorator at all.
    ///
    /// Lets a decorator hide keys belonging to a different namespace that
    /// shares the same inner store.
    fn filter(&self, mapped: &str) -> bool {
        let _ = mapped;
        true
    }
}

/// Identity transform; maps every key to itself and filters nothing.
#[derive(Default)]
pub struct IdentityTransform;

impl KeyTransform for IdentityTransform {}

/// Generic decorator applying a [`KeyTransform`] around an inner store.
///
/// # Purpose
/// Implements every contract operation in terms of the transform's four
/// hooks: key arguments pass through `map_key`/`map_key_prefix` before
/// reaching the inner store, key-bearing results (`put`, `put_file`,
/// `iter_keys`) come back through `unmap_key`, and `iter_keys` applies
/// `filter` before unmapping to exclude foreign entries.
///
/// Concrete decorators (prefix namespacing, key encoding) are just
/// transforms plugged into this type.
///
/// # Behavior notes
/// - `delete` normalizes an inner `NotFound` to a no-op, preserving the
///   contract's idempotent delete even over backends that report missing
///   keys.
/// - `iter_prefixes` groups caller-facing (unmapped) keys, so delimiter
///   positions are computed on what the caller sees, not on mapped keys.
/// - Iteration stays lazy: the transform travels with the iterator.
pub struct KeyTransformingDecorator {
    inner: KeyValueStore,
    transform: Arc<dyn KeyTransform>,
}

impl KeyTransformingDecorator {
    /// Creates a decorator applying `transform` around `inner`.
    pub fn new<T: KeyTransform + 'static>(inner: KeyValueStore, transform: T) -> Self {
        KeyTransformingDecorator {
            inner,
            transform: Arc::new(transform),
        }
    }

    /// Wraps `inner` with `transform` and returns the decorated handle.
    pub fn wrap<T: KeyTransform + 'static>(inner: KeyValueStore, transform: T) -> KeyValueStore {
        KeyValueStore::new(KeyTransformingDecorator::new(inner, transform))
    }
}

impl KeyValueStoreProvider for KeyTransformingDecorator {
    fn get(&self, key: &str) -> StrataResult<Vec<u8>> {
        self.inner.get(&self.transform.map_key(key)?)
    }

    fn put(&self, key: &str, data: &[u8]) -> StrataResult<String> {
        let stored = self.inner.put(&self.transform.map_key(key)?, data)?;
        self.transform.unmap_key(&stored)
    }

    fn open(&self, key: &str) -> StrataResult<Box<dyn ReadStream>> {
        self.inner.open(&self.transform.map_key(key)?)
    }

    fn delete(&self, key: &str) -> StrataResult<()> {
        match self.inner.delete(&self.transform.map_key(key)?) {
            Err(err) if err.kind() == &ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn contains(&self, key: &str) -> StrataResult<bool> {
        self.inner.contains(&self.transform.map_key(key)?)
    }

    fn iter_keys(&self, prefix: &str) -> StrataResult<KeyIterator> {
        let mapped_prefix = self.transform.map_key_prefix(prefix)?;
        let inner_iter = self.inner.iter_keys(&mapped_prefix)?;
        Ok(KeyIterator::new(UnmappingKeyProvider {
            inner: inner_iter,
            transform: Arc::clone(&self.transform),
        }))
    }

    fn get_file(&self, key: &str, target: &mut dyn Write) -> StrataResult<u64> {
        self.inner.get_file(&self.transform.map_key(key)?, target)
    }

    fn put_file(&self, key: &str, source: &mut dyn Read) -> StrataResult<String> {
        let stored = self.inner.put_file(&self.transform.map_key(key)?, source)?;
        self.transform.unmap_key(&stored)
    }

    fn iter_prefixes(&self, delimiter: &str, prefix: &str) -> StrataResult<KeyIterator> {
        Ok(KeyIterator::grouped(
            self.iter_keys(prefix)?,
            delimiter,
            prefix,
        ))
    }

    fn copy(&self, source: &str, dest: &str) -> StrataResult<String> {
        let stored = self.inner.copy(
            &self.transform.map_key(source)?,
            &self.transform.map_key(dest)?,
        )?;
        self.transform.unmap_key(&stored)
    }

    fn url_for(&self, key: &str) -> StrataResult<String> {
        self.inner.url_for(&self.transform.map_key(key)?)
    }
}

/// Key-iterator adapter applying `filter` then `unmap_key` to an inner
/// iteration. Mapped keys rejected by `filter` are skipped entirely.
struct UnmappingKeyProvider {
    inner: KeyIterator,
    transform: Arc<dyn KeyTransform>,
}

impl KeyIteratorProvider for UnmappingKeyProvider {
    fn next_key(&mut self) -> Option<StrataResult<String>> {
        loop {
            match self.inner.next() {
                None => return None,
                Some(Err(err)) => return Some(Err(err)),
                Some(Ok(mapped)) => {
                    if !self.transform.filter(&mapped) {
                        continue;
                    }
                    return Some(self.transform.unmap_key(&mapped));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StrataError;
    use crate::store::memory::InMemoryStore;

    // reverses keys; a transform whose mapped form differs from the
    // caller-facing form for almost every key
    struct ReverseTransform;

    impl KeyTransform for ReverseTransform {
        fn map_key(&self, key: &str) -> StrataResult<String> {
            if key.is_empty() {
                return Err(StrataError::new("Key must not be empty", ErrorKind::InvalidKey));
            }
            Ok(key.chars().rev().collect())
        }

        fn map_key_prefix(&self, prefix: &str) -> StrataResult<String> {
            // a reversed key does not begin with a reversed prefix; listing
            // everything and filtering is the only correct option here
            let _ = prefix;
            Ok(String::new())
        }

        fn unmap_key(&self, mapped: &str) -> StrataResult<String> {
            Ok(mapped.chars().rev().collect())
        }
    }

    fn create_identity() -> (KeyValueStore, KeyValueStore) {
        let inner = KeyValueStore::new(InMemoryStore::new());
        let wrapped = KeyTransformingDecorator::wrap(inner.clone(), IdentityTransform);
        (inner, wrapped)
    }

    #[test]
    fn test_identity_transform_is_transparent() {
        let (inner, wrapped) = create_identity();

        wrapped.put("key1", b"value1").unwrap();
        assert_eq!(inner.get("key1").unwrap(), b"value1");
        assert_eq!(wrapped.get("key1").unwrap(), b"value1");
        assert!(wrapped.contains("key1").unwrap());
    }

    #[test]
    fn test_map_key_applied_before_inner_store() {
        let inner = KeyValueStore::new(InMemoryStore::new());
        let wrapped = KeyTransformingDecorator::wrap(inner.clone(), ReverseTransform);

        wrapped.put("abc", b"payload").unwrap();
        // stored under the mapped key
        assert_eq!(inner.get("cba").unwrap(), b"payload");
        // and readable back through the decorator
        assert_eq!(wrapped.get("abc").unwrap(), b"payload");
    }

    #[test]
    fn test_put_unmaps_returned_key() {
        let inner = KeyValueStore::new(InMemoryStore::new());
        let wrapped = KeyTransformingDecorator::wrap(inner, ReverseTransform);

        let stored = wrapped.put("abc", b"x").unwrap();
        assert_eq!(stored, "abc");
    }

    #[test]
    fn test_invalid_key_rejected_before_reaching_backend() {
        let inner = KeyValueStore::new(InMemoryStore::new());
        let wrapped = KeyTransformingDecorator::wrap(inner.clone(), ReverseTransform);

        let err = wrapped.put("", b"x").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidKey);
        assert!(inner.keys("").unwrap().is_empty());
    }

    #[test]
    fn test_delete_normalizes_inner_not_found() {
        struct NotFoundOnDelete {
            inner: InMemoryStore,
        }

        impl KeyValueStoreProvider for NotFoundOnDelete {
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
                if !self.inner.contains(key)? {
                    return Err(StrataError::new("no such key", ErrorKind::NotFound));
                }
                self.inner.delete(key)
            }
            fn iter_keys(&self, prefix: &str) -> StrataResult<KeyIterator> {
                self.inner.iter_keys(prefix)
            }
        }

        let strict = KeyValueStore::new(NotFoundOnDelete { inner: InMemoryStore::new() });
        let wrapped = KeyTransformingDecorator::wrap(strict, IdentityTransform);

        // the inner store raises NotFound; the decorator keeps delete
        // idempotent for its callers
        wrapped.delete("absent").unwrap();
    }

    #[test]
    fn test_iter_keys_unmaps_results() {
        let inner = KeyValueStore::new(InMemoryStore::new());
        let wrapped = KeyTransformingDecorator::wrap(inner, ReverseTransform);

        wrapped.put("abc", b"1").unwrap();
        wrapped.put("xyz", b"2").unwrap();

        let mut keys = wrapped.keys("").unwrap();
        keys.sort();
        assert_eq!(keys, vec!["abc", "xyz"]);
    }

    #[test]
    fn test_iter_keys_applies_filter_before_unmap() {
        struct OnlyShort;

        impl KeyTransform for OnlyShort {
            fn filter(&self, mapped: &str) -> bool {
                mapped.len() <= 2
            }
        }

        let inner = KeyValueStore::new(InMemoryStore::new());
        inner.put("ab", b"1").unwrap();
        inner.put("toolong", b"2").unwrap();

        let wrapped = KeyTransformingDecorator::wrap(inner, OnlyShort);
        assert_eq!(wrapped.keys("").unwrap(), vec!["ab"]);
    }

    #[test]
    fn test_iter_prefixes_groups_caller_facing_keys() {
        let (_inner, wrapped) = create_identity();

        wrapped.put("a/b", b"1").unwrap();
        wrapped.put("a/c", b"2").unwrap();
        wrapped.put("d", b"3").unwrap();

        let mut groups = wrapped
            .iter_prefixes("/", "")
            .unwrap()
            .collect::<StrataResult<Vec<_>>>()
            .unwrap();
        groups.sort();
        assert_eq!(groups, vec!["a/", "d"]);
    }

    #[test]
    fn test_copy_maps_both_keys() {
        let inner = KeyValueStore::new(InMemoryStore::new());
        let wrapped = KeyTransformingDecorator::wrap(inner.clone(), ReverseTransform);

        wrapped.put("abc", b"payload").unwrap();
        let dest = wrapped.copy("abc", "def").unwrap();
        assert_eq!(dest, "def");
        assert_eq!(inner.get("fed").unwrap(), b"payload");
        assert_eq!(wrapped.get("def").unwrap(), b"payload");
    }

    #[test]
    fn test_streaming_operations_map_keys() {
        let inner = KeyValueStore::new(InMemoryStore::new());
        let wrapped = KeyTransformingDecorator::wrap(inner.clone(), ReverseTransform);

        let mut source = std::io::Cursor::new(b"streamed".to_vec());
        let stored = wrapped.put_file("abc", &mut source).unwrap();
        assert_eq!(stored, "abc");
        assert!(inner.contains("cba").unwrap());

        let mut target = Vec::new();
        wrapped.get_file("abc", &mut target).unwrap();
        assert_eq!(target, b"streamed");
    }
}
