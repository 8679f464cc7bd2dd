use crate::errors::{ErrorKind, StrataError, StrataResult};
use crate::store::KeyIterator;
use std::fmt;
use std::io::{self, Read, Seek, Write};
use std::ops::Deref;
use std::sync::Arc;

/// A readable, seekable stream over a single stored value.
///
/// Returned by [`KeyValueStoreProvider::open`]. Backends with random access
/// (files, memory cursors) support `seek`/`stream_position`; a backend
/// without it may return a stream whose seek fails with an IO error.
pub trait ReadStream: Read + Seek + Send + fmt::Debug {}

impl<T: Read + Seek + Send + fmt::Debug> ReadStream for T {}

/// Low-level interface every key-value store must implement.
///
/// # Purpose
/// Defines the contract that all backends and decorators follow. A store
/// maps string keys to byte values and supports retrieval, storage,
/// deletion, membership tests, and prefix-based listing.
///
/// # Required operations
/// `get`, `put`, `open`, `delete`, `contains`, and `iter_keys` must be
/// implemented by every store. The remaining operations have default
/// implementations derived from the required ones:
/// - `get_file` streams through `open`
/// - `put_file` buffers through `put`
/// - `keys` materializes `iter_keys`
/// - `iter_prefixes` groups `iter_keys` output at the first delimiter
///   occurrence past the prefix
///
/// # Optional capabilities
/// `copy` and `url_for` default to an `UnsupportedOperation` error; a
/// backend advertises the capability by overriding the method. Decorators
/// forward these explicitly so a default body never hides an inner store's
/// own implementation.
///
/// # Failure semantics
/// - `get`/`open` fail with `NotFound` for an absent key
/// - `delete` is idempotent: deleting an absent key is `Ok(())`
/// - `put` overwrites silently and returns the (possibly normalized) key
///
/// # Thread Safety
/// Implementers must be `Send + Sync` for safe use in concurrent contexts.
/// The core layer adds no locking of its own; every operation may block on
/// backend I/O.
pub trait KeyValueStoreProvider: Send + Sync {
    /// Retrieves the value stored at `key`.
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` with the stored bytes
    /// * `Err(StrataError)` with `ErrorKind::NotFound` if the key is absent
    fn get(&self, key: &str) -> StrataResult<Vec<u8>>;

    /// Stores `data` at `key`, overwriting any existing value.
    ///
    /// # Returns
    /// * `Ok(String)` with the key under which the data was stored, which a
    ///   backend may have normalized
    /// * `Err(StrataError)` if the key is invalid or storing failed
    fn put(&self, key: &str, data: &[u8]) -> StrataResult<String>;

    /// Opens a readable stream over the value stored at `key`.
    ///
    /// # Returns
    /// * `Ok(stream)` supporting read and seek where the backend allows
    ///   random access
    /// * `Err(StrataError)` with `ErrorKind::NotFound` if the key is absent
    fn open(&self, key: &str) -> StrataResult<Box<dyn ReadStream>>;

    /// Deletes the value stored at `key`.
    ///
    /// Idempotent: deleting an absent key is not an error.
    fn delete(&self, key: &str) -> StrataResult<()>;

    /// Checks whether `key` has a value in the store.
    ///
    /// The default implementation probes with `get` and treats `NotFound`
    /// as `false`; backends override this with a cheaper membership test.
    fn contains(&self, key: &str) -> StrataResult<bool> {
        match self.get(key) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == &ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Returns a lazy, finite, single-pass iterator over all keys starting
    /// with `prefix`.
    ///
    /// Order is unspecified unless a backend documents one. Re-iterating
    /// requires a fresh call and may observe a different snapshot if data
    /// changed concurrently.
    fn iter_keys(&self, prefix: &str) -> StrataResult<KeyIterator>;

    /// Streams the value stored at `key` into `target`.
    ///
    /// # Returns
    /// * `Ok(u64)` with the number of bytes written
    /// * `Err(StrataError)` with `ErrorKind::NotFound` if the key is absent
    fn get_file(&self, key: &str, target: &mut dyn Write) -> StrataResult<u64> {
        let mut stream = self.open(key)?;
        let written = io::copy(&mut stream, target)?;
        Ok(written)
    }

    /// Stores the contents read from `source` at `key`.
    ///
    /// # Returns
    /// * `Ok(String)` with the key under which the data was stored
    fn put_file(&self, key: &str, source: &mut dyn Read) -> StrataResult<String> {
        let mut data = Vec::new();
        source.read_to_end(&mut data)?;
        self.put(key, &data)
    }

    /// Returns a materialized list of all keys starting with `prefix`,
    /// equivalent to exhausting `iter_keys`.
    fn keys(&self, prefix: &str) -> StrataResult<Vec<String>> {
        self.iter_keys(prefix)?.collect()
    }

    /// Returns a lazy iterator over grouped key prefixes, approximating a
    /// hierarchical listing over the flat key space.
    ///
    /// For each key from `iter_keys(prefix)`, the group key is the key
    /// truncated right after the first occurrence of `delimiter` beyond
    /// `prefix`, or the key itself if the delimiter does not occur. Each
    /// distinct group key is emitted exactly once, in first-seen order.
    ///
    /// This visits every key sharing the prefix, so it is O(number of
    /// keys) per call. Backends with a native hierarchical listing should
    /// override it; the default stays correct for all of them.
    fn iter_prefixes(&self, delimiter: &str, prefix: &str) -> StrataResult<KeyIterator> {
        Ok(KeyIterator::grouped(
            self.iter_keys(prefix)?,
            delimiter,
            prefix,
        ))
    }

    /// Copies the value at `source` to `dest`, overwriting `dest` if present.
    ///
    /// Optional capability; the default fails with `UnsupportedOperation`.
    fn copy(&self, source: &str, dest: &str) -> StrataResult<String> {
        let _ = (source, dest);
        Err(StrataError::new(
            "copy is not supported by this store",
            ErrorKind::UnsupportedOperation,
        ))
    }

    /// Returns an external URL from which the value at `key` can be
    /// retrieved.
    ///
    /// Optional capability; the default fails with `UnsupportedOperation`.
    fn url_for(&self, key: &str) -> StrataResult<String> {
        let _ = key;
        Err(StrataError::new(
            "url_for is not supported by this store",
            ErrorKind::UnsupportedOperation,
        ))
    }
}

/// High-level handle for a key-value store.
///
/// # Purpose
/// `KeyValueStore` is the public handle for any store, backend or
/// decorated. It wraps a concrete `KeyValueStoreProvider` in an `Arc` for
/// efficient, thread-safe sharing and dereferences to it, so every
/// contract operation is available directly on the handle.
///
/// # Characteristics
/// - **Thread-Safe**: can be cloned and shared across threads
/// - **Provider-Agnostic**: works with any `KeyValueStoreProvider`
/// - **Lightweight**: cloning only increments a reference count
///
/// # Usage Example
/// ```text
/// let store = KeyValueStore::new(InMemoryStore::new());
/// store.put("greeting", b"hello")?;
/// let value = store.get("greeting")?;
/// assert_eq!(value, b"hello");
/// ```
#[derive(Clone)]
pub struct KeyValueStore {
    inner: Arc<dyn KeyValueStoreProvider>,
}

impl KeyValueStore {
    /// Creates a new `KeyValueStore` wrapping a provider implementation.
    ///
    /// # Arguments
    /// * `inner` - A concrete implementation of `KeyValueStoreProvider`
    ///
    /// # Notes
    /// - The provider is wrapped in an `Arc` for thread-safe sharing
    /// - Cloning the handle is cheap and shares the same instance
    pub fn new<T: KeyValueStoreProvider + 'static>(inner: T) -> Self {
        KeyValueStore { inner: Arc::new(inner) }
    }
}

impl fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValueStore").finish_non_exhaustive()
    }
}

impl Deref for KeyValueStore {
    type Target = Arc<dyn KeyValueStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
