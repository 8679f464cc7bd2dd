use crate::errors::StrataResult;
use std::collections::HashSet;
use std::sync::Arc;

/// Trait for implementing lazy key iteration.
///
/// # Purpose
///
/// `KeyIteratorProvider` defines the contract for iterators traversing the
/// keys of a store. Providers are pull-based and single-pass: each call to
/// `next_key` advances the iteration, and an exhausted provider keeps
/// returning `None`.
///
/// # Characteristics
///
/// - **Stateful**: maintains the current position
/// - **Lazy**: keys are produced on demand, not materialized up front
/// - **Single-Pass**: re-iterating requires a fresh provider from the store
/// - **Error Handling**: yields `StrataResult<String>` so backend failures
///   surface mid-iteration instead of being swallowed
///
/// # Implementations
///
/// Built-in implementations:
/// - a vector-backed provider for snapshot listings
/// - a prefix-grouping provider implementing the flat-namespace directory
///   approximation
/// - decorators add providers that transform and filter an inner iteration
pub trait KeyIteratorProvider: Send {
    /// Get the next key
    fn next_key(&mut self) -> Option<StrataResult<String>>;
}

/// A unified facade for lazy iteration over store keys.
///
/// # Purpose
///
/// `KeyIterator` wraps any `KeyIteratorProvider` implementation and
/// provides a standard `Iterator` interface yielding
/// `StrataResult<String>`.
///
/// # Characteristics
///
/// - **Facade Pattern**: abstracts away the underlying provider
/// - **Thread-Safe**: uses `Arc<Mutex<_>>` for safe shared access
/// - **Cloneable**: clones share iteration state
/// - **Provider-Agnostic**: works with any `KeyIteratorProvider`
pub struct KeyIterator {
    provider: Arc<parking_lot::Mutex<Box<dyn KeyIteratorProvider>>>,
}

impl KeyIterator {
    /// Creates a new key iterator wrapping the given provider.
    ///
    /// # Arguments
    ///
    /// * `provider` - Any implementation of `KeyIteratorProvider`
    pub fn new<T: KeyIteratorProvider + 'static>(provider: T) -> Self {
        KeyIterator {
            provider: Arc::new(parking_lot::Mutex::new(Box::new(provider))),
        }
    }

    /// Creates an iterator over an already-materialized key snapshot.
    ///
    /// Used by backends whose native listing produces a point-in-time key
    /// set (for example a concurrent map).
    pub fn from_keys(keys: Vec<String>) -> Self {
        KeyIterator::new(VecKeyProvider { iter: keys.into_iter() })
    }

    /// Creates an iterator yielding no keys.
    pub fn empty() -> Self {
        KeyIterator::from_keys(Vec::new())
    }

    /// Creates a prefix-grouping iterator over `inner`.
    ///
    /// For each key produced by `inner`, the group key is the key truncated
    /// right after the first occurrence of `delimiter` beyond `prefix`; if
    /// the delimiter does not occur there, the group key is the key itself.
    /// Each distinct group key is emitted exactly once, in order of first
    /// appearance; an auxiliary set suppresses duplicates.
    pub fn grouped(inner: KeyIterator, delimiter: &str, prefix: &str) -> Self {
        KeyIterator::new(PrefixGroupProvider {
            inner,
            delimiter: delimiter.to_string(),
            prefix_len: prefix.len(),
            seen: HashSet::new(),
        })
    }
}

impl Clone for KeyIterator {
    fn clone(&self) -> Self {
        KeyIterator {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl Iterator for KeyIterator {
    type Item = StrataResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut provider = self.provider.lock();
        provider.next_key()
    }
}

struct VecKeyProvider {
    iter: std::vec::IntoIter<String>,
}

impl KeyIteratorProvider for VecKeyProvider {
    fn next_key(&mut self) -> Option<StrataResult<String>> {
        self.iter.next().map(Ok)
    }
}

/// Groups keys from an inner iteration at the first delimiter occurrence
/// past the listing prefix. See [`KeyIterator::grouped`].
struct PrefixGroupProvider {
    inner: KeyIterator,
    delimiter: String,
    prefix_len: usize,
    seen: HashSet<String>,
}

impl KeyIteratorProvider for PrefixGroupProvider {
    fn next_key(&mut self) -> Option<StrataResult<String>> {
        loop {
            let key = match self.inner.next() {
                None => return None,
                Some(Err(err)) => return Some(Err(err)),
                Some(Ok(key)) => key,
            };

            let group = match key.get(self.prefix_len..) {
                Some(tail) => match tail.find(&self.delimiter) {
                    Some(pos) => {
                        key[..self.prefix_len + pos + self.delimiter.len()].to_string()
                    }
                    None => key,
                },
                // key shorter than the prefix; can only come from a
                // misbehaving inner iteration, expose it ungrouped
                None => key,
            };

            if self.seen.insert(group.clone()) {
                return Some(Ok(group));
            }
        }
    }
}
