use crate::errors::{ErrorKind, StrataError, StrataResult};
use crate::store::{KeyTransform, KeyTransformingDecorator, KeyValueStore};

/// Key transform prepending a fixed namespace prefix.
///
/// Prefixes every key with a literal string before it reaches the inner
/// store and strips it again on the way back. Listing through the
/// decorator only ever sees this namespace, even with an empty caller
/// prefix, and keys written to the shared inner store outside the
/// namespace are filtered out of iteration.
pub struct PrefixTransform {
    prefix: String,
}

impl PrefixTransform {
    pub fn new(prefix: impl Into<String>) -> Self {
        PrefixTransform { prefix: prefix.into() }
    }
}

impl KeyTransform for PrefixTransform {
    fn map_key(&self, key: &str) -> StrataResult<String> {
        if key.is_empty() {
            return Err(StrataError::new("Key must not be empty", ErrorKind::InvalidKey));
        }
        Ok(format!("{}{}", self.prefix, key))
    }

    fn map_key_prefix(&self, prefix: &str) -> StrataResult<String> {
        Ok(format!("{}{}", self.prefix, prefix))
    }

    fn unmap_key(&self, mapped: &str) -> StrataResult<String> {
        // a mapped key without the namespace prefix can only come from a
        // bug in this decorator or the inner store, never from user input
        match mapped.strip_prefix(&self.prefix) {
            Some(suffix) => Ok(suffix.to_string()),
            None => Err(StrataError::new(
                &format!(
                    "Key '{}' is missing the namespace prefix '{}'",
                    mapped, self.prefix
                ),
                ErrorKind::InvariantViolation,
            )),
        }
    }

    fn filter(&self, mapped: &str) -> bool {
        mapped.starts_with(&self.prefix)
    }
}

/// Namespacing decorator isolating a logical key range within a shared
/// backend via a fixed literal prefix.
pub struct PrefixDecorator;

impl PrefixDecorator {
    /// Wraps `inner` so that every key is namespaced under `prefix`.
    pub fn new(prefix: impl Into<String>, inner: KeyValueStore) -> KeyValueStore {
        KeyTransformingDecorator::wrap(inner, PrefixTransform::new(prefix))
    }
}
