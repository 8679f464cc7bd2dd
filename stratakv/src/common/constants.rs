use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ErrorKind, StrataError, StrataResult};

// factory constants
pub const WRAP_PARAMETER: &str = "wrap";
pub const CREATE_IF_MISSING_PARAMETER: &str = "create_if_missing";
pub const CHAIN_SEPARATOR: char = '+';

// store type identifiers shipped with the core crate
pub const MEMORY_STORE_TYPE: &str = "memory";

// decorator identifiers resolvable by the factory registry
pub const PREFIX_DECORATOR: &str = "prefix";
pub const URLENCODE_DECORATOR: &str = "urlencode";
pub const READONLY_DECORATOR: &str = "readonly";
pub const READONLY_DECORATOR_ALIAS: &str = "ro";

/// Characters allowed in a key besides alphanumerics.
pub const VALID_NON_NUM: &str = r##"`!"#$%&'()+,-.<=>?@[]^_{}~"##;

/// Regular expression source testing whether a key is valid. Allowed are all
/// alphanumeric characters as well as ``!"`#$%&'()+,-.<=>?@[]^_{}~``.
/// Path separators, whitespace, and control characters are rejected, since
/// several backends map keys directly to file or object names.
pub const VALID_KEY_REGEXP: &str =
    r##"^[`!"\#$%&'()+,\-.<=>?@\[\]^_{}~0-9a-zA-Z]+$"##;

/// A compiled version of [`VALID_KEY_REGEXP`].
pub static VALID_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(VALID_KEY_REGEXP).expect("valid-key pattern must compile")
});

/// Checks whether `key` is a well-formed store key.
///
/// # Arguments
/// * `key` - The key to validate
///
/// # Returns
/// * `Ok(())` if the key is non-empty and matches the valid-key pattern
/// * `Err(StrataError)` with `ErrorKind::InvalidKey` otherwise
pub fn check_valid_key(key: &str) -> StrataResult<()> {
    if key.is_empty() {
        return Err(StrataError::new("Key must not be empty", ErrorKind::InvalidKey));
    }

    if !VALID_KEY_RE.is_match(key) {
        return Err(StrataError::new(
            &format!("Key '{}' contains illegal characters", key),
            ErrorKind::InvalidKey,
        ));
    }

    Ok(())
}
