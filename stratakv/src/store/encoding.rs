use crate::errors::{ErrorKind, StrataError, StrataResult};
use crate::store::{KeyTransform, KeyTransformingDecorator, KeyValueStore};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'-' | b'~')
}

/// Percent-encodes `input` with an empty safe set.
///
/// Every reserved character, including `/`, is encoded; only unreserved
/// characters (`A-Z a-z 0-9 _ . - ~`) pass through, and a space becomes
/// `+`. Non-ASCII characters are encoded per UTF-8 byte. The result is a
/// valid key for backends restricted to filename-safe character sets.
pub fn quote_plus(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.as_bytes() {
        if is_unreserved(*byte) {
            encoded.push(*byte as char);
        } else if *byte == b' ' {
            encoded.push('+');
        } else {
            encoded.push('%');
            encoded.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            encoded.push(HEX_DIGITS[(byte & 0x0F) as usize] as char);
        }
    }
    encoded
}

/// Decodes a [`quote_plus`]-encoded string.
///
/// Fails with `ErrorKind::EncodingError` on a truncated or non-hex percent
/// escape, or when the decoded bytes are not valid UTF-8.
pub fn unquote_plus(input: &str) -> StrataResult<String> {
    percent_decode(input, true)
}

/// Percent-decodes `input` without treating `+` specially.
///
/// Used for URL components, where a literal `+` is meaningful (it chains
/// decorators in the `wrap` query parameter) and a space arrives as `%20`.
pub fn unquote(input: &str) -> StrataResult<String> {
    percent_decode(input, false)
}

fn percent_decode(input: &str, plus_as_space: bool) -> StrataResult<String> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'+' if plus_as_space => {
                decoded.push(b' ');
                pos += 1;
            }
            b'%' => {
                let high = hex_value(bytes.get(pos + 1).copied())?;
                let low = hex_value(bytes.get(pos + 2).copied())?;
                decoded.push((high << 4) | low);
                pos += 3;
            }
            other => {
                decoded.push(other);
                pos += 1;
            }
        }
    }

    Ok(String::from_utf8(decoded)?)
}

fn hex_value(byte: Option<u8>) -> StrataResult<u8> {
    match byte {
        Some(b @ b'0'..=b'9') => Ok(b - b'0'),
        Some(b @ b'a'..=b'f') => Ok(b - b'a' + 10),
        Some(b @ b'A'..=b'F') => Ok(b - b'A' + 10),
        _ => Err(StrataError::new(
            "Malformed percent escape",
            ErrorKind::EncodingError,
        )),
    }
}

/// Key transform percent-encoding every key.
///
/// For backends whose allowed character set forbids characters common in
/// logical keys, such as path separators or anything outside the basic
/// printable range. Encoding round-trips exactly for every Unicode key.
pub struct UrlEncodeTransform;

impl KeyTransform for UrlEncodeTransform {
    fn map_key(&self, key: &str) -> StrataResult<String> {
        if key.is_empty() {
            return Err(StrataError::new("Key must not be empty", ErrorKind::InvalidKey));
        }
        Ok(quote_plus(key))
    }

    fn map_key_prefix(&self, prefix: &str) -> StrataResult<String> {
        // no emptiness check: an empty caller prefix is the listing root
        Ok(quote_plus(prefix))
    }

    fn unmap_key(&self, mapped: &str) -> StrataResult<String> {
        // mapped keys were produced by our own encoder; a decode failure
        // means the inner store handed back something foreign
        unquote_plus(mapped).map_err(|err| {
            StrataError::new_with_cause(
                &format!("Key '{}' is not a valid encoded key", mapped),
                ErrorKind::InvariantViolation,
                err,
            )
        })
    }
}

/// Decorator percent-encoding keys before they reach the inner store and
/// decoding them on the way back.
pub struct UrlEncodeDecorator;

impl UrlEncodeDecorator {
    pub fn new(inner: KeyValueStore) -> KeyValueStore {
        KeyTransformingDecorator::wrap(inner, UrlEncodeTransform)
    }
}
