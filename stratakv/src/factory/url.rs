use crate::common::CREATE_IF_MISSING_PARAMETER;
use crate::errors::{ErrorKind, StrataError, StrataResult};
use crate::factory::StoreParams;
use crate::store::unquote;

/// A store URL decomposed into factory inputs.
///
/// The `store_type` is the raw scheme and may still carry a legacy
/// embedded decorator chain; descriptor normalization deals with that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStoreUrl {
    pub store_type: String,
    pub create_if_missing: bool,
    pub params: StoreParams,
}

/// Parses a store URL of the form
/// `scheme://[userinfo@]host[/path][?query]`.
///
/// - `scheme` becomes the store type.
/// - `userinfo` becomes credential parameters, percent-decoded: with a `:`
///   it splits into `username` and `password`, otherwise it is kept whole
///   as `userinfo`.
/// - `host` and `path` become the generic location parameters `host` and
///   `path`; backends interpret them (the filesystem adapter joins them
///   into a root directory, an object-storage adapter would read endpoint
///   and bucket).
/// - `query` parses as `&`-separated `key=value` pairs, percent-decoded;
///   keys without a `=` become boolean flags. The reserved key `wrap`
///   carries the decorator chain and the reserved key `create_if_missing`
///   the universal creation flag (default `true`).
pub fn parse_store_url(url: &str) -> StrataResult<ParsedStoreUrl> {
    let (scheme, rest) = url.split_once("://").ok_or_else(|| {
        StrataError::new(
            &format!("'{}' is not a store URL (missing '://')", url),
            ErrorKind::ConfigurationError,
        )
    })?;

    if scheme.is_empty() {
        return Err(StrataError::new(
            &format!("'{}' has an empty scheme", url),
            ErrorKind::ConfigurationError,
        ));
    }

    let (location, query) = match rest.split_once('?') {
        Some((location, query)) => (location, Some(query)),
        None => (rest, None),
    };

    let (authority, path) = match location.find('/') {
        Some(pos) => (&location[..pos], &location[pos..]),
        None => (location, ""),
    };

    let mut params = StoreParams::new();

    let host = match authority.rsplit_once('@') {
        Some((userinfo, host)) => {
            parse_userinfo(userinfo, &mut params)?;
            host
        }
        None => authority,
    };

    if !host.is_empty() {
        params.insert("host", host);
    }
    if !path.is_empty() {
        params.insert("path", path);
    }

    if let Some(query) = query {
        parse_query(query, &mut params)?;
    }

    let create_if_missing = match params.remove(CREATE_IF_MISSING_PARAMETER) {
        None => true,
        Some(value) => value.as_bool().ok_or_else(|| {
            StrataError::new(
                "create_if_missing must be a boolean",
                ErrorKind::ConfigurationError,
            )
        })?,
    };

    Ok(ParsedStoreUrl {
        store_type: scheme.to_string(),
        create_if_missing,
        params,
    })
}

fn parse_userinfo(userinfo: &str, params: &mut StoreParams) -> StrataResult<()> {
    match userinfo.split_once(':') {
        Some((username, password)) => {
            params.insert("username", decode_component(username)?);
            params.insert("password", decode_component(password)?);
        }
        None => {
            params.insert("userinfo", decode_component(userinfo)?);
        }
    }
    Ok(())
}

fn parse_query(query: &str, params: &mut StoreParams) -> StrataResult<()> {
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((name, value)) => {
                params.insert(decode_component(name)?, decode_component(value)?);
            }
            None => {
                // bare query key, treated as a boolean flag
                params.insert(decode_component(pair)?, true);
            }
        }
    }
    Ok(())
}

fn decode_component(component: &str) -> StrataResult<String> {
    unquote(component).map_err(|err| {
        StrataError::new_with_cause(
            &format!("Malformed percent-encoding in URL component '{}'", component),
            ErrorKind::ConfigurationError,
            err,
        )
    })
}
