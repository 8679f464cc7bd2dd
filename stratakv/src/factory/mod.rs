//! Declarative store construction.
//!
//! The factory assembles a concrete, decorated store from configuration:
//! a store type identifier plus named parameters, or a single URL string.
//! Both carry an optional decorator chain; the two chain spellings are
//! normalized into one [`StoreDescriptor`] and the chain is folded over
//! the base store, first entry innermost, last entry outermost.
//!
//! Composition is a one-time, single-threaded setup step. It performs no
//! I/O of its own beyond invoking the backend constructor, and
//! configuration errors surface synchronously before any backend is
//! touched where feasible.
//!
//! ```text
//! // programmatic form
//! let params = StoreParams::new().with("wrap", "prefix(ns/)");
//! let store = get_store("memory", true, params)?;
//!
//! // URL form, equivalent
//! let store = get_store_from_url("memory://?wrap=prefix(ns%2F)")?;
//! ```

mod descriptor;
mod registry;
mod url;

pub use descriptor::*;
pub use registry::*;
pub use url::*;

use crate::common::CREATE_IF_MISSING_PARAMETER;
use crate::errors::StrataResult;
use crate::store::KeyValueStore;

/// Builds a store of `store_type` from named parameters, applying any
/// decorator chain the configuration carries.
///
/// `create_if_missing` asks the backend to create its root (base
/// directory, bucket, container) if absent; backends for which creating a
/// root is meaningless ignore it. The flag is always passed through to the
/// backend constructor in the parameter map.
///
/// # Arguments
/// * `store_type` - registered type identifier, optionally with a legacy
///   embedded decorator chain (`"urlencode+memory"`)
/// * `create_if_missing` - universal root-creation flag
/// * `params` - backend parameters; the reserved `wrap` entry carries the
///   modern decorator chain
///
/// # Returns
/// * `Ok(KeyValueStore)` with the fully decorated store
/// * `Err(StrataError)` on configuration or backend-construction failure
pub fn get_store(
    store_type: &str,
    create_if_missing: bool,
    params: StoreParams,
) -> StrataResult<KeyValueStore> {
    let mut params = params;
    params.insert(CREATE_IF_MISSING_PARAMETER, create_if_missing);

    let descriptor = StoreDescriptor::normalize(store_type, params)?;
    log::debug!(
        "building '{}' store with {} decorator(s)",
        descriptor.store_type,
        descriptor.decorators.len()
    );
    default_registry().build(descriptor)
}

/// Builds a store from a URL string, delegating to [`get_store`].
///
/// See [`parse_store_url`] for the URL grammar. Example URLs:
///
/// ```text
/// memory://
/// fs:///var/data/store?create_if_missing=false
/// s3://access:secret@endpoint/bucket?wrap=urlencode+readonly
/// ```
pub fn get_store_from_url(url: &str) -> StrataResult<KeyValueStore> {
    let parsed = parse_store_url(url)?;
    get_store(&parsed.store_type, parsed.create_if_missing, parsed.params)
}

/// Applies a single textual decorator spec (`"readonly"`, `"prefix(ns/)"`)
/// to an existing store, using the process-wide registry.
pub fn decorate_store(store: KeyValueStore, spec: &str) -> StrataResult<KeyValueStore> {
    let spec = DecoratorSpec::parse(spec)?;
    default_registry().decorate(store, &spec)
}
