use crate::config::FsStoreConfig;
use crate::store::FilesystemStore;
use stratakv::common::CREATE_IF_MISSING_PARAMETER;
use stratakv::errors::{ErrorKind, StrataError, StrataResult};
use stratakv::factory::{default_registry, StoreParams, StoreRegistry};
use stratakv::store::KeyValueStore;

/// Store type identifier this adapter registers.
pub const FS_STORE_TYPE: &str = "fs";

/// Builds a filesystem store from factory parameters.
///
/// Accepted parameters:
/// - `path` (and optionally `host`, from URL parsing): joined into the
///   root directory. `fs:///var/data` yields an absolute root,
///   `fs://data/store` a relative one.
/// - `create_if_missing`: the universal flag; when `true` (the default)
///   the root directory is created on demand, otherwise a missing root is
///   an error surfaced at factory time.
/// - `buffer_size`: optional streaming-copy buffer size in bytes.
pub fn from_params(params: &StoreParams) -> StrataResult<KeyValueStore> {
    let host = params.get_str("host").unwrap_or("");
    let path = params.get_str("path").unwrap_or("");
    if host.is_empty() && path.is_empty() {
        return Err(StrataError::new(
            "The fs store requires a 'path' parameter",
            ErrorKind::ConfigurationError,
        ));
    }
    let root = format!("{}{}", host, path);

    let mut config = FsStoreConfig::new(root);
    if let Some(create) = params.get_bool(CREATE_IF_MISSING_PARAMETER) {
        config = config.with_create_if_missing(create);
    }
    if let Some(buffer_size) = params.get_str("buffer_size") {
        let parsed: usize = buffer_size.parse().map_err(|_| {
            StrataError::new(
                &format!("Invalid buffer_size '{}'", buffer_size),
                ErrorKind::ConfigurationError,
            )
        })?;
        config = config.with_buffer_size(parsed);
    }

    let store = FilesystemStore::new(config);
    // missing or uncreatable roots fail here, at factory time, not on the
    // first get
    store.verify()?;
    Ok(KeyValueStore::new(store))
}

/// Registers the `fs` store type with the process-wide registry.
pub fn register() {
    register_with(default_registry());
}

/// Registers the `fs` store type with a specific registry.
pub fn register_with(registry: &StoreRegistry) {
    registry.register_store(FS_STORE_TYPE, from_params);
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratakv::store::KeyValueStoreProvider;
    use tempfile::TempDir;

    #[test]
    fn test_from_params_requires_a_location() {
        let err = from_params(&StoreParams::new()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
    }

    #[test]
    fn test_from_params_with_path() {
        let dir = TempDir::new().unwrap();
        let params = StoreParams::new().with("path", dir.path().to_str().unwrap());

        let store = from_params(&params).unwrap();
        store.put("key1", b"value1").unwrap();
        assert_eq!(store.get("key1").unwrap(), b"value1");
    }

    #[test]
    fn test_from_params_joins_host_and_path() {
        let dir = TempDir::new().unwrap();
        // simulates fs://<host>/<path> where host is the first segment
        let host = dir.path().to_str().unwrap();
        let params = StoreParams::new().with("host", host).with("path", "/sub");

        let store = from_params(&params).unwrap();
        store.put("key1", b"x").unwrap();
        assert!(dir.path().join("sub").join("key1").is_file());
    }

    #[test]
    fn test_from_params_honors_create_if_missing_false() {
        let dir = TempDir::new().unwrap();
        let absent = dir.path().join("absent");
        let params = StoreParams::new()
            .with("path", absent.to_str().unwrap())
            .with(CREATE_IF_MISSING_PARAMETER, false);

        let err = from_params(&params).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FileNotFound);
    }

    #[test]
    fn test_from_params_rejects_bad_buffer_size() {
        let dir = TempDir::new().unwrap();
        let params = StoreParams::new()
            .with("path", dir.path().to_str().unwrap())
            .with("buffer_size", "not-a-number");

        let err = from_params(&params).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
    }

    #[test]
    fn test_register_with_makes_type_buildable() {
        let registry = StoreRegistry::with_defaults();
        assert!(!registry.has_store_type(FS_STORE_TYPE));

        register_with(&registry);
        assert!(registry.has_store_type(FS_STORE_TYPE));

        let dir = TempDir::new().unwrap();
        let params = StoreParams::new().with("path", dir.path().to_str().unwrap());
        let store = registry.create_store(FS_STORE_TYPE, &params).unwrap();
        store.put("key1", b"value1").unwrap();
        assert_eq!(store.get("key1").unwrap(), b"value1");
    }

    #[test]
    fn test_registered_type_composes_with_decorators() {
        let registry = StoreRegistry::with_defaults();
        register_with(&registry);

        let dir = TempDir::new().unwrap();
        let params = StoreParams::new().with("path", dir.path().to_str().unwrap());
        let base = registry.create_store(FS_STORE_TYPE, &params).unwrap();
        let store = registry
            .decorate(
                base,
                &stratakv::factory::DecoratorSpec::new("urlencode", None),
            )
            .unwrap();

        // keys a bare filesystem store cannot hold work through encoding
        store.put("dir/with space", b"x").unwrap();
        assert_eq!(store.get("dir/with space").unwrap(), b"x");
        assert!(dir.path().join("dir%2Fwith+space").is_file());
    }

    #[test]
    fn test_register_into_default_registry() {
        register();
        assert!(default_registry().has_store_type(FS_STORE_TYPE));
    }
}
