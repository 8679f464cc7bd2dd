use std::path::{Path, PathBuf};

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Filesystem store configuration.
///
/// Holds everything needed to (re)connect to the store's root directory.
/// The configuration is the durable part of a [`crate::FilesystemStore`]:
/// it is cloneable, comparable, and (with the `serde` feature) exactly
/// what gets serialized when a store instance is persisted. The resolved
/// root handle is derived from it lazily and is never part of the
/// serialized form.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FsStoreConfig {
    root: PathBuf,
    create_if_missing: bool,
    buffer_size: usize,
}

impl FsStoreConfig {
    /// Creates a configuration for the given root directory with default
    /// settings: the root is created if missing and streaming copies use a
    /// 64 KiB buffer.
    pub fn new(root: impl Into<PathBuf>) -> FsStoreConfig {
        FsStoreConfig {
            root: root.into(),
            create_if_missing: true,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Whether the root directory is created on first use if absent.
    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Buffer size for streaming get_file/put_file copies.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn create_if_missing(&self) -> bool {
        self.create_if_missing
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FsStoreConfig::new("/data/store");
        assert_eq!(config.root(), Path::new("/data/store"));
        assert!(config.create_if_missing());
        assert_eq!(config.buffer_size(), DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_builder_overrides() {
        let config = FsStoreConfig::new("/data")
            .with_create_if_missing(false)
            .with_buffer_size(512);
        assert!(!config.create_if_missing());
        assert_eq!(config.buffer_size(), 512);
    }

    #[test]
    fn test_buffer_size_never_zero() {
        let config = FsStoreConfig::new("/data").with_buffer_size(0);
        assert_eq!(config.buffer_size(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serde_round_trip() {
        let config = FsStoreConfig::new("/data/store")
            .with_create_if_missing(false)
            .with_buffer_size(1024);
        let encoded = serde_json::to_string(&config).unwrap();
        let decoded: FsStoreConfig = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, config);
    }
}
