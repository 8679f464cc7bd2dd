use crate::config::FsStoreConfig;
use once_cell::sync::OnceCell;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stratakv::common::check_valid_key;
use stratakv::errors::{ErrorKind, StrataError, StrataResult};
use stratakv::store::{KeyIterator, KeyIteratorProvider, KeyValueStoreProvider, ReadStream};

/// Filesystem implementation of the key-value store contract.
///
/// # Purpose
/// `FilesystemStore` stores every value as its own file directly under a
/// common root directory. The key is the file name, so keys are
/// restricted to the filename-safe character set enforced by
/// `check_valid_key`; keys with path separators or unicode go through the
/// key-encoding decorator first.
///
/// # Characteristics
/// - **Thread-Safe**: cloneable, shares one resolved root across clones
/// - **Lazy Root Handle**: the root directory is resolved (and created,
///   when configured) at most once per instance, on first use
/// - **Restorable**: with the `serde` feature a store serializes as its
///   configuration only; the root handle is re-resolved on first use
///   after deserialization
/// - **Capabilities**: advertises `copy` and `url_for`
///
/// # Usage
/// ```text
/// let config = FsStoreConfig::new("/var/data/store");
/// let store = KeyValueStore::new(FilesystemStore::new(config));
/// store.put("key1", b"value1")?;
/// ```
#[derive(Clone)]
pub struct FilesystemStore {
    inner: Arc<FilesystemStoreInner>,
}

impl FilesystemStore {
    /// Creates a new filesystem store over the configured root directory.
    ///
    /// No I/O happens here; the root is resolved on first use.
    pub fn new(config: FsStoreConfig) -> FilesystemStore {
        FilesystemStore {
            inner: Arc::new(FilesystemStoreInner {
                config,
                root_handle: OnceCell::new(),
            }),
        }
    }

    /// The configuration this store was built from.
    pub fn config(&self) -> &FsStoreConfig {
        &self.inner.config
    }

    /// Forces root resolution, surfacing a missing or uncreatable root
    /// immediately instead of on the first store operation.
    pub fn verify(&self) -> StrataResult<()> {
        self.inner.root().map(|_| ())
    }
}

struct FilesystemStoreInner {
    config: FsStoreConfig,
    // resolved at most once per instance; never serialized
    root_handle: OnceCell<PathBuf>,
}

impl FilesystemStoreInner {
    fn root(&self) -> StrataResult<&Path> {
        self.root_handle
            .get_or_try_init(|| self.resolve_root())
            .map(PathBuf::as_path)
    }

    fn resolve_root(&self) -> StrataResult<PathBuf> {
        let configured = self.config.root();
        if !configured.exists() {
            if !self.config.create_if_missing() {
                return Err(StrataError::new(
                    &format!("Root directory '{}' does not exist", configured.display()),
                    ErrorKind::FileNotFound,
                ));
            }
            log::debug!("creating store root '{}'", configured.display());
            fs::create_dir_all(configured)?;
        }
        Ok(configured.canonicalize()?)
    }

    fn build_filename(&self, key: &str) -> StrataResult<PathBuf> {
        check_valid_key(key)?;
        Ok(self.root()?.join(key))
    }

    fn copy_buffered(&self, source: &mut dyn Read, target: &mut dyn Write) -> StrataResult<u64> {
        let mut buffer = vec![0u8; self.config.buffer_size()];
        let mut copied = 0u64;
        loop {
            let read = source.read(&mut buffer)?;
            if read == 0 {
                return Ok(copied);
            }
            target.write_all(&buffer[..read])?;
            copied += read as u64;
        }
    }
}

/// Maps an IO error on a key's file to the contract's error taxonomy: a
/// missing file is an absent key, everything else stays an IO failure.
fn map_key_io_error(err: io::Error, key: &str) -> StrataError {
    if err.kind() == io::ErrorKind::NotFound {
        StrataError::new(&format!("Key '{}' not found", key), ErrorKind::NotFound)
    } else {
        err.into()
    }
}

impl KeyValueStoreProvider for FilesystemStore {
    fn get(&self, key: &str) -> StrataResult<Vec<u8>> {
        let path = self.inner.build_filename(key)?;
        fs::read(&path).map_err(|err| map_key_io_error(err, key))
    }

    fn put(&self, key: &str, data: &[u8]) -> StrataResult<String> {
        let path = self.inner.build_filename(key)?;
        fs::write(&path, data)?;
        Ok(key.to_string())
    }

    fn open(&self, key: &str) -> StrataResult<Box<dyn ReadStream>> {
        let path = self.inner.build_filename(key)?;
        let file = File::open(&path).map_err(|err| map_key_io_error(err, key))?;
        Ok(Box::new(file))
    }

    fn delete(&self, key: &str) -> StrataResult<()> {
        let path = self.inner.build_filename(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            // absent key: delete stays idempotent
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn contains(&self, key: &str) -> StrataResult<bool> {
        let path = self.inner.build_filename(key)?;
        Ok(path.try_exists()?)
    }

    fn iter_keys(&self, prefix: &str) -> StrataResult<KeyIterator> {
        let root = self.inner.root()?;
        let entries = fs::read_dir(root)?;
        Ok(KeyIterator::new(DirKeyProvider {
            entries,
            prefix: prefix.to_string(),
        }))
    }

    fn get_file(&self, key: &str, target: &mut dyn Write) -> StrataResult<u64> {
        let mut stream = self.open(key)?;
        self.inner.copy_buffered(&mut stream, target)
    }

    fn put_file(&self, key: &str, source: &mut dyn Read) -> StrataResult<String> {
        let path = self.inner.build_filename(key)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        self.inner.copy_buffered(source, &mut file)?;
        Ok(key.to_string())
    }

    fn copy(&self, source: &str, dest: &str) -> StrataResult<String> {
        let source_path = self.inner.build_filename(source)?;
        let dest_path = self.inner.build_filename(dest)?;
        fs::copy(&source_path, &dest_path).map_err(|err| map_key_io_error(err, source))?;
        Ok(dest.to_string())
    }

    fn url_for(&self, key: &str) -> StrataResult<String> {
        let path = self.inner.build_filename(key)?;
        Ok(format!("file://{}", path.display()))
    }
}

/// Lazy directory walk yielding file names matching the listing prefix.
struct DirKeyProvider {
    entries: fs::ReadDir,
    prefix: String,
}

impl KeyIteratorProvider for DirKeyProvider {
    fn next_key(&mut self) -> Option<StrataResult<String>> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err.into())),
            };

            match entry.file_type() {
                Ok(file_type) if file_type.is_file() => {}
                Ok(_) => continue,
                Err(err) => return Some(Err(err.into())),
            }

            match entry.file_name().into_string() {
                Ok(name) if name.starts_with(&self.prefix) => return Some(Ok(name)),
                Ok(_) => continue,
                Err(name) => {
                    // a foreign, non-UTF-8 file in the root is not a key
                    log::warn!("skipping non-UTF-8 entry {:?} in store root", name);
                    continue;
                }
            }
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FilesystemStore {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // the lazily-resolved root handle is excluded; only the
        // configuration is durable
        self.inner.config.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FilesystemStore {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        FsStoreConfig::deserialize(deserializer).map(FilesystemStore::new)
    }
}
