//! File-per-entry cache store
//!
//! Each recorded body lives in `<cache dir>/<key>`. There is no index: the
//! file name fully encodes the lookup key.

mod reader;
mod writer;

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::config::Options;
use crate::fingerprint::CacheKey;
use crate::{RepriseError, Result};

pub use reader::read_entry;
pub use writer::write_entry;

/// Cache store rooted at an absolute directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    directory: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at `directory`
    #[must_use]
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    /// Create a store for the absolute cache directory of `options`
    ///
    /// # Errors
    ///
    /// Returns error if the cache directory cannot be resolved
    pub fn from_options(options: &Options) -> Result<Self> {
        Ok(Self::new(options.absolute_cache_dir()?))
    }

    /// Absolute cache directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Absolute path of the entry for `key`
    #[must_use]
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.directory.join(key.as_str())
    }

    /// Create the cache directory if it is missing
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn ensure_dir(&self) -> Result<()> {
        if self.directory.is_dir() {
            return Ok(());
        }
        debug!("Creating cache directory {}", self.directory.display());
        std::fs::create_dir_all(&self.directory)?;
        Ok(())
    }

    /// Check whether an entry exists for `key`
    #[must_use]
    pub fn exists(&self, key: &CacheKey) -> bool {
        self.path_for(key).is_file()
    }

    /// Read the entry for `key`, if present
    ///
    /// # Errors
    ///
    /// Returns error if the entry exists but cannot be read
    pub fn lookup(&self, key: &CacheKey) -> Result<Option<Bytes>> {
        read_entry(&self.path_for(key))
    }

    /// Read the entry for `key`
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if no entry exists, or an I/O error
    pub fn read(&self, key: &CacheKey) -> Result<Bytes> {
        self.lookup(key)?
            .ok_or_else(|| RepriseError::EntryNotFound(key.to_string()))
    }

    /// Write the entry for `key`, replacing any previous entry
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be written
    pub fn write(&self, key: &CacheKey, contents: &[u8]) -> Result<()> {
        self.ensure_dir()?;
        write_entry(&self.directory, &self.path_for(key), contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{compute_key, FingerprintOptions, RequestDescriptor};
    use tempfile::TempDir;

    fn test_key(path: &str) -> CacheKey {
        let descriptor = RequestDescriptor {
            method: "GET".to_string(),
            host: "example.com".to_string(),
            path: path.to_string(),
            query: String::new(),
            body: Bytes::new(),
            identity: String::new(),
        };
        compute_key(&descriptor, FingerprintOptions::default())
    }

    #[test]
    fn test_write_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().join("nested").join("cache"));
        let key = test_key("/api/test");

        store.write(&key, b"hello\n").unwrap();

        assert!(store.directory().is_dir());
        assert!(store.exists(&key));
        assert_eq!(
            std::fs::read(store.path_for(&key)).unwrap(),
            b"hello\n".to_vec()
        );
    }

    #[test]
    fn test_read_missing_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().to_path_buf());
        let key = test_key("/missing");

        assert!(!store.exists(&key));
        assert!(store.lookup(&key).unwrap().is_none());
        assert!(matches!(
            store.read(&key),
            Err(RepriseError::EntryNotFound(name)) if name == key.as_str()
        ));
    }

    #[test]
    fn test_write_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().to_path_buf());
        let key = test_key("/api/test");

        store.write(&key, b"first recording with a longer body").unwrap();
        store.write(&key, b"second").unwrap();

        assert_eq!(store.read(&key).unwrap(), Bytes::from_static(b"second"));
    }

    #[test]
    fn test_write_leaves_no_temporary_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().to_path_buf());

        store.write(&test_key("/a"), b"a").unwrap();
        store.write(&test_key("/b"), b"b").unwrap();

        let names: Vec<String> = std::fs::read_dir(store.directory())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|name| name.ends_with(".json")));
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().join("cache"));

        store.ensure_dir().unwrap();
        store.ensure_dir().unwrap();

        assert!(store.directory().is_dir());
    }

    #[test]
    fn test_from_options() {
        let temp_dir = TempDir::new().unwrap();
        let options = Options::new(crate::config::Mode::ReplayOnly)
            .with_base_dir(temp_dir.path())
            .with_cache_dir("fixtures");

        let store = CacheStore::from_options(&options).unwrap();
        assert_eq!(store.directory(), temp_dir.path().join("fixtures"));
    }
}
