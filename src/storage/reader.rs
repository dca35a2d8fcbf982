//! Cache entry reader

use std::io::ErrorKind;
use std::path::Path;

use bytes::Bytes;

use crate::Result;

/// Read a cache entry, returning `None` when the file does not exist
///
/// # Errors
///
/// Returns error if the file exists but cannot be read
pub fn read_entry(path: &Path) -> Result<Option<Bytes>> {
    match std::fs::read(path) {
        Ok(contents) => Ok(Some(Bytes::from(contents))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
