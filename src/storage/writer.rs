//! Cache entry writer
//!
//! Entries are written to a temporary file in the cache directory and renamed
//! over the target, so a reader sees either the old entry or the new one.

use std::io::Write;
use std::path::Path;

use tempfile::Builder;

use crate::Result;

const TEMP_PREFIX: &str = ".reprise-";
const TEMP_SUFFIX: &str = ".tmp";

/// Atomically replace the entry at `path` with `contents`
///
/// `directory` must be the directory containing `path`.
///
/// # Errors
///
/// Returns error if the temporary file cannot be written or renamed
pub fn write_entry(directory: &Path, path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(directory)?;

    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    Ok(())
}
