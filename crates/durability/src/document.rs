//! JSON document reads
//!
//! Both catalog documents are plain JSON files. A missing file is not an
//! error at this layer; callers decide what an absent document means.

use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::Path;
use storecat_core::{Error, Result};
use tracing::debug;

/// Read and deserialize `path`, or `None` if it does not exist
///
/// # Errors
///
/// `Error::Io` if the file cannot be read, `Error::Corrupt` if it does not
/// parse as `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Document not present");
            return Ok(None);
        }
        Err(e) => return Err(Error::Io(e)),
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| Error::corrupt(path, e))
}
