//! Error types for the catalog store
//!
//! This module defines all error types surfaced to callers of the store.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! "Not found" on delete or modifier updates is a normal negative result
//! (`Ok(false)`), not an error. `NotFound` is reserved for an in-place base
//! edit whose target vanished between check and write.

use crate::types::SkuId;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the catalog store
#[derive(Debug, Error)]
pub enum Error {
    /// Target SKU absent from the expected store at mutation time
    #[error("SKU {0} not found")]
    NotFound(SkuId),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A document on disk could not be deserialized
    #[error("Corrupt document {path}: {detail}")]
    Corrupt {
        /// Document path
        path: PathBuf,
        /// Parser message
        detail: String,
    },

    /// A guarded overwrite failed; previous content was kept or restored
    #[error("Write to {path} failed: {detail}")]
    WriteFailed {
        /// Target path
        path: PathBuf,
        /// What went wrong
        detail: String,
    },

    /// Caller-supplied item is malformed
    #[error("Invalid catalog item: {0}")]
    Validation(String),

    /// The store-wide lock was not acquired in time
    #[error("Catalog store busy: lock not acquired within {waited:?}")]
    Busy {
        /// How long the caller waited
        waited: Duration,
    },

    /// Cooperative cancellation observed during a query
    #[error("Query cancelled")]
    Cancelled,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// No SKU id left above the current maximum
    #[error("SKU id space exhausted")]
    SkuSpaceExhausted,
}

impl Error {
    /// Create a corrupt-document error
    pub fn corrupt(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        Error::Corrupt {
            path: path.into(),
            detail: detail.to_string(),
        }
    }

    /// Disk read, write, or deserialize failure
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Corrupt { .. } | Error::WriteFailed { .. }
        )
    }

    /// Lock contention rather than a negative result
    pub fn is_busy(&self) -> bool {
        matches!(self, Error::Busy { .. })
    }
}
