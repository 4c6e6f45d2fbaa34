//! Cooperative cancellation for queries
//!
//! Cancellation is only honored on the read path. Mutations never observe
//! a token, so cancelling can never leave a document half written.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use storecat_core::{Error, Result};

/// Shared cancellation flag; clones observe the same flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create an uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// True once `cancel` has been called on any clone
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// `Err(Error::Cancelled)` once cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
