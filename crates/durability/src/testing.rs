//! Fault injection for guarded writes
//!
//! Writers that emit some bytes and then fail, for exercising the
//! restore path of [`WriteGuard`](crate::WriteGuard) without a broken disk.
//!
//! # Example
//!
//! ```ignore
//! use storecat_durability::testing::fail_after_writing;
//!
//! let result = guard.overwrite_with(&path, fail_after_writing(b"[{\"Sku".to_vec()));
//! assert!(result.is_err());
//! ```

use std::io::{self, Write};

/// Writer body that writes `prefix` and then fails like a full disk
pub fn fail_after_writing(prefix: Vec<u8>) -> impl FnOnce(&mut dyn Write) -> io::Result<()> {
    move |w: &mut dyn Write| {
        w.write_all(&prefix)?;
        w.flush()?;
        Err(io::Error::new(
            io::ErrorKind::Other,
            "injected write failure",
        ))
    }
}

/// Writer body that fails before writing anything
pub fn fail_immediately() -> impl FnOnce(&mut dyn Write) -> io::Result<()> {
    |_w: &mut dyn Write| {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "injected open failure",
        ))
    }
}
