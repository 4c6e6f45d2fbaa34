//! Crash-safe single-file overwrite
//!
//! Every overwrite of a catalog document goes through [`WriteGuard`]:
//!
//! 1. Copy the current file to `<file>.bak` (replacing any older backup)
//! 2. Stream the new content into `<file>.tmp`, flush, fsync
//! 3. Rename `<file>.tmp` over `<file>` (atomic on POSIX), fsync the directory
//!
//! If step 2 or 3 fails the temp file is removed and, should the target no
//! longer match the backup, it is restored from `<file>.bak` before the error
//! is returned. Readers therefore only ever observe the previous content or
//! the new content, including across a crash: the target is never opened for
//! writing in place.
//!
//! ## Usage
//!
//! ```ignore
//! let guard = WriteGuard::new();
//! guard.overwrite_json(&path, &document, true)?;
//! ```

use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Suffix of the backup written before every overwrite
pub const BACKUP_SUFFIX: &str = ".bak";
/// Suffix of the in-flight temp file
pub const TEMP_SUFFIX: &str = ".tmp";

// ============================================================================
// Errors
// ============================================================================

/// Guarded overwrite errors
#[derive(Debug, thiserror::Error)]
pub enum WriteGuardError {
    /// Could not copy the current file to its backup; nothing was written
    #[error("failed to back up {path}: {source}")]
    Backup {
        /// Target path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Writing or renaming failed; the previous content is in place
    #[error("failed to write {path}: {source}")]
    Write {
        /// Target path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Writing failed and so did restoring the backup
    #[error("failed to write {path} ({source}); restore from backup also failed: {restore}")]
    Restore {
        /// Target path
        path: PathBuf,
        /// Error from the write
        source: io::Error,
        /// Error from the restore
        restore: io::Error,
    },

    /// Startup recovery could not clean up
    #[error("failed to recover {path}: {source}")]
    Recover {
        /// Target path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

impl WriteGuardError {
    /// Target path of the failed operation
    pub fn path(&self) -> &Path {
        match self {
            WriteGuardError::Backup { path, .. }
            | WriteGuardError::Write { path, .. }
            | WriteGuardError::Restore { path, .. }
            | WriteGuardError::Recover { path, .. } => path,
        }
    }
}

impl From<WriteGuardError> for storecat_core::Error {
    fn from(e: WriteGuardError) -> Self {
        storecat_core::Error::WriteFailed {
            path: e.path().to_path_buf(),
            detail: e.to_string(),
        }
    }
}

/// What [`WriteGuard::recover`] had to do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryAction {
    /// A stale temp file from an interrupted write was removed
    pub removed_temp: bool,
    /// The target was missing and was restored from its backup
    pub restored_from_backup: bool,
}

// ============================================================================
// Write Guard
// ============================================================================

/// Crash-safe overwrite primitive shared by both stores
#[derive(Debug, Clone, Copy)]
pub struct WriteGuard {
    fsync: bool,
}

impl Default for WriteGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteGuard {
    /// Create a guard that fsyncs every write
    pub fn new() -> Self {
        WriteGuard { fsync: true }
    }

    /// Enable or disable fsync (tests and throwaway catalogs)
    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    /// `<path>.bak`
    pub fn backup_path(path: &Path) -> PathBuf {
        with_suffix(path, BACKUP_SUFFIX)
    }

    /// `<path>.tmp`
    pub fn temp_path(path: &Path) -> PathBuf {
        with_suffix(path, TEMP_SUFFIX)
    }

    /// Overwrite `path` with `bytes`
    pub fn overwrite(&self, path: &Path, bytes: &[u8]) -> Result<(), WriteGuardError> {
        self.overwrite_with(path, |w| w.write_all(bytes))
    }

    /// Overwrite `path` with `value` serialized as JSON
    ///
    /// Serialization streams straight into the temp file; a serializer
    /// failure is handled like any other write failure.
    pub fn overwrite_json<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
        pretty: bool,
    ) -> Result<(), WriteGuardError> {
        self.overwrite_with(path, |w| {
            let result = if pretty {
                serde_json::to_writer_pretty(&mut *w, value)
            } else {
                serde_json::to_writer(&mut *w, value)
            };
            result.map_err(io::Error::from)
        })
    }

    /// Overwrite `path` with whatever `write` produces
    ///
    /// `write` receives a buffered writer over the temp file. Any error it
    /// returns aborts the overwrite and leaves the previous content in place.
    pub fn overwrite_with<F>(&self, path: &Path, write: F) -> Result<(), WriteGuardError>
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        let backup = Self::backup_path(path);
        let temp = Self::temp_path(path);
        let had_original = path.exists();

        if had_original {
            fs::copy(path, &backup).map_err(|source| WriteGuardError::Backup {
                path: path.to_path_buf(),
                source,
            })?;
            debug!(path = %path.display(), backup = %backup.display(), "Backup written");
        }

        // Clean up stale temp file if exists (from previous failed attempt)
        if temp.exists() {
            warn!(path = %temp.display(), "Removing stale temp file");
            let _ = fs::remove_file(&temp);
        }

        let result = self
            .write_temp(&temp, write)
            .and_then(|()| fs::rename(&temp, path));

        match result {
            Ok(()) => {
                self.sync_parent(path);
                debug!(path = %path.display(), "Guarded overwrite completed");
                Ok(())
            }
            Err(source) => {
                warn!(
                    path = %path.display(),
                    error = %source,
                    "Overwrite failed, cleaning up temp file"
                );
                let _ = fs::remove_file(&temp);

                if had_original {
                    if let Err(restore) = restore_if_changed(path, &backup) {
                        error!(
                            path = %path.display(),
                            error = %restore,
                            "Restore from backup failed"
                        );
                        return Err(WriteGuardError::Restore {
                            path: path.to_path_buf(),
                            source,
                            restore,
                        });
                    }
                }

                Err(WriteGuardError::Write {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Startup hygiene for `path`
    ///
    /// Removes a temp file left by an interrupted write. The target is
    /// restored from its backup only when it is missing and a temp file was
    /// found, since a missing target with no temp file was removed on purpose.
    pub fn recover(path: &Path) -> Result<RecoveryAction, WriteGuardError> {
        let mut action = RecoveryAction::default();
        let recover_err = |source| WriteGuardError::Recover {
            path: path.to_path_buf(),
            source,
        };

        let temp = Self::temp_path(path);
        if temp.exists() {
            warn!(path = %temp.display(), "Removing temp file left by interrupted write");
            fs::remove_file(&temp).map_err(recover_err)?;
            action.removed_temp = true;
        }

        let backup = Self::backup_path(path);
        if action.removed_temp && !path.exists() && backup.exists() {
            warn!(
                path = %path.display(),
                backup = %backup.display(),
                "Document missing, restoring from backup"
            );
            fs::copy(&backup, path).map_err(recover_err)?;
            action.restored_from_backup = true;
        }

        Ok(action)
    }

    fn write_temp<F>(&self, temp: &Path, write: F) -> io::Result<()>
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        if let Some(parent) = temp.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(temp)?);
        write(&mut writer)?;
        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        if self.fsync {
            file.sync_all()?;
        }
        Ok(())
    }

    #[cfg(unix)]
    fn sync_parent(&self, path: &Path) {
        if !self.fsync {
            return;
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
                debug!(path = %parent.display(), error = %e, "Directory fsync skipped");
            }
        }
    }

    #[cfg(not(unix))]
    fn sync_parent(&self, _path: &Path) {}
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Put the backup back if the target is missing or no longer matches it
fn restore_if_changed(path: &Path, backup: &Path) -> io::Result<()> {
    let expected = fs::read(backup)?;
    match fs::read(path) {
        Ok(current) if current == expected => Ok(()),
        _ => {
            warn!(path = %path.display(), "Restoring document from backup");
            fs::write(path, &expected)
        }
    }
}
