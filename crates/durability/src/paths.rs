//! Catalog directory structure
//!
//! A catalog is a directory holding two JSON documents, each with an
//! adjacent backup written before every overwrite:
//!
//! ```text
//! catalog/
//! ├── storecat.toml            # Store configuration
//! ├── Catalog.json             # Base catalog (object with `Entries`)
//! ├── Catalog.json.bak
//! ├── CatalogPatch.json        # Patch overlay (bare array)
//! └── CatalogPatch.json.bak
//! ```

use std::path::{Path, PathBuf};

use crate::write_guard::WriteGuard;

/// Default base catalog file name
pub const CATALOG_FILE_NAME: &str = "Catalog.json";
/// Default patch overlay file name
pub const PATCH_FILE_NAME: &str = "CatalogPatch.json";

/// Catalog directory paths
#[derive(Debug, Clone)]
pub struct CatalogPaths {
    root: PathBuf,
    catalog_file: String,
    patch_file: String,
}

impl CatalogPaths {
    /// Create paths from root directory with the default file names
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        CatalogPaths {
            root: root.as_ref().to_path_buf(),
            catalog_file: CATALOG_FILE_NAME.to_string(),
            patch_file: PATCH_FILE_NAME.to_string(),
        }
    }

    /// Override the document file names
    pub fn with_file_names(
        mut self,
        catalog_file: impl Into<String>,
        patch_file: impl Into<String>,
    ) -> Self {
        self.catalog_file = catalog_file.into();
        self.patch_file = patch_file.into();
        self
    }

    /// Root catalog directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Base catalog document
    pub fn catalog(&self) -> PathBuf {
        self.root.join(&self.catalog_file)
    }

    /// Patch overlay document
    pub fn patch(&self) -> PathBuf {
        self.root.join(&self.patch_file)
    }

    /// Backup of the base catalog document
    pub fn catalog_backup(&self) -> PathBuf {
        WriteGuard::backup_path(&self.catalog())
    }

    /// Backup of the patch overlay document
    pub fn patch_backup(&self) -> PathBuf {
        WriteGuard::backup_path(&self.patch())
    }

    /// Create the catalog directory if missing
    pub fn create_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }
}
