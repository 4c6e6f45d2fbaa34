//! Store configuration via `storecat.toml`
//!
//! On first open, a default `storecat.toml` is created in the catalog
//! directory. To change settings, edit the file and reopen the store.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use storecat_core::{Error, Result};
use storecat_durability::{CatalogPaths, WriteGuard, CATALOG_FILE_NAME, PATCH_FILE_NAME};

/// Config file name placed in the catalog directory.
pub const CONFIG_FILE_NAME: &str = "storecat.toml";

/// When the modifier index is rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierRefresh {
    /// Rebuild in the background after every successful mutation
    #[default]
    OnInvalidate,
    /// Build once at open; rebuild only on explicit request
    StartupOnly,
}

/// Store configuration loaded from `storecat.toml`.
///
/// # Example
///
/// ```toml
/// cache_ttl_secs = 300
/// lock_timeout_ms = 10000
/// modifier_refresh = "on_invalidate"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base catalog file name inside the catalog directory
    pub catalog_file: String,
    /// Patch overlay file name inside the catalog directory
    pub patch_file: String,
    /// How long a merged view is served before it is rebuilt from disk
    pub cache_ttl_secs: u64,
    /// How long a mutation waits for the store lock; 0 fails fast
    pub lock_timeout_ms: u64,
    /// Modifier index rebuild policy
    pub modifier_refresh: ModifierRefresh,
    /// Pretty-print documents on write
    pub pretty_json: bool,
    /// fsync documents and their directory on write
    pub fsync: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            catalog_file: CATALOG_FILE_NAME.to_string(),
            patch_file: PATCH_FILE_NAME.to_string(),
            cache_ttl_secs: 300,
            lock_timeout_ms: 10_000,
            modifier_refresh: ModifierRefresh::OnInvalidate,
            pretty_json: true,
            fsync: true,
        }
    }
}

impl CatalogConfig {
    /// Create config for testing
    ///
    /// Skips fsync; everything else is the default.
    pub fn for_testing() -> Self {
        Self {
            fsync: false,
            ..Self::default()
        }
    }

    /// Set the cache TTL in whole seconds (0 = rebuild on every read)
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Set how long mutations wait for the lock
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the modifier index rebuild policy
    pub fn with_modifier_refresh(mut self, refresh: ModifierRefresh) -> Self {
        self.modifier_refresh = refresh;
        self
    }

    /// Cache TTL
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Lock patience
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Paths of the catalog documents under `root`
    pub fn paths(&self, root: &Path) -> CatalogPaths {
        CatalogPaths::from_root(root).with_file_names(&self.catalog_file, &self.patch_file)
    }

    /// Write guard matching this config
    pub fn write_guard(&self) -> WriteGuard {
        WriteGuard::new().with_fsync(self.fsync)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a file name is empty, contains a path
    /// separator, or both documents share one file.
    pub fn validate(&self) -> Result<()> {
        for (field, name) in [("catalog_file", &self.catalog_file), ("patch_file", &self.patch_file)] {
            if name.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", field)));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(Error::Config(format!(
                    "{} must be a bare file name, got '{}'",
                    field, name
                )));
            }
        }
        if self.catalog_file == self.patch_file {
            return Err(Error::Config(format!(
                "catalog_file and patch_file must differ (both '{}')",
                self.catalog_file
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# storecat catalog store configuration

# Document file names inside this directory
catalog_file = "Catalog.json"
patch_file = "CatalogPatch.json"

# Seconds a merged view is served before it is rebuilt from disk
cache_ttl_secs = 300

# Milliseconds a save/delete waits for the store lock before failing busy.
# 0 = fail fast.
lock_timeout_ms = 10000

# Modifier index rebuild policy: "on_invalidate" or "startup_only"
modifier_refresh = "on_invalidate"

# Pretty-print JSON documents
pretty_json = true

# fsync documents on every write
fsync = true
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CatalogConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
