//! Store builder for fluent configuration
//!
//! Provides a builder for opening a catalog store with an explicit config
//! or an attached prototype resolver.

use std::path::PathBuf;
use std::sync::Arc;
use storecat_core::{Error, PrototypeResolver, Result};
use storecat_durability::WriteGuard;
use tracing::{info, warn};

use crate::background::BackgroundRebuilder;
use crate::config::{CatalogConfig, CONFIG_FILE_NAME};
use crate::store::{CatalogStore, StoreShared};

/// Name of the background modifier-index thread
const REBUILD_THREAD_NAME: &str = "storecat-index";

// ============================================================================
// CatalogStore Builder
// ============================================================================

/// Builder for [`CatalogStore`]
///
/// ```ignore
/// use storecat_engine::{CatalogConfig, CatalogStore};
/// use storecat_core::StaticResolver;
///
/// // 1. Config from `storecat.toml` (created with defaults if missing)
/// let store = CatalogStore::open("/data/catalog")?;
///
/// // 2. Explicit config; the config file is left alone
/// let store = CatalogStore::open_with_config("/data/catalog", CatalogConfig::default())?;
///
/// // 3. With a resolver so searches match prototype names
/// let store = CatalogStore::builder("/data/catalog")
///     .resolver(StaticResolver::new().with(555, "Wizard Hat"))
///     .open()?;
/// ```
pub struct CatalogStoreBuilder {
    root: PathBuf,
    config: Option<CatalogConfig>,
    resolver: Option<Arc<dyn PrototypeResolver>>,
}

impl std::fmt::Debug for CatalogStoreBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStoreBuilder")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

impl CatalogStoreBuilder {
    /// Builder for the catalog directory `root`
    pub fn new(root: impl AsRef<std::path::Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config: None,
            resolver: None,
        }
    }

    /// Use `config` instead of reading `storecat.toml`
    pub fn config(mut self, config: CatalogConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Attach a prototype name resolver
    pub fn resolver(self, resolver: impl PrototypeResolver + 'static) -> Self {
        self.resolver_arc(Arc::new(resolver))
    }

    /// Attach a shared prototype name resolver
    pub fn resolver_arc(mut self, resolver: Arc<dyn PrototypeResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Open the store
    ///
    /// Creates the directory if needed, cleans up after any interrupted
    /// write, and queues the first modifier-index build.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, the directory cannot be
    /// created, recovery fails, or the worker thread cannot be spawned.
    pub fn open(self) -> Result<CatalogStore> {
        std::fs::create_dir_all(&self.root)?;

        let config = match self.config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => {
                let config_path = self.root.join(CONFIG_FILE_NAME);
                CatalogConfig::write_default_if_missing(&config_path)?;
                CatalogConfig::from_file(&config_path)?
            }
        };

        let paths = config.paths(&self.root);
        paths.create_directories()?;

        for document in [paths.catalog(), paths.patch()] {
            let action = WriteGuard::recover(&document)?;
            if action.removed_temp || action.restored_from_backup {
                info!(
                    path = %document.display(),
                    removed_temp = action.removed_temp,
                    restored_from_backup = action.restored_from_backup,
                    "Recovered interrupted write"
                );
            }
        }

        let shared = Arc::new(StoreShared::new(paths, config, self.resolver));
        // Nothing else holds the lock yet; building here lets the index
        // worker start from a cached view.
        if let Err(e) = shared.warm_cache() {
            warn!(error = %e, "Initial merged view build failed, first read retries");
        }

        let job_shared = Arc::clone(&shared);
        let rebuilder = BackgroundRebuilder::spawn(REBUILD_THREAD_NAME, move || {
            if let Err(e) = job_shared.refresh_modifiers() {
                warn!(error = %e, "Modifier index rebuild failed");
            }
        })
        .map_err(Error::Io)?;
        rebuilder.request();

        info!(
            root = %shared.paths.root().display(),
            cache_ttl_secs = shared.config.cache_ttl_secs,
            lock_timeout_ms = shared.config.lock_timeout_ms,
            resolver = shared.resolver.is_some(),
            "Catalog store opened"
        );

        Ok(CatalogStore::from_parts(shared, rebuilder))
    }
}
