//! CatalogStore: the public data-access surface
//!
//! This module provides the orchestrator that ties the lower layers together:
//! - Merged, cached reads (`query`, `get`, `categories`, provenance)
//! - Mutations routed to the right physical store (`save`, `delete`,
//!   `update_modifiers`)
//! - SKU allocation
//! - The category → modifiers index
//!
//! ## Locking
//!
//! One store-wide mutex serializes every path that touches disk: all
//! mutations and the cache rebuild. Reads served from a fresh cache never
//! take it. The mutex is acquired with the configured patience; when that
//! runs out the caller gets `Error::Busy`, which is distinct from a negative
//! `Ok(false)` result and is never retried internally.
//!
//! ## Item lifecycle
//!
//! ```text
//! Absent ──save──▶ PatchOnly ──save──▶ PatchOnly ──delete──▶ Absent
//! BaseOnly ──save──▶ BaseOnly ──delete──▶ Absent
//! ```
//!
//! Items never migrate between the stores: once base-resident, every edit
//! is an in-place base edit.

use parking_lot::{Mutex, MutexGuard};
use std::path::Path;
use std::sync::Arc;
use storecat_core::{
    CatalogItem, Error, PrototypeResolver, Provenance, Result, SkuId, MIN_GENERATED_SKU,
};
use storecat_durability::CatalogPaths;
use storecat_storage::{BaseCatalog, PatchStore};
use tracing::{info, warn};

use crate::background::BackgroundRebuilder;
use crate::builder::CatalogStoreBuilder;
use crate::cancel::CancellationToken;
use crate::config::{CatalogConfig, ModifierRefresh};
use crate::merge_cache::{MergeCache, MergedView};
use crate::modifier_index::ModifierIndex;
use crate::query::{run_query, CatalogQuery};

// ============================================================================
// Shared State
// ============================================================================

/// State shared between the store handle and its background worker
pub(crate) struct StoreShared {
    pub(crate) paths: CatalogPaths,
    pub(crate) config: CatalogConfig,
    pub(crate) patch: PatchStore,
    pub(crate) base: BaseCatalog,
    pub(crate) cache: MergeCache,
    pub(crate) modifiers: ModifierIndex,
    pub(crate) resolver: Option<Arc<dyn PrototypeResolver>>,
    write_lock: Mutex<()>,
}

impl StoreShared {
    pub(crate) fn new(
        paths: CatalogPaths,
        config: CatalogConfig,
        resolver: Option<Arc<dyn PrototypeResolver>>,
    ) -> Self {
        let guard = config.write_guard();
        let patch = PatchStore::new(paths.patch(), guard).with_pretty(config.pretty_json);
        let base = BaseCatalog::new(paths.catalog(), guard).with_pretty(config.pretty_json);
        let cache = MergeCache::new(config.cache_ttl());

        Self {
            paths,
            config,
            patch,
            base,
            cache,
            modifiers: ModifierIndex::new(),
            resolver,
            write_lock: Mutex::new(()),
        }
    }

    /// Acquire the store lock within the configured patience
    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        let timeout = self.config.lock_timeout();
        let guard = if timeout.is_zero() {
            self.write_lock.try_lock()
        } else {
            self.write_lock.try_lock_for(timeout)
        };

        guard.ok_or_else(|| {
            warn!(
                waited_ms = timeout.as_millis() as u64,
                "Catalog store busy, lock not acquired"
            );
            Error::Busy { waited: timeout }
        })
    }

    /// Merged view; takes the lock only when a rebuild is needed
    fn view(&self) -> Result<Arc<MergedView>> {
        if let Some(view) = self.cache.fresh() {
            return Ok(view);
        }
        let _guard = self.lock()?;
        self.view_locked(false)
    }

    /// Merged view for a caller that already holds the lock
    ///
    /// Re-checks freshness: another thread may have rebuilt while this one
    /// waited for the lock.
    fn view_locked(&self, force_refresh: bool) -> Result<Arc<MergedView>> {
        self.cache.get_view(force_refresh, &self.patch, &self.base)
    }

    pub(crate) fn warm_cache(&self) -> Result<Arc<MergedView>> {
        self.view()
    }

    /// Replace the cached view after a successful write
    ///
    /// Runs under the lock the writer already holds, so readers and the
    /// index worker find a fresh view without contending for it. A failed
    /// rebuild leaves the cache expired; the next read retries.
    fn publish_locked(&self) {
        self.cache.invalidate();
        if let Err(e) = self.view_locked(true) {
            warn!(error = %e, "Merged view rebuild after write failed");
        }
    }

    /// Rebuild the modifier index from the most recent view
    ///
    /// Never takes the store lock while a view is cached. Writers publish a
    /// new view before releasing the lock, so the cached one already holds
    /// their changes.
    pub(crate) fn refresh_modifiers(&self) -> Result<()> {
        let view = match self.cache.last() {
            Some(view) => view,
            None => self.view()?,
        };
        self.modifiers.rebuild(&view);
        Ok(())
    }
}

// ============================================================================
// CatalogStore
// ============================================================================

/// Catalog persistence and consistency engine
///
/// Construct once at application start and share by reference (or `Arc`)
/// with every consumer. All methods take `&self` and are safe to call from
/// multiple threads.
///
/// # Example
///
/// ```ignore
/// use storecat_engine::{CatalogQuery, CatalogStore};
///
/// let store = CatalogStore::open("/data/catalog")?;
/// let sku = store.next_sku_id()?;
/// store.save(&item_with(sku))?;
/// let hats = store.query(&CatalogQuery::new("Hats", ""))?;
/// ```
pub struct CatalogStore {
    shared: Arc<StoreShared>,
    rebuilder: BackgroundRebuilder,
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("root", &self.shared.paths.root())
            .field("cache_fresh", &self.shared.cache.is_fresh())
            .field("modifier_index_built", &self.shared.modifiers.is_built())
            .finish()
    }
}

impl CatalogStore {
    /// Open the catalog in `dir`, reading (or creating) `storecat.toml`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::builder(dir).open()
    }

    /// Open the catalog in `dir` with an explicit configuration
    ///
    /// The config file is neither read nor written.
    pub fn open_with_config(dir: impl AsRef<Path>, config: CatalogConfig) -> Result<Self> {
        Self::builder(dir).config(config).open()
    }

    /// Builder for resolver and config options
    pub fn builder(dir: impl AsRef<Path>) -> CatalogStoreBuilder {
        CatalogStoreBuilder::new(dir)
    }

    pub(crate) fn from_parts(shared: Arc<StoreShared>, rebuilder: BackgroundRebuilder) -> Self {
        Self { shared, rebuilder }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Entries of the merged view matching `query`
    pub fn query(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>> {
        self.query_with_cancel(query, &CancellationToken::new())
    }

    /// Like [`query`](Self::query), checking `cancel` while filtering
    ///
    /// # Errors
    ///
    /// `Error::Cancelled` once the token is cancelled; `Error::Busy` or an
    /// I/O error if the cache needed a rebuild that could not be done.
    pub fn query_with_cancel(
        &self,
        query: &CatalogQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogItem>> {
        let view = self.shared.view()?;
        run_query(view.items(), query, self.shared.resolver.as_deref(), cancel)
    }

    /// Entry with `sku` from the merged view
    pub fn get(&self, sku: SkuId) -> Result<Option<CatalogItem>> {
        Ok(self.shared.view()?.get(sku).cloned())
    }

    /// Distinct category names, ascending
    pub fn categories(&self) -> Result<Vec<String>> {
        Ok(self.shared.view()?.categories().to_vec())
    }

    /// True if the authoritative copy of `sku` lives in the patch
    pub fn is_from_patch(&self, sku: SkuId) -> Result<bool> {
        Ok(self.shared.view()?.is_from_patch(sku))
    }

    /// Which store holds `sku`, or `None` if it is absent
    pub fn provenance(&self, sku: SkuId) -> Result<Option<Provenance>> {
        Ok(self.shared.view()?.provenance(sku))
    }

    /// Current merged view snapshot
    pub fn view(&self) -> Result<Arc<MergedView>> {
        self.shared.view()
    }

    /// Rebuild the merged view from disk now
    pub fn refresh(&self) -> Result<Arc<MergedView>> {
        let _guard = self.shared.lock()?;
        self.shared.view_locked(true)
    }

    /// Expire the cached view; the next read rebuilds
    pub fn invalidate_cache(&self) {
        self.shared.cache.invalidate();
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Save `item`
    ///
    /// New SKUs and SKUs already in the patch go to the patch; SKUs that live
    /// in the base catalog are updated there in place. Returns the store that
    /// received the write.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` if a base-resident SKU vanished from the base
    /// document before the write; `Error::Busy` if the lock was not acquired.
    pub fn save(&self, item: &CatalogItem) -> Result<Provenance> {
        let sku = item.sku_id;
        let target = {
            let _guard = self.shared.lock()?;
            let view = self.shared.view_locked(false)?;
            let target = match view.provenance(sku) {
                Some(Provenance::Base) => Provenance::Base,
                Some(Provenance::Patch) | None => Provenance::Patch,
            };

            match target {
                Provenance::Patch => self.shared.patch.upsert(item)?,
                Provenance::Base => {
                    if !self.shared.base.update_entry_in_place(item)? {
                        self.shared.cache.invalidate();
                        warn!(sku = %sku, "Base entry disappeared before in-place update");
                        return Err(Error::NotFound(sku));
                    }
                }
            }
            self.shared.publish_locked();
            target
        };

        info!(sku = %sku, store = %target, "Catalog item saved");
        self.after_mutation();
        Ok(target)
    }

    /// Remove `sku` from both stores
    ///
    /// Returns true if either store held it. Nothing is written when
    /// neither did.
    pub fn delete(&self, sku: SkuId) -> Result<bool> {
        let removed = {
            let _guard = self.shared.lock()?;
            let from_patch = self.shared.patch.remove(sku)?;
            if from_patch {
                self.shared.cache.invalidate();
            }
            let from_base = self.shared.base.remove_entry(sku)?;
            if from_base {
                self.shared.cache.invalidate();
            }
            let removed = from_patch || from_base;
            if removed {
                self.shared.publish_locked();
            }
            removed
        };

        if removed {
            info!(sku = %sku, "Catalog item deleted");
            self.after_mutation();
        }
        Ok(removed)
    }

    /// Replace only the modifiers of `item.sku_id`, in whichever store holds it
    ///
    /// Returns false if the SKU is not in the catalog.
    pub fn update_modifiers(&self, item: &CatalogItem) -> Result<bool> {
        let sku = item.sku_id;
        let updated = {
            let _guard = self.shared.lock()?;
            let view = self.shared.view_locked(false)?;
            let updated = match view.provenance(sku) {
                Some(Provenance::Patch) => self
                    .shared
                    .patch
                    .update_modifiers_only(sku, &item.modifiers)?,
                Some(Provenance::Base) => self
                    .shared
                    .base
                    .update_modifiers_only(sku, &item.modifiers)?,
                None => false,
            };
            if updated {
                self.shared.publish_locked();
            }
            updated
        };

        if updated {
            info!(sku = %sku, modifiers = item.modifiers.len(), "Catalog item modifiers updated");
            self.after_mutation();
        }
        Ok(updated)
    }

    // ========================================================================
    // SKU allocation
    // ========================================================================

    /// Next free SKU: one past the current maximum, never below 1000
    pub fn next_sku_id(&self) -> Result<SkuId> {
        let view = self.shared.view()?;
        let floor = SkuId(MIN_GENERATED_SKU);
        match view.max_sku() {
            None => Ok(floor),
            Some(max) => max
                .checked_next()
                .map(|next| next.max(floor))
                .ok_or(Error::SkuSpaceExhausted),
        }
    }

    // ========================================================================
    // Modifier index
    // ========================================================================

    /// Known modifiers of `category`, sorted; empty if unknown or not built
    pub fn category_modifiers(&self, category: &str) -> Vec<String> {
        self.shared.modifiers.category_modifiers(category)
    }

    /// True once the modifier index has been built at least once
    pub fn modifier_index_ready(&self) -> bool {
        self.shared.modifiers.is_built()
    }

    /// Rebuild the modifier index now, on the calling thread
    pub fn rebuild_modifier_index(&self) -> Result<()> {
        self.shared.refresh_modifiers()
    }

    /// Block until queued background rebuilds have finished
    pub fn wait_for_background(&self) {
        self.rebuilder.drain();
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Document paths
    pub fn paths(&self) -> &CatalogPaths {
        &self.shared.paths
    }

    /// Active configuration
    pub fn config(&self) -> &CatalogConfig {
        &self.shared.config
    }

    fn after_mutation(&self) {
        if self.shared.config.modifier_refresh == ModifierRefresh::OnInvalidate {
            self.rebuilder.request();
        }
    }
}
