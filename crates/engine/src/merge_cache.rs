//! Merged view of Patch ∪ Base with a TTL cache
//!
//! The merged view lists patch entries first, then base entries. Any SKU
//! that appears in the patch shadows the base copy, and the merge drops the
//! shadowed base entry so readers never see two entries for one SKU.
//!
//! Views are immutable `Arc` snapshots: a query keeps working on the view it
//! started with while a writer invalidates and a reader rebuilds.
//!
//! ## Freshness
//!
//! A view is served until `ttl` has elapsed since it was built or until
//! `invalidate` is called. A failed rebuild keeps the previous view around
//! (stale but available) and reports the error.

use parking_lot::RwLock;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use storecat_core::{CatalogDocument, CatalogItem, PatchDocument, Provenance, Result, SkuId};
use storecat_storage::{BaseCatalog, PatchStore};
use tracing::{debug, info, warn};

// ============================================================================
// MergedView
// ============================================================================

/// Immutable merged snapshot of both documents
#[derive(Debug, Clone)]
pub struct MergedView {
    items: Vec<CatalogItem>,
    categories: Vec<String>,
    patch_skus: HashSet<SkuId>,
    built_at: Instant,
}

impl MergedView {
    /// Merge `patch` over `base`
    pub fn build(patch: PatchDocument, base: CatalogDocument) -> Self {
        let mut items = Vec::with_capacity(patch.len() + base.entries.len());
        let mut seen = HashSet::with_capacity(items.capacity());
        let mut patch_skus = HashSet::with_capacity(patch.len());
        let mut shadowed = 0usize;

        for item in patch {
            if seen.insert(item.sku_id) {
                patch_skus.insert(item.sku_id);
                items.push(item);
            } else {
                shadowed += 1;
            }
        }
        for item in base.entries {
            if seen.insert(item.sku_id) {
                items.push(item);
            } else {
                shadowed += 1;
            }
        }
        if shadowed > 0 {
            debug!(shadowed, "Dropped shadowed duplicate entries during merge");
        }

        let categories = items
            .iter()
            .map(|item| item.category.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            items,
            categories,
            patch_skus,
            built_at: Instant::now(),
        }
    }

    /// View with no entries
    pub fn empty() -> Self {
        Self::build(PatchDocument::new(), CatalogDocument::default())
    }

    /// Merged entries, patch first
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Distinct category names, ascending
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// True if the authoritative copy of `sku` lives in the patch
    pub fn is_from_patch(&self, sku: SkuId) -> bool {
        self.patch_skus.contains(&sku)
    }

    /// Which store holds `sku`, or `None` if it is absent
    pub fn provenance(&self, sku: SkuId) -> Option<Provenance> {
        if self.patch_skus.contains(&sku) {
            Some(Provenance::Patch)
        } else if self.items.iter().any(|item| item.sku_id == sku) {
            Some(Provenance::Base)
        } else {
            None
        }
    }

    /// Entry with `sku`
    pub fn get(&self, sku: SkuId) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.sku_id == sku)
    }

    /// Largest SKU in the view
    pub fn max_sku(&self) -> Option<SkuId> {
        self.items.iter().map(|item| item.sku_id).max()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// When this view was built
    pub fn built_at(&self) -> Instant {
        self.built_at
    }
}

// ============================================================================
// MergeCache
// ============================================================================

#[derive(Debug, Default)]
struct CacheState {
    view: Option<Arc<MergedView>>,
    /// `None` means expired: the next read rebuilds
    valid_since: Option<Instant>,
    rebuilds: u64,
}

/// TTL cache over the merged view
#[derive(Debug)]
pub struct MergeCache {
    ttl: Duration,
    state: RwLock<CacheState>,
}

impl MergeCache {
    /// Create an empty cache
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Configured TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached view if it is still fresh
    pub fn fresh(&self) -> Option<Arc<MergedView>> {
        let state = self.state.read();
        match (state.valid_since, &state.view) {
            (Some(since), Some(view)) if since.elapsed() < self.ttl => Some(Arc::clone(view)),
            _ => None,
        }
    }

    /// The cached view regardless of freshness
    pub fn last(&self) -> Option<Arc<MergedView>> {
        self.state.read().view.clone()
    }

    /// True if a read would be served without a rebuild
    pub fn is_fresh(&self) -> bool {
        self.fresh().is_some()
    }

    /// Number of completed rebuilds
    pub fn rebuild_count(&self) -> u64 {
        self.state.read().rebuilds
    }

    /// Cached view, rebuilding from both stores when forced or expired
    ///
    /// Rebuilding reads the documents from disk; callers serialize it
    /// against writers.
    pub fn get_view(
        &self,
        force_refresh: bool,
        patch: &PatchStore,
        base: &BaseCatalog,
    ) -> Result<Arc<MergedView>> {
        if !force_refresh {
            if let Some(view) = self.fresh() {
                debug!(entries = view.len(), "Merged view served from cache");
                return Ok(view);
            }
        }
        self.rebuild(patch, base)
    }

    /// Expire the cached view; the next read rebuilds
    ///
    /// The old view stays available through [`last`](Self::last).
    pub fn invalidate(&self) {
        self.state.write().valid_since = None;
    }

    fn rebuild(&self, patch: &PatchStore, base: &BaseCatalog) -> Result<Arc<MergedView>> {
        let started = Instant::now();
        let loaded = patch
            .load()
            .and_then(|patch_doc| base.load().map(|base_doc| (patch_doc, base_doc)));

        let (patch_doc, base_doc) = match loaded {
            Ok(docs) => docs,
            Err(e) => {
                warn!(
                    error = %e,
                    has_previous = self.state.read().view.is_some(),
                    "Merged view rebuild failed, keeping previous view"
                );
                return Err(e);
            }
        };

        let patch_entries = patch_doc.len();
        let base_entries = base_doc.entries.len();
        let view = Arc::new(MergedView::build(patch_doc, base_doc));

        let mut state = self.state.write();
        state.view = Some(Arc::clone(&view));
        state.valid_since = Some(view.built_at());
        state.rebuilds += 1;
        drop(state);

        info!(
            patch_entries,
            base_entries,
            merged = view.len(),
            categories = view.categories().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Merged view rebuilt"
        );
        Ok(view)
    }
}
