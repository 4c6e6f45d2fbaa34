//! Category → known modifiers
//!
//! Derived from the merged view by grouping entries on `Category.Name` and
//! collecting the distinct `Modifiers.Name` values of each group. Editors
//! use it to offer the tags already in use for a category.
//!
//! The index is read-only between rebuilds. Rebuilds replace the whole map
//! at once; readers see either the old or the new map.

use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use storecat_core::CatalogItem;
use tracing::debug;

use crate::merge_cache::MergedView;

#[derive(Debug, Default)]
struct IndexState {
    by_category: HashMap<String, BTreeSet<String>>,
    builds: u64,
}

/// Category name → distinct modifier names
#[derive(Debug, Default)]
pub struct ModifierIndex {
    state: RwLock<IndexState>,
}

impl ModifierIndex {
    /// Create an index that has not been built yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Group `items` by category and collect modifier names
    pub fn compute(items: &[CatalogItem]) -> HashMap<String, BTreeSet<String>> {
        let mut by_category: HashMap<String, BTreeSet<String>> = HashMap::new();
        for item in items {
            let names = by_category.entry(item.category.name.clone()).or_default();
            names.extend(
                item.modifiers
                    .iter()
                    .filter(|m| !m.name.trim().is_empty())
                    .map(|m| m.name.clone()),
            );
        }
        by_category
    }

    /// Replace the index contents from `view`
    pub fn rebuild(&self, view: &MergedView) {
        let by_category = Self::compute(view.items());
        let categories = by_category.len();

        let mut state = self.state.write();
        state.by_category = by_category;
        state.builds += 1;
        debug!(categories, builds = state.builds, "Modifier index rebuilt");
    }

    /// Known modifiers of `category`, sorted; empty if unknown
    pub fn category_modifiers(&self, category: &str) -> Vec<String> {
        self.state
            .read()
            .by_category
            .get(category)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// True once the first build has finished
    pub fn is_built(&self) -> bool {
        self.state.read().builds > 0
    }

    /// Number of completed builds
    pub fn build_count(&self) -> u64 {
        self.state.read().builds
    }
}
