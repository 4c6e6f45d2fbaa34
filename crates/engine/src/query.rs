//! Query / filter engine over a merged view snapshot
//!
//! A query narrows the merged view by category, free-text search, and an
//! inclusive price range, then optionally sorts the result. Filtering runs
//! on the rayon pool; the snapshot is immutable, so workers share it freely.
//!
//! Search is a case-insensitive substring match, surrounding whitespace
//! included, against:
//! - the title of any localization
//! - the decimal SKU id
//! - the decimal prototype reference of any primary or bonus component
//! - the resolved prototype name, when a resolver is attached

use rayon::prelude::*;
use std::cmp::Ordering;
use storecat_core::{CatalogItem, PrototypeResolver, Result, ALL_CATEGORIES};

use crate::cancel::CancellationToken;

// ============================================================================
// Query Types
// ============================================================================

/// Category restriction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every category
    #[default]
    All,
    /// Exactly this category name
    Named(String),
}

impl CategoryFilter {
    /// `"All"` is the wildcard; anything else is an exact name
    pub fn parse(category: &str) -> Self {
        if category == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(category.to_string())
        }
    }

    fn matches(&self, item: &CatalogItem) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => item.category.name == *name,
        }
    }
}

/// Result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Merged order: patch entries first, then base in document order
    #[default]
    Merged,
    /// Canonical title, case-insensitive
    Title,
    /// Canonical price, ascending
    Price,
    /// SKU id, ascending
    SkuId,
    /// Legacy category order, then SKU id
    CategoryOrder,
}

/// Filter over the merged view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogQuery {
    /// Category restriction
    pub category: CategoryFilter,
    /// Free-text search; empty matches everything
    pub search: String,
    /// Inclusive lower price bound
    pub price_min: Option<i32>,
    /// Inclusive upper price bound
    pub price_max: Option<i32>,
    /// Result ordering
    pub sort: SortOrder,
}

impl CatalogQuery {
    /// Query by category name (`"All"` for every category) and search text
    pub fn new(category: &str, search: impl Into<String>) -> Self {
        Self {
            category: CategoryFilter::parse(category),
            search: search.into(),
            ..Default::default()
        }
    }

    /// Every entry in merged order
    pub fn all() -> Self {
        Self::default()
    }

    /// Set both price bounds
    pub fn with_price_range(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    /// Set the result ordering
    pub fn sorted_by(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    fn matches_price(&self, item: &CatalogItem) -> bool {
        if self.price_min.is_none() && self.price_max.is_none() {
            return true;
        }
        item.localizations.iter().any(|l| {
            self.price_min.map_or(true, |min| l.price >= min)
                && self.price_max.map_or(true, |max| l.price <= max)
        })
    }
}

// ============================================================================
// Execution
// ============================================================================

struct Matcher<'a> {
    query: &'a CatalogQuery,
    needle: String,
    resolver: Option<&'a dyn PrototypeResolver>,
}

impl<'a> Matcher<'a> {
    fn new(query: &'a CatalogQuery, resolver: Option<&'a dyn PrototypeResolver>) -> Self {
        Self {
            query,
            needle: query.search.to_lowercase(),
            resolver,
        }
    }

    fn matches(&self, item: &CatalogItem) -> bool {
        self.query.category.matches(item) && self.query.matches_price(item) && self.matches_search(item)
    }

    fn matches_search(&self, item: &CatalogItem) -> bool {
        let needle = self.needle.as_str();
        if needle.is_empty() {
            return true;
        }
        if item
            .localizations
            .iter()
            .any(|l| l.title.to_lowercase().contains(needle))
        {
            return true;
        }
        if item.sku_id.to_string().contains(needle) {
            return true;
        }
        item.components().any(|c| {
            c.prototype_ref.to_string().contains(needle)
                || self.resolver.map_or(false, |resolver| {
                    resolver
                        .resolve_name(c.prototype_ref)
                        .map_or(false, |name| name.to_lowercase().contains(needle))
                })
        })
    }
}

/// Filter and sort `items` according to `query`
///
/// The token is checked once per item; a cancelled token yields
/// `Error::Cancelled` and no partial result.
pub fn run_query(
    items: &[CatalogItem],
    query: &CatalogQuery,
    resolver: Option<&dyn PrototypeResolver>,
    cancel: &CancellationToken,
) -> Result<Vec<CatalogItem>> {
    cancel.check()?;
    let matcher = Matcher::new(query, resolver);

    let mut matched: Vec<CatalogItem> = items
        .par_iter()
        .filter_map(|item| {
            if let Err(e) = cancel.check() {
                return Some(Err(e));
            }
            matcher.matches(item).then(|| Ok(item.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    sort_items(&mut matched, query.sort);
    Ok(matched)
}

fn sort_items(items: &mut [CatalogItem], sort: SortOrder) {
    let by_sku = |a: &CatalogItem, b: &CatalogItem| a.sku_id.cmp(&b.sku_id);
    match sort {
        SortOrder::Merged => {}
        SortOrder::Title => items.sort_by(|a, b| {
            compare_titles(a.title(), b.title()).then_with(|| by_sku(a, b))
        }),
        SortOrder::Price => items.sort_by(|a, b| {
            let price = |item: &CatalogItem| item.canonical().map(|l| l.price);
            price(a).cmp(&price(b)).then_with(|| by_sku(a, b))
        }),
        SortOrder::SkuId => items.sort_by(by_sku),
        SortOrder::CategoryOrder => items.sort_by(|a, b| {
            a.category
                .order
                .cmp(&b.category.order)
                .then_with(|| a.category.name.cmp(&b.category.name))
                .then_with(|| by_sku(a, b))
        }),
    }
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}
