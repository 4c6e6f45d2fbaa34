//! Catalog data model
//!
//! This module defines the foundational catalog types:
//! - SkuId: Unique identifier of a catalog item, the merge key
//! - PrototypeRef: Reference into the external game-prototype catalog
//! - CatalogItem: The catalog's unit of sale
//! - CatalogDocument: The bulk base document (`Catalog.json`)
//! - PatchDocument: The overlay document (`CatalogPatch.json`, a bare array)
//!
//! All on-disk field names are PascalCase to match the documents shipped
//! with the store. Fields that the store never interprets (`InfoLinks`,
//! `ContentAssets`, `UrlSets`) are carried as raw JSON, and every struct keeps
//! undeclared fields in `extra`, so a load/save cycle never drops data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{Error, Result};

/// Smallest SKU id handed out by SKU allocation.
///
/// Generated ids never fall below this floor so they cannot collide with
/// small reserved or legacy values.
pub const MIN_GENERATED_SKU: u64 = 1000;

/// Category name that matches every category in queries.
pub const ALL_CATEGORIES: &str = "All";

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier of a catalog item across the merged view
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SkuId(pub u64);

impl SkuId {
    /// Raw numeric value
    pub fn get(self) -> u64 {
        self.0
    }

    /// The next id, or `None` on overflow
    pub fn checked_next(self) -> Option<SkuId> {
        self.0.checked_add(1).map(SkuId)
    }
}

impl From<u64> for SkuId {
    fn from(value: u64) -> Self {
        SkuId(value)
    }
}

impl fmt::Display for SkuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a prototype in the external game-data catalog
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PrototypeRef(pub u64);

impl fmt::Display for PrototypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Catalog Item
// ============================================================================

/// A granted item: prototype plus quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Component {
    /// Prototype granted on purchase
    pub prototype_ref: PrototypeRef,
    /// How many are granted (at least 1 for a valid item)
    pub quantity: u32,
    /// Fields this model does not declare, carried through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Component {
    /// Create a component
    pub fn new(prototype_ref: u64, quantity: u32) -> Self {
        Self {
            prototype_ref: PrototypeRef(prototype_ref),
            quantity,
            extra: Map::new(),
        }
    }
}

/// Per-language presentation and pricing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Localization {
    /// Language identifier, e.g. `en_us`
    pub language_id: String,
    /// Display title
    pub title: String,
    /// Display description
    pub description: String,
    /// Price in store currency
    pub price: i32,
    /// Release date as shipped (opaque string)
    pub release_date: String,
    /// Fields this model does not declare, carried through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Localization {
    /// Create a localization with empty description and release date
    pub fn new(language_id: impl Into<String>, title: impl Into<String>, price: i32) -> Self {
        Self {
            language_id: language_id.into(),
            title: title.into(),
            price,
            ..Default::default()
        }
    }
}

/// Item classification plus the legacy display-ordering hint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Category {
    /// Category name
    pub name: String,
    /// Display order inherited from legacy data
    pub order: i32,
    /// Fields this model does not declare, carried through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Category {
    /// Create a category
    pub fn new(name: impl Into<String>, order: i32) -> Self {
        Self {
            name: name.into(),
            order,
            extra: Map::new(),
        }
    }
}

/// Free-form tag scoped to a category
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Modifier {
    /// Tag name
    pub name: String,
    /// Display order
    pub order: i32,
    /// Fields this model does not declare, carried through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Modifier {
    /// Create a modifier
    pub fn new(name: impl Into<String>, order: i32) -> Self {
        Self {
            name: name.into(),
            order,
            extra: Map::new(),
        }
    }
}

/// The catalog's unit of sale
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CatalogItem {
    /// Primary key across the merged view
    pub sku_id: SkuId,
    /// Items granted on purchase
    pub primary_components: Vec<Component>,
    /// Secondary grant set, may be empty
    pub bonus_components: Vec<Component>,
    /// Per-language entries; index 0 is the canonical locale
    pub localizations: Vec<Localization>,
    /// Per-language URL descriptors, carried through unchanged
    pub info_links: Vec<Value>,
    /// Per-language asset descriptors, carried through unchanged
    pub content_assets: Vec<Value>,
    /// Classification
    pub category: Category,
    /// Tags scoped to the category
    pub modifiers: Vec<Modifier>,
    /// Fields this model does not declare, carried through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogItem {
    /// Create an item with a SKU, a category, and a canonical localization
    pub fn new(sku_id: impl Into<SkuId>, category: Category, canonical: Localization) -> Self {
        Self {
            sku_id: sku_id.into(),
            category,
            localizations: vec![canonical],
            ..Default::default()
        }
    }

    /// Add a primary component
    pub fn with_component(mut self, prototype_ref: u64, quantity: u32) -> Self {
        self.primary_components
            .push(Component::new(prototype_ref, quantity));
        self
    }

    /// Add a bonus component
    pub fn with_bonus(mut self, prototype_ref: u64, quantity: u32) -> Self {
        self.bonus_components
            .push(Component::new(prototype_ref, quantity));
        self
    }

    /// Add a modifier
    pub fn with_modifier(mut self, name: impl Into<String>, order: i32) -> Self {
        self.modifiers.push(Modifier::new(name, order));
        self
    }

    /// Add a localization
    pub fn with_localization(mut self, localization: Localization) -> Self {
        self.localizations.push(localization);
        self
    }

    /// Canonical (index 0) localization, used for default display and sorting
    pub fn canonical(&self) -> Option<&Localization> {
        self.localizations.first()
    }

    /// Canonical title, or an empty string for an item without localizations
    pub fn title(&self) -> &str {
        self.canonical().map(|l| l.title.as_str()).unwrap_or("")
    }

    /// Primary then bonus components
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.primary_components
            .iter()
            .chain(self.bonus_components.iter())
    }

    /// Caller-side validation.
    ///
    /// The store never calls this; editors run it before handing an item
    /// to `save`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the item has no localization, an empty
    /// canonical title, or a component with quantity 0.
    pub fn validate(&self) -> Result<()> {
        let canonical = self.canonical().ok_or_else(|| {
            Error::Validation(format!("SKU {} has no localizations", self.sku_id))
        })?;
        if canonical.title.trim().is_empty() {
            return Err(Error::Validation(format!(
                "SKU {} has an empty canonical title",
                self.sku_id
            )));
        }
        if let Some(component) = self.components().find(|c| c.quantity == 0) {
            return Err(Error::Validation(format!(
                "SKU {} grants prototype {} with quantity 0",
                self.sku_id, component.prototype_ref
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Documents
// ============================================================================

/// The bulk base document stored in `Catalog.json`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CatalogDocument {
    /// Last-modified time, whole seconds since the Unix epoch
    pub timestamp_seconds: i64,
    /// Sub-second part of the last-modified time
    pub timestamp_microseconds: i64,
    /// Catalog entries in shipped order
    pub entries: Vec<CatalogItem>,
    /// URL sets, carried through unchanged
    pub url_sets: Vec<Value>,
    /// Client hint, carried through unchanged
    pub client_must_download_images: bool,
    /// Fields this model does not declare, carried through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogDocument {
    /// Position of the entry with `sku`
    pub fn position(&self, sku: SkuId) -> Option<usize> {
        self.entries.iter().position(|e| e.sku_id == sku)
    }

    /// Stamp the document with `now`
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.timestamp_seconds = now.timestamp();
        self.timestamp_microseconds = i64::from(now.timestamp_subsec_micros());
    }
}

/// The overlay document stored in `CatalogPatch.json`, a bare array
pub type PatchDocument = Vec<CatalogItem>;

/// Which physical store holds the authoritative copy of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    /// The patch overlay
    Patch,
    /// The base catalog
    Base,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Patch => write!(f, "patch"),
            Provenance::Base => write!(f, "base"),
        }
    }
}
