//! Core types and traits for storecat
//!
//! This crate defines the foundational types used throughout the system:
//! - SkuId / PrototypeRef: Identifiers
//! - CatalogItem: The catalog's unit of sale and its parts
//! - CatalogDocument / PatchDocument: The two on-disk document shapes
//! - Provenance: Which physical store holds an item
//! - Error: Error type hierarchy
//! - PrototypeResolver: Name lookup seam for the external game-data catalog

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::{display_name, PrototypeResolver, StaticResolver};
pub use types::{
    CatalogDocument, CatalogItem, Category, Component, Localization, Modifier, PatchDocument,
    PrototypeRef, Provenance, SkuId, ALL_CATEGORIES, MIN_GENERATED_SKU,
};
