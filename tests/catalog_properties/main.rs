//! Integration tests for catalog behavior seen through `CatalogStore`.
//!
//! Unit tests in crates/*/src/ cover each layer in isolation. These tests
//! open a real store on a temp directory and check the properties callers
//! rely on: one entry per SKU, stable base order, no-op deletes, SKU
//! allocation, cache freshness, and the modifier index.

#[path = "../common/mod.rs"]
mod common;

mod merged_view;
mod mutations;
mod sku_allocation;
