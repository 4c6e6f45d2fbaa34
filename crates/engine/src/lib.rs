//! Catalog engine for storecat
//!
//! This crate orchestrates the lower layers:
//! - CatalogStore: the public data-access surface (open, query, save, delete)
//! - Merge cache: TTL-cached merged view of patch and base
//! - Query engine: category, search, and price filters over a view
//! - Modifier index: category → known modifiers, rebuilt in the background
//! - Configuration via `storecat.toml`
//!
//! The engine is the only component that knows about:
//! - Routing a mutation to the store that owns the item
//! - Serializing disk access behind the store lock
//! - Cache invalidation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod background;
pub mod builder;
pub mod cancel;
pub mod config;
pub mod merge_cache;
pub mod modifier_index;
pub mod query;
pub mod store;

pub use background::BackgroundRebuilder;
pub use builder::CatalogStoreBuilder;
pub use cancel::CancellationToken;
pub use config::{CatalogConfig, ModifierRefresh, CONFIG_FILE_NAME};
pub use merge_cache::{MergeCache, MergedView};
pub use modifier_index::ModifierIndex;
pub use query::{run_query, CatalogQuery, CategoryFilter, SortOrder};
pub use store::CatalogStore;
