//! Collaborator seams
//!
//! The store consumes a prototype-name lookup from the external game-data
//! catalog. Lookups are best-effort: a miss is not an error and callers show
//! the raw numeric reference instead.

use std::collections::HashMap;

use crate::types::PrototypeRef;

/// Resolves prototype references to display names
///
/// Thread safety: implementations are shared across query worker threads.
pub trait PrototypeResolver: Send + Sync {
    /// Display name for `prototype_ref`, or `None` if unknown
    fn resolve_name(&self, prototype_ref: PrototypeRef) -> Option<String>;
}

/// Resolved name, falling back to the raw number
pub fn display_name(resolver: &dyn PrototypeResolver, prototype_ref: PrototypeRef) -> String {
    resolver
        .resolve_name(prototype_ref)
        .unwrap_or_else(|| prototype_ref.to_string())
}

/// Map-backed resolver for fixtures and preloaded name tables
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    names: HashMap<PrototypeRef, String>,
}

impl StaticResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name
    pub fn with(mut self, prototype_ref: u64, name: impl Into<String>) -> Self {
        self.names.insert(PrototypeRef(prototype_ref), name.into());
        self
    }

    /// Number of known names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no names are registered
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl PrototypeResolver for StaticResolver {
    fn resolve_name(&self, prototype_ref: PrototypeRef) -> Option<String> {
        self.names.get(&prototype_ref).cloned()
    }
}

impl<F> PrototypeResolver for F
where
    F: Fn(PrototypeRef) -> Option<String> + Send + Sync,
{
    fn resolve_name(&self, prototype_ref: PrototypeRef) -> Option<String> {
        self(prototype_ref)
    }
}
