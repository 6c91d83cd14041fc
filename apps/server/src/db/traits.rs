//! Read-only storage traits consumed by the search core

use crate::{db::query::EntityQuery, Result};
use async_trait::async_trait;
use careway_models::{Category, Entity, EntityKind, FieldPath};

/// Entity store for one or more provider kinds.
///
/// Implementations must only ever return active entities and must report any
/// access failure as [`crate::Error::StoreUnavailable`].
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Run a filtered, sorted, paginated query against one kind.
    async fn find(&self, query: &EntityQuery) -> Result<Vec<Entity>>;

    /// Whether `EntityQuery::full_text` is backed by an inverted index.
    ///
    /// When this returns `false` the matchers never set `full_text` and go
    /// straight to substring matching.
    fn supports_full_text(&self) -> bool;

    /// Raw values of the given location fields across active entities of a kind.
    async fn location_values(&self, kind: EntityKind, fields: &[FieldPath])
        -> Result<Vec<String>>;
}

/// Category lookups used by category resolution and typeahead defaults.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Active categories whose name, heading or specialization contains `needle`
    /// (case-insensitive), ordered by name.
    async fn find_active(&self, needle: &str) -> Result<Vec<Category>>;

    /// Active categories ordered by name.
    async fn list_active(&self, limit: usize) -> Result<Vec<Category>>;
}
