//! Data access layer - read-only directory stores

pub mod memory;
pub mod query;
pub mod query_builder;
pub mod store;
pub mod traits;

pub use memory::InMemoryDirectoryStore;
pub use query::{EntityQuery, Proximity, SortOrder};
pub use store::PostgresDirectoryStore;
pub use traits::{CategoryStore, EntityStore};
