//! Service layer
//!
//! Sits between the HTTP handlers and the search core: validates what the
//! calling layer is responsible for and applies caller-role visibility.

pub mod directory;

pub use directory::{DirectoryService, SearchInput};
