//! Domain models for the careway provider directory.
//!
//! Everything here is pure and synchronous: entity kinds and their field-mapping
//! table, the stored entity envelope, categories, coordinates, range filters and the
//! store-agnostic predicate tree that both store backends understand.

#![forbid(unsafe_code)]

mod category;
mod entity;
mod error;
mod field;
mod geo;
mod kind;
mod predicate;
mod range;

pub use category::{Category, CategoryId};
pub use entity::Entity;
pub use error::{Error, Result};
pub use field::FieldPath;
pub use geo::GeoPoint;
pub use kind::{profile, DefaultSort, EntityKind, KindProfile};
pub use predicate::Predicate;
pub use range::RangeFilter;
