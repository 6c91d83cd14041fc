//! Place-name predicates over each kind's location fields.

use careway_models::{FieldPath, Predicate};

/// Predicate satisfied when any of `fields` contains `place` (case-insensitive).
///
/// A missing or blank place is the always-true predicate.
pub fn build_location_predicate(place: Option<&str>, fields: &[FieldPath]) -> Predicate {
    let Some(place) = place.map(str::trim).filter(|p| !p.is_empty()) else {
        return Predicate::Always;
    };
    Predicate::or(
        fields
            .iter()
            .map(|field| Predicate::contains(*field, place)),
    )
}
