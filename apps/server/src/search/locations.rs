//! Known place names across every kind.

use crate::db::EntityStore;
use crate::Result;
use careway_models::{profile, EntityKind};
use futures::future::try_join_all;
use std::collections::HashSet;

/// Sorted, de-duplicated place strings from the location fields of active
/// entities. Comparison is case-insensitive and the first spelling seen wins.
#[tracing::instrument(name = "search.locations", skip(store))]
pub async fn list_known_locations(store: &dyn EntityStore) -> Result<Vec<String>> {
    let per_kind = try_join_all(
        EntityKind::ALL
            .iter()
            .map(|kind| store.location_values(*kind, profile(*kind).location_fields)),
    )
    .await?;

    Ok(dedupe_places(per_kind.into_iter().flatten()))
}

fn dedupe_places(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut places: Vec<String> = values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && seen.insert(v.to_lowercase()))
        .collect();
    places.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    places
}
