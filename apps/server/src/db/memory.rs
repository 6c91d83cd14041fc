//! In-memory directory store
//!
//! Evaluates the same predicate tree as the PostgreSQL backend against a fixed set
//! of records. Used for local development (seeded from a JSON fixture) and tests.

use crate::db::query::{EntityQuery, SortOrder};
use crate::db::traits::{CategoryStore, EntityStore};
use crate::{Error, Result};
use async_trait::async_trait;
use careway_models::{profile, Category, Entity, EntityKind, FieldPath};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Fixture layout accepted by [`InMemoryDirectoryStore::from_json`].
#[derive(Debug, Default, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectoryStore {
    entities: Vec<Entity>,
    categories: Vec<Category>,
    full_text: bool,
    unavailable: HashSet<EntityKind>,
    categories_unavailable: bool,
}

impl InMemoryDirectoryStore {
    pub fn new(entities: Vec<Entity>, categories: Vec<Category>) -> Self {
        Self {
            entities,
            categories,
            ..Default::default()
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let seed: DirectorySeed = serde_json::from_str(raw)
            .map_err(|e| Error::Config(format!("invalid directory seed: {e}")))?;
        Ok(Self::new(seed.entities, seed.categories))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read seed file {}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Serve `full_text` queries with a word-level index emulation.
    pub fn with_full_text(mut self, enabled: bool) -> Self {
        self.full_text = enabled;
        self
    }

    /// Make every query against `kind` fail as if the backing store were down.
    pub fn with_unavailable_kind(mut self, kind: EntityKind) -> Self {
        self.unavailable.insert(kind);
        self
    }

    pub fn with_categories_unavailable(mut self) -> Self {
        self.categories_unavailable = true;
        self
    }

    fn check_kind(&self, kind: EntityKind) -> Result<()> {
        if self.unavailable.contains(&kind) {
            return Err(Error::StoreUnavailable(format!(
                "{} store is not reachable",
                kind.selector()
            )));
        }
        Ok(())
    }

    fn check_categories(&self) -> Result<()> {
        if self.categories_unavailable {
            return Err(Error::StoreUnavailable(
                "category store is not reachable".to_string(),
            ));
        }
        Ok(())
    }
}

/// Every query word must appear as a whole word in the kind's text fields.
fn full_text_matches(entity: &Entity, text: &str) -> bool {
    let words: HashSet<String> = profile(entity.kind)
        .text_fields
        .iter()
        .flat_map(|field| entity.field_strings(field))
        .flat_map(|value| {
            value
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
        })
        .collect();

    let mut terms = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .peekable();
    terms.peek().is_some() && terms.all(|term| words.contains(&term.to_lowercase()))
}

fn compare_numbers_desc(a: &Entity, b: &Entity, field: &FieldPath) -> Ordering {
    match (a.field_number(field), b.field_number(field)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare(sort: SortOrder, a: &Entity, b: &Entity) -> Ordering {
    let primary = match sort {
        SortOrder::Distance => a
            .distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal),
        SortOrder::NameAscending => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortOrder::FieldDescending(field) => compare_numbers_desc(a, b, &field),
        SortOrder::NewestFirst => b.created_at.cmp(&a.created_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl EntityStore for InMemoryDirectoryStore {
    async fn find(&self, query: &EntityQuery) -> Result<Vec<Entity>> {
        self.check_kind(query.kind)?;
        if query.is_unsatisfiable() {
            return Ok(Vec::new());
        }

        let mut matched: Vec<Entity> = Vec::new();
        for entity in &self.entities {
            if entity.kind != query.kind || !entity.is_active {
                continue;
            }
            if !query.predicate.evaluate(entity) {
                continue;
            }
            if let Some(text) = &query.full_text {
                if !self.full_text || !full_text_matches(entity, text) {
                    continue;
                }
            }
            let mut entity = entity.clone();
            if let Some(near) = query.near {
                let Some(location) = entity.location else {
                    continue;
                };
                let distance = near.point.distance_km(&location);
                if distance > near.max_distance_km {
                    continue;
                }
                entity.distance_km = Some(distance);
            }
            matched.push(entity);
        }

        let sort = match query.sort {
            SortOrder::Distance if query.near.is_none() => SortOrder::NameAscending,
            other => other,
        };
        matched.sort_by(|a, b| compare(sort, a, b));

        Ok(matched
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .collect())
    }

    fn supports_full_text(&self) -> bool {
        self.full_text
    }

    async fn location_values(
        &self,
        kind: EntityKind,
        fields: &[FieldPath],
    ) -> Result<Vec<String>> {
        self.check_kind(kind)?;
        let mut values = BTreeSet::new();
        for entity in self.entities.iter().filter(|e| e.kind == kind && e.is_active) {
            for field in fields {
                values.extend(
                    entity
                        .field_strings(field)
                        .into_iter()
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(str::to_string),
                );
            }
        }
        Ok(values.into_iter().collect())
    }
}

#[async_trait]
impl CategoryStore for InMemoryDirectoryStore {
    async fn find_active(&self, needle: &str) -> Result<Vec<Category>> {
        self.check_categories()?;
        let mut found: Vec<Category> = self
            .categories
            .iter()
            .filter(|c| c.is_active && c.matches(needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(found)
    }

    async fn list_active(&self, limit: usize) -> Result<Vec<Category>> {
        self.check_categories()?;
        let mut active: Vec<Category> = self
            .categories
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        active.truncate(limit);
        Ok(active)
    }
}
