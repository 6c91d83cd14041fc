//! Backend-neutral query description

use careway_models::{DefaultSort, EntityKind, FieldPath, GeoPoint, Predicate};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    pub point: GeoPoint,
    pub max_distance_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Nearest first. Only meaningful together with a proximity restriction.
    Distance,
    NameAscending,
    FieldDescending(FieldPath),
    NewestFirst,
}

impl From<DefaultSort> for SortOrder {
    fn from(sort: DefaultSort) -> Self {
        match sort {
            DefaultSort::FieldDescending(field) => SortOrder::FieldDescending(field),
            DefaultSort::NameAscending => SortOrder::NameAscending,
            DefaultSort::NewestFirst => SortOrder::NewestFirst,
        }
    }
}

/// One read against the entity store. Inactive entities are always excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityQuery {
    pub kind: EntityKind,
    pub predicate: Predicate,
    /// Inverted-index text query; only set when the store supports it.
    pub full_text: Option<String>,
    pub near: Option<Proximity>,
    pub sort: SortOrder,
    pub skip: usize,
    pub limit: usize,
}

impl EntityQuery {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            predicate: Predicate::Always,
            full_text: None,
            near: None,
            sort: SortOrder::NameAscending,
            skip: 0,
            limit: 20,
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn full_text(mut self, text: impl Into<String>) -> Self {
        self.full_text = Some(text.into());
        self
    }

    pub fn near(mut self, point: GeoPoint, max_distance_km: f64) -> Self {
        self.near = Some(Proximity {
            point,
            max_distance_km,
        });
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn window(mut self, skip: usize, limit: usize) -> Self {
        self.skip = skip;
        self.limit = limit;
        self
    }

    /// True when the predicate alone rules out every row.
    pub fn is_unsatisfiable(&self) -> bool {
        self.predicate.is_never() || self.limit == 0
    }
}
