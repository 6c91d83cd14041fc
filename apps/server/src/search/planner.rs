//! Query classification and the per-request plan handed to every matcher.

use crate::config::SearchConfig;
use careway_models::{EntityKind, GeoPoint};
use serde::Serialize;
use std::fmt;

/// Matching strategy shared by every kind in one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Proximity query, over-fetched, then token filtered in memory.
    GeoText,
    /// Inverted index first, substring fallback second.
    Text,
    /// Proximity query sorted by distance.
    Geo,
    /// Plain filtered query with the kind's default sort.
    FiltersOnly,
}

impl Strategy {
    pub fn select(text: Option<&str>, geo: Option<GeoPoint>) -> Self {
        match (text.is_some(), geo.is_some()) {
            (true, true) => Strategy::GeoText,
            (true, false) => Strategy::Text,
            (false, true) => Strategy::Geo,
            (false, false) => Strategy::FiltersOnly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::GeoText => "geo_text",
            Strategy::Text => "text",
            Strategy::Geo => "geo",
            Strategy::FiltersOnly => "filters_only",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw attribute filters as supplied by the caller. Echoed back verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub kinds: Vec<EntityKind>,
    pub geo: Option<GeoPoint>,
    pub place: Option<String>,
    pub filters: SearchFilters,
    pub max_distance_km: Option<f64>,
    pub page: usize,
    pub page_size: usize,
}

impl SearchRequest {
    pub fn new(kinds: Vec<EntityKind>) -> Self {
        Self {
            query: None,
            kinds,
            geo: None,
            place: None,
            filters: SearchFilters::default(),
            max_distance_km: None,
            page: 1,
            page_size: 20,
        }
    }
}

/// Everything a matcher needs to run one kind's part of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub strategy: Strategy,
    pub kinds: Vec<EntityKind>,
    pub text: Option<String>,
    pub geo: Option<GeoPoint>,
    pub place: Option<String>,
    pub filters: SearchFilters,
    pub max_distance_km: f64,
    pub page: usize,
    pub page_size: usize,
    pub overfetch_factor: usize,
}

impl QueryPlan {
    /// Rows skipped for a normally paginated strategy.
    pub fn skip(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    /// Candidate window for the over-fetch strategy: `overfetch_factor` pages of
    /// candidates per requested page.
    pub fn candidate_window(&self) -> (usize, usize) {
        let limit = self.page_size * self.overfetch_factor;
        ((self.page - 1) * limit, limit)
    }
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Normalize a request and pick its strategy.
///
/// Blank text and place are treated as absent, page and page size are clamped
/// to sane values and a missing radius falls back to the configured default.
pub fn plan(request: &SearchRequest, config: &SearchConfig) -> QueryPlan {
    let text = non_blank(request.query.as_ref());
    let strategy = Strategy::select(text.as_deref(), request.geo);

    let max_distance_km = request
        .max_distance_km
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(config.max_distance_km);

    let mut kinds = request.kinds.clone();
    kinds.sort();
    kinds.dedup();

    QueryPlan {
        strategy,
        kinds,
        text,
        geo: request.geo,
        place: non_blank(request.place.as_ref()),
        filters: request.filters.clone(),
        max_distance_km,
        page: request.page.max(1),
        page_size: request.page_size.clamp(1, config.max_page_size.max(1)),
        overfetch_factor: config.overfetch_factor.max(1),
    }
}
