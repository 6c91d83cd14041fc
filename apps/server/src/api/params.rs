//! Query-string parameter types

use crate::search::SearchFilters;
use crate::services::SearchInput;
use serde::Deserialize;
use validator::Validate;

/// `GET /api/search`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Kept as text so blank or non-numeric values count as absent.
    pub lng: Option<String>,
    pub lat: Option<String>,
    pub place: Option<String>,
    pub specialization: Option<String>,
    pub category: Option<String>,
    pub experience: Option<String>,
    pub fee: Option<String>,
    pub rating: Option<String>,
    pub service: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "maxDistance must be positive"))]
    pub max_distance: Option<f64>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<usize>,
    #[validate(range(min = 1, message = "limit must be at least 1"))]
    pub limit: Option<usize>,
}

fn coordinate(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
}

impl From<SearchParams> for SearchInput {
    fn from(params: SearchParams) -> Self {
        SearchInput {
            q: params.q,
            kinds: params.kind,
            longitude: coordinate(params.lng.as_deref()),
            latitude: coordinate(params.lat.as_deref()),
            place: params.place,
            filters: SearchFilters {
                specialization: params.specialization,
                category: params.category,
                experience: params.experience,
                fee: params.fee,
                rating: params.rating,
                service: params.service,
            },
            max_distance_km: params.max_distance,
            page: params.page,
            limit: params.limit,
        }
    }
}

/// `GET /api/search/suggest`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SuggestParams {
    #[validate(length(max = 200, message = "q is too long"))]
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}
