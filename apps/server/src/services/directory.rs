//! Directory search service

use crate::config::SearchConfig;
use crate::db::{CategoryStore, EntityStore};
use crate::request_context::CallerRole;
use crate::search::{
    list_known_locations, standard_matchers, AggregateOutcome, CategoryResolver,
    ResultAggregator, SearchFilters, SearchRequest, Strategy, Suggestion, TypeaheadService,
};
use crate::{metrics, Error, Result};
use careway_models::{EntityKind, GeoPoint};
use std::sync::Arc;

/// Search parameters as received from the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchInput {
    pub q: Option<String>,
    /// Comma separated kind selectors, or `all`.
    pub kinds: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub place: Option<String>,
    pub filters: SearchFilters,
    pub max_distance_km: Option<f64>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

pub struct DirectoryService {
    aggregator: ResultAggregator,
    typeahead: TypeaheadService,
    entities: Arc<dyn EntityStore>,
    config: SearchConfig,
}

impl DirectoryService {
    pub fn new(
        entities: Arc<dyn EntityStore>,
        categories: Arc<dyn CategoryStore>,
        config: SearchConfig,
    ) -> Self {
        let resolver = CategoryResolver::new(categories.clone());
        let aggregator = ResultAggregator::new(
            standard_matchers(entities.clone(), resolver),
            config.clone(),
        );
        let typeahead =
            TypeaheadService::new(entities.clone(), categories, config.typeahead.clone());
        Self {
            aggregator,
            typeahead,
            entities,
            config,
        }
    }

    /// Kinds visible to `role` for a raw `type` selector.
    pub fn resolve_kinds(&self, raw: Option<&str>, role: CallerRole) -> Result<Vec<EntityKind>> {
        let visible = |kind: &EntityKind| {
            role.sees_restricted_kinds() || !self.config.restricted_kinds.contains(kind)
        };

        let raw = raw.map(str::trim).unwrap_or_default();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            return Ok(EntityKind::ALL.into_iter().filter(visible).collect());
        }

        let mut kinds = Vec::new();
        for selector in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let kind = EntityKind::from_selector(selector)?;
            if !visible(&kind) {
                return Err(Error::InvalidRequest(format!(
                    "'{}' is not available to this caller",
                    kind.selector()
                )));
            }
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            return Err(Error::InvalidRequest(format!("Invalid type selector '{raw}'")));
        }
        Ok(kinds)
    }

    fn build_request(&self, input: SearchInput, role: CallerRole) -> Result<SearchRequest> {
        let geo = GeoPoint::from_parts(input.longitude, input.latitude);
        if self.config.reject_text_with_geography
            && present(&input.q)
            && (geo.is_some() || present(&input.place))
        {
            return Err(Error::InvalidRequest(
                "Free-text search cannot be combined with coordinates or a place".to_string(),
            ));
        }
        if let Some(page_size) = input.limit {
            if page_size == 0 || page_size > self.config.max_page_size {
                return Err(Error::InvalidRequest(format!(
                    "limit must be between 1 and {}",
                    self.config.max_page_size
                )));
            }
        }

        Ok(SearchRequest {
            kinds: self.resolve_kinds(input.kinds.as_deref(), role)?,
            query: input.q,
            geo,
            place: input.place,
            filters: input.filters,
            max_distance_km: input.max_distance_km,
            page: input.page.unwrap_or(1).max(1),
            page_size: input.limit.unwrap_or(self.config.default_page_size),
        })
    }

    /// Federated search across the kinds visible to `role`.
    pub async fn search(&self, input: SearchInput, role: CallerRole) -> Result<AggregateOutcome> {
        let request = match self.build_request(input, role) {
            Ok(request) => request,
            Err(e) => {
                metrics::SEARCH_REQUESTS_TOTAL
                    .with_label_values(&["none", "invalid"])
                    .inc();
                return Err(e);
            }
        };
        tracing::debug!(
            strategy = %Strategy::select(
                request.query.as_deref().filter(|q| !q.trim().is_empty()),
                request.geo
            ),
            kinds = request.kinds.len(),
            "Search request accepted"
        );
        self.aggregator.aggregate(&request).await
    }

    pub async fn suggest(
        &self,
        partial: Option<&str>,
        kinds: Option<&str>,
        role: CallerRole,
    ) -> Result<Vec<Suggestion>> {
        let kinds = self.resolve_kinds(kinds, role)?;
        self.typeahead.suggest(partial, &kinds).await
    }

    pub async fn known_locations(&self) -> Result<Vec<String>> {
        list_known_locations(self.entities.as_ref()).await
    }
}
