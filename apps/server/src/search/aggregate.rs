//! Concurrent fan-out across kinds and the merged response envelope.

use crate::config::{FailurePolicy, SearchConfig};
use crate::search::matcher::{KindMatcher, MatchPage};
use crate::search::planner::{plan, QueryPlan, SearchFilters, SearchRequest, Strategy};
use crate::{metrics, Result};
use careway_models::{Entity, GeoPoint};
use futures::future::{join_all, try_join_all};
use serde::Serialize;
use std::collections::BTreeMap;

const NO_RESULTS_MESSAGE: &str = "No providers matched your search";

/// Request parameters echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoedFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kinds: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
    pub max_distance_km: f64,
    #[serde(flatten)]
    pub attributes: SearchFilters,
}

impl From<&QueryPlan> for EchoedFilters {
    fn from(plan: &QueryPlan) -> Self {
        Self {
            q: plan.text.clone(),
            kinds: plan.kinds.iter().map(|k| k.selector()).collect(),
            place: plan.place.clone(),
            coordinates: plan.geo,
            max_distance_km: plan.max_distance_km,
            attributes: plan.filters.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindCount {
    pub returned: usize,
    pub considered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResponse {
    /// Every searched kind, keyed by selector, possibly empty.
    pub results: BTreeMap<&'static str, Vec<Entity>>,
    pub counts: BTreeMap<&'static str, KindCount>,
    /// Items returned on this page across kinds.
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
    pub filters: EchoedFilters,
    pub strategy: Strategy,
    pub unavailable_kinds: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoResultsResponse {
    pub message: &'static str,
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
    pub filters: EchoedFilters,
    pub strategy: Strategy,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unavailable_kinds: Vec<&'static str>,
}

/// `{"status": "ok", ...}` or `{"status": "no_results", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AggregateOutcome {
    Ok(AggregateResponse),
    NoResults(NoResultsResponse),
}

impl AggregateOutcome {
    pub fn total_count(&self) -> usize {
        match self {
            AggregateOutcome::Ok(response) => response.total_count,
            AggregateOutcome::NoResults(_) => 0,
        }
    }
}

pub struct ResultAggregator {
    matchers: Vec<KindMatcher>,
    config: SearchConfig,
}

impl ResultAggregator {
    pub fn new(matchers: Vec<KindMatcher>, config: SearchConfig) -> Self {
        Self { matchers, config }
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.config.failure_policy
    }

    #[tracing::instrument(
        name = "search.aggregate",
        skip_all,
        fields(
            strategy = tracing::field::Empty,
            kinds = request.kinds.len(),
            total_count = tracing::field::Empty
        )
    )]
    pub async fn aggregate(&self, request: &SearchRequest) -> Result<AggregateOutcome> {
        let plan = plan(request, &self.config);
        let span = tracing::Span::current();
        span.record("strategy", plan.strategy.as_str());

        let selected: Vec<&KindMatcher> = self
            .matchers
            .iter()
            .filter(|m| plan.kinds.contains(&m.kind()))
            .collect();

        let result = self.fan_out(&plan, &selected).await;
        let outcome_label = match &result {
            Ok(AggregateOutcome::Ok(_)) => "ok",
            Ok(AggregateOutcome::NoResults(_)) => "no_results",
            Err(e) if e.is_store_unavailable() => "unavailable",
            Err(_) => "error",
        };
        metrics::SEARCH_REQUESTS_TOTAL
            .with_label_values(&[plan.strategy.as_str(), outcome_label])
            .inc();

        let outcome = result?;
        span.record("total_count", outcome.total_count());
        Ok(outcome)
    }

    async fn fan_out(
        &self,
        plan: &QueryPlan,
        matchers: &[&KindMatcher],
    ) -> Result<AggregateOutcome> {
        let searches = matchers.iter().map(|m| m.search(plan));

        let (pages, unavailable) = match self.config.failure_policy {
            FailurePolicy::FailFast => (try_join_all(searches).await?, Vec::new()),
            FailurePolicy::Degrade => {
                let mut pages = Vec::new();
                let mut unavailable = Vec::new();
                let mut first_error = None;
                for (matcher, result) in matchers.iter().zip(join_all(searches).await) {
                    match result {
                        Ok(page) => pages.push(page),
                        Err(e) if e.is_store_unavailable() => {
                            tracing::warn!(
                                kind = %matcher.kind(),
                                error = %e,
                                "Kind unavailable, returning remaining kinds"
                            );
                            unavailable.push(matcher.kind().selector());
                            first_error.get_or_insert(e);
                        }
                        Err(e) => return Err(e),
                    }
                }
                if pages.is_empty() {
                    if let Some(e) = first_error {
                        return Err(e);
                    }
                }
                (pages, unavailable)
            }
        };

        Ok(merge(plan, pages, unavailable))
    }
}

fn merge(plan: &QueryPlan, pages: Vec<MatchPage>, unavailable: Vec<&'static str>) -> AggregateOutcome {
    let total_count: usize = pages.iter().map(|p| p.items.len()).sum();
    let filters = EchoedFilters::from(plan);

    if total_count == 0 {
        return AggregateOutcome::NoResults(NoResultsResponse {
            message: NO_RESULTS_MESSAGE,
            total_count: 0,
            page: plan.page,
            page_size: plan.page_size,
            filters,
            strategy: plan.strategy,
            unavailable_kinds: unavailable,
        });
    }

    let mut results = BTreeMap::new();
    let mut counts = BTreeMap::new();
    for page in pages {
        let selector = page.kind.selector();
        counts.insert(
            selector,
            KindCount {
                returned: page.items.len(),
                considered: page.considered,
            },
        );
        results.insert(selector, page.items);
    }

    AggregateOutcome::Ok(AggregateResponse {
        results,
        counts,
        total_count,
        page: plan.page,
        page_size: plan.page_size,
        filters,
        strategy: plan.strategy,
        unavailable_kinds: unavailable,
    })
}
