//! Per-kind matchers
//!
//! Every kind runs the same four strategies; what differs between kinds is the
//! field-mapping row in [`KindProfile`] and the attribute filters each kind
//! understands, supplied through [`KindRules`].

use crate::db::{EntityQuery, EntityStore, SortOrder};
use crate::search::category::CategoryResolver;
use crate::search::location::build_location_predicate;
use crate::search::planner::{QueryPlan, SearchFilters, Strategy};
use crate::search::token;
use crate::{metrics, Error, Result};
use async_trait::async_trait;
use careway_models::{Entity, EntityKind, KindProfile, Predicate, RangeFilter};
use std::sync::Arc;
use std::time::Instant;

mod facility;
mod practitioner;

pub use facility::FacilityRules;
pub use practitioner::PractitionerRules;

/// One kind's page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPage {
    pub kind: EntityKind,
    pub items: Vec<Entity>,
    /// Rows read from the store before in-memory filtering.
    pub considered: usize,
}

impl MatchPage {
    fn empty(kind: EntityKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
            considered: 0,
        }
    }
}

/// Kind-specific filtering rules.
#[async_trait]
pub trait KindRules: Send + Sync {
    fn profile(&self) -> &'static KindProfile;

    /// Attribute filters applied identically under every strategy.
    async fn attribute_predicate(&self, filters: &SearchFilters) -> Result<Predicate>;

    /// Extra disjuncts for the substring text fallback.
    async fn text_alternatives(&self, _text: &str) -> Result<Vec<Predicate>> {
        Ok(Vec::new())
    }
}

/// Rating and service filters every kind shares.
pub(crate) fn shared_predicates(profile: &KindProfile, filters: &SearchFilters) -> Vec<Predicate> {
    let mut parts = Vec::new();

    if let (Some(field), Some(range)) = (
        profile.rating_field,
        filters.rating.as_deref().and_then(RangeFilter::parse_minimum),
    ) {
        parts.push(Predicate::range(field, range));
    }

    if let Some(service) = filters
        .service
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        parts.push(Predicate::or(
            profile
                .service_fields
                .iter()
                .map(|field| Predicate::contains(*field, service)),
        ));
    }

    parts
}

/// Runs one kind's part of a search against its store.
#[derive(Clone)]
pub struct KindMatcher {
    rules: Arc<dyn KindRules>,
    store: Arc<dyn EntityStore>,
}

impl KindMatcher {
    pub fn new(rules: Arc<dyn KindRules>, store: Arc<dyn EntityStore>) -> Self {
        Self { rules, store }
    }

    /// The standard matcher for `kind`.
    pub fn for_kind(
        kind: EntityKind,
        store: Arc<dyn EntityStore>,
        resolver: CategoryResolver,
    ) -> Self {
        let rules: Arc<dyn KindRules> = match kind {
            EntityKind::Practitioner => Arc::new(PractitionerRules::new(resolver)),
            other => Arc::new(FacilityRules::new(other)),
        };
        Self::new(rules, store)
    }

    pub fn kind(&self) -> EntityKind {
        self.rules.profile().kind
    }

    #[tracing::instrument(
        name = "matcher.search",
        skip_all,
        fields(
            kind = %self.kind(),
            strategy = %plan.strategy,
            returned = tracing::field::Empty,
            considered = tracing::field::Empty
        )
    )]
    pub async fn search(&self, plan: &QueryPlan) -> Result<MatchPage> {
        let started = Instant::now();
        let kind = self.kind();

        let result = self.run(plan).await;
        let strategy = plan.strategy.as_str();
        metrics::MATCHER_DURATION_SECONDS
            .with_label_values(&[kind.selector(), strategy])
            .observe(started.elapsed().as_secs_f64());

        match &result {
            Ok(page) => {
                metrics::MATCHER_RESULTS
                    .with_label_values(&[kind.selector(), strategy])
                    .observe(page.items.len() as f64);
                let span = tracing::Span::current();
                span.record("returned", page.items.len());
                span.record("considered", page.considered);
            }
            Err(e) => {
                if e.is_store_unavailable() {
                    metrics::STORE_ERRORS_TOTAL
                        .with_label_values(&[kind.selector()])
                        .inc();
                }
                tracing::warn!(error = %e, "Matcher failed");
            }
        }
        result
    }

    async fn run(&self, plan: &QueryPlan) -> Result<MatchPage> {
        let profile = self.rules.profile();
        let base = Predicate::and([
            build_location_predicate(plan.place.as_deref(), profile.location_fields),
            self.rules.attribute_predicate(&plan.filters).await?,
        ]);
        if base.is_never() {
            tracing::debug!("Filters cannot match anything");
            return Ok(MatchPage::empty(profile.kind));
        }

        match plan.strategy {
            Strategy::GeoText => self.geo_text(plan, base).await,
            Strategy::Text => self.text(plan, base).await,
            Strategy::Geo => self.geo(plan, base).await,
            Strategy::FiltersOnly => self.filters_only(plan, base).await,
        }
    }

    fn base_query(&self, predicate: Predicate) -> EntityQuery {
        EntityQuery::new(self.kind()).filter(predicate)
    }

    fn text_of(plan: &QueryPlan) -> Result<&str> {
        plan.text
            .as_deref()
            .ok_or_else(|| Error::Internal(format!("{} plan without text", plan.strategy)))
    }

    fn point_of(plan: &QueryPlan) -> Result<careway_models::GeoPoint> {
        plan.geo
            .ok_or_else(|| Error::Internal(format!("{} plan without coordinates", plan.strategy)))
    }

    /// Over-fetch nearest candidates, token filter them, keep one page.
    async fn geo_text(&self, plan: &QueryPlan, base: Predicate) -> Result<MatchPage> {
        let text = Self::text_of(plan)?;
        let point = Self::point_of(plan)?;
        let (skip, limit) = plan.candidate_window();

        let query = self
            .base_query(base)
            .near(point, plan.max_distance_km)
            .sort(SortOrder::Distance)
            .window(skip, limit);
        let candidates = self.store.find(&query).await?;
        let considered = candidates.len();

        let text_fields = self.rules.profile().text_fields;
        let items = candidates
            .into_iter()
            .filter(|entity| {
                let values: Vec<Option<&str>> = text_fields
                    .iter()
                    .flat_map(|field| entity.field_strings(field))
                    .map(Some)
                    .collect();
                token::matches(text, &values)
            })
            .take(plan.page_size)
            .collect();

        Ok(MatchPage {
            kind: self.kind(),
            items,
            considered,
        })
    }

    async fn text(&self, plan: &QueryPlan, base: Predicate) -> Result<MatchPage> {
        let text = Self::text_of(plan)?;
        if let Some(items) = self.try_indexed_text_search(plan, &base, text).await? {
            return Ok(MatchPage {
                kind: self.kind(),
                considered: items.len(),
                items,
            });
        }
        self.token_fallback(plan, base, text).await
    }

    /// `Ok(None)` when there is no index or it has no hits for `text` at all.
    /// Store errors are real faults and propagate.
    ///
    /// The choice is made per request, not per page: once the index has hits,
    /// pages past its last hit come back empty instead of switching to
    /// substring results.
    async fn try_indexed_text_search(
        &self,
        plan: &QueryPlan,
        base: &Predicate,
        text: &str,
    ) -> Result<Option<Vec<Entity>>> {
        let kind = self.kind();
        if !self.store.supports_full_text() {
            metrics::TEXT_FALLBACK_TOTAL
                .with_label_values(&[kind.selector(), "no_index"])
                .inc();
            return Ok(None);
        }

        let query = self
            .base_query(base.clone())
            .full_text(text)
            .sort(SortOrder::NameAscending)
            .window(plan.skip(), plan.page_size);
        let found = self.store.find(&query).await?;
        if !found.is_empty() {
            return Ok(Some(found));
        }
        if plan.skip() > 0 && self.index_has_hits(base, text).await? {
            return Ok(Some(Vec::new()));
        }

        metrics::TEXT_FALLBACK_TOTAL
            .with_label_values(&[kind.selector(), "index_empty"])
            .inc();
        Ok(None)
    }

    async fn index_has_hits(&self, base: &Predicate, text: &str) -> Result<bool> {
        let probe = self
            .base_query(base.clone())
            .full_text(text)
            .sort(SortOrder::NameAscending)
            .window(0, 1);
        Ok(!self.store.find(&probe).await?.is_empty())
    }

    /// Any token in any text field, or any kind-specific alternative.
    async fn token_fallback(
        &self,
        plan: &QueryPlan,
        base: Predicate,
        text: &str,
    ) -> Result<MatchPage> {
        let tokens = token::tokenize(text);
        let mut alternatives: Vec<Predicate> = self
            .rules
            .profile()
            .text_fields
            .iter()
            .flat_map(|field| {
                tokens
                    .iter()
                    .map(move |token| Predicate::contains(*field, token.as_str()))
            })
            .collect();
        alternatives.extend(self.rules.text_alternatives(text).await?);

        let query = self
            .base_query(Predicate::and([base, Predicate::or(alternatives)]))
            .sort(SortOrder::NameAscending)
            .window(plan.skip(), plan.page_size);
        let items = self.store.find(&query).await?;

        Ok(MatchPage {
            kind: self.kind(),
            considered: items.len(),
            items,
        })
    }

    async fn geo(&self, plan: &QueryPlan, base: Predicate) -> Result<MatchPage> {
        let point = Self::point_of(plan)?;
        let query = self
            .base_query(base)
            .near(point, plan.max_distance_km)
            .sort(SortOrder::Distance)
            .window(plan.skip(), plan.page_size);
        let items = self.store.find(&query).await?;

        Ok(MatchPage {
            kind: self.kind(),
            considered: items.len(),
            items,
        })
    }

    async fn filters_only(&self, plan: &QueryPlan, base: Predicate) -> Result<MatchPage> {
        let query = self
            .base_query(base)
            .sort(self.rules.profile().default_sort.into())
            .window(plan.skip(), plan.page_size);
        let items = self.store.find(&query).await?;

        Ok(MatchPage {
            kind: self.kind(),
            considered: items.len(),
            items,
        })
    }
}

/// Matchers for every kind over shared stores.
pub fn standard_matchers(
    store: Arc<dyn EntityStore>,
    resolver: CategoryResolver,
) -> Vec<KindMatcher> {
    EntityKind::ALL
        .iter()
        .map(|kind| KindMatcher::for_kind(*kind, store.clone(), resolver.clone()))
        .collect()
}
