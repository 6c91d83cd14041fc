use super::{shared_predicates, KindRules};
use crate::search::category::CategoryResolver;
use crate::search::planner::SearchFilters;
use crate::search::token;
use crate::Result;
use async_trait::async_trait;
use careway_models::{profile, EntityKind, FieldPath, KindProfile, Predicate, RangeFilter};
use futures::future::try_join_all;

const SPECIALIZATION_CATEGORY: FieldPath = FieldPath::new("specializationCategory");
const DEPARTMENT: FieldPath = FieldPath::new("department");
const YEARS_EXPERIENCE: FieldPath = FieldPath::new("yearsExperience");
const CONSULTATION_FEE: FieldPath = FieldPath::new("consultationFee");

/// Practitioners add specialization, department, experience and fee filters,
/// and let free text match through category resolution.
pub struct PractitionerRules {
    resolver: CategoryResolver,
}

impl PractitionerRules {
    pub fn new(resolver: CategoryResolver) -> Self {
        Self { resolver }
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[async_trait]
impl KindRules for PractitionerRules {
    fn profile(&self) -> &'static KindProfile {
        profile(EntityKind::Practitioner)
    }

    async fn attribute_predicate(&self, filters: &SearchFilters) -> Result<Predicate> {
        let mut parts = shared_predicates(self.profile(), filters);

        if let Some(specialization) = trimmed(&filters.specialization) {
            parts.push(Predicate::equals_any(
                SPECIALIZATION_CATEGORY,
                vec![specialization.to_string()],
            ));
        }

        // An unresolvable category must empty the result, never widen it.
        if let Some(category) = trimmed(&filters.category) {
            let ids = self.resolver.resolve(category).await?;
            parts.push(Predicate::equals_any(DEPARTMENT, ids));
        }

        if let Some(range) = filters.experience.as_deref().and_then(RangeFilter::parse) {
            parts.push(Predicate::range(YEARS_EXPERIENCE, range));
        }
        if let Some(range) = filters.fee.as_deref().and_then(RangeFilter::parse) {
            parts.push(Predicate::range(CONSULTATION_FEE, range));
        }

        Ok(Predicate::and(parts))
    }

    /// Each token resolves on its own, like the text-field alternatives.
    async fn text_alternatives(&self, text: &str) -> Result<Vec<Predicate>> {
        let tokens = token::tokenize(text);
        let resolved =
            try_join_all(tokens.iter().map(|token| self.resolver.resolve(token))).await?;

        let mut ids = Vec::new();
        for id in resolved.into_iter().flatten() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Predicate::equals_any(DEPARTMENT, ids)])
    }
}
