use super::{shared_predicates, KindRules};
use crate::search::planner::SearchFilters;
use crate::Result;
use async_trait::async_trait;
use careway_models::{profile, EntityKind, KindProfile, Predicate};

/// Clinics, pharmacies, labs and ambulances.
///
/// These kinds only filter on rating (where they carry one) and offered
/// services; everything else is their field-mapping row.
pub struct FacilityRules {
    profile: &'static KindProfile,
}

impl FacilityRules {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            profile: profile(kind),
        }
    }
}

#[async_trait]
impl KindRules for FacilityRules {
    fn profile(&self) -> &'static KindProfile {
        self.profile
    }

    async fn attribute_predicate(&self, filters: &SearchFilters) -> Result<Predicate> {
        Ok(Predicate::and(shared_predicates(self.profile, filters)))
    }
}
