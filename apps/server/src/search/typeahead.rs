//! Typeahead suggestions
//!
//! A cheaper cousin of full search: one name-ordered query per kind with a small
//! limit, no strategy selection, no pagination. An empty box suggests active
//! categories so it never renders blank.

use crate::config::TypeaheadConfig;
use crate::db::{CategoryStore, EntityQuery, EntityStore, SortOrder};
use crate::search::location::build_location_predicate;
use crate::search::token;
use crate::{metrics, Result};
use careway_models::{profile, Category, Entity, EntityKind, Predicate};
use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;

pub const CATEGORY_SUGGESTION: &str = "category";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// Kind selector, or `"category"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtext: Option<String>,
    pub id: String,
}

impl Suggestion {
    fn from_category(category: Category) -> Self {
        Self {
            kind: CATEGORY_SUGGESTION,
            subtext: category.heading.or(category.specialization),
            text: category.name,
            id: category.id,
        }
    }

    fn from_entity(entity: Entity) -> Self {
        let profile = profile(entity.kind);
        Self {
            kind: profile.selector,
            subtext: entity.first_string(profile.subtext_fields).map(str::to_string),
            text: entity.name,
            id: entity.id,
        }
    }
}

pub struct TypeaheadService {
    entities: Arc<dyn EntityStore>,
    categories: Arc<dyn CategoryStore>,
    config: TypeaheadConfig,
}

impl TypeaheadService {
    pub fn new(
        entities: Arc<dyn EntityStore>,
        categories: Arc<dyn CategoryStore>,
        config: TypeaheadConfig,
    ) -> Self {
        Self {
            entities,
            categories,
            config,
        }
    }

    /// Suggestions for a partial query over `kinds`, at most `max_total`.
    ///
    /// Categories are suggested alongside providers whenever practitioners are
    /// among the kinds, since they resolve to practitioner departments.
    #[tracing::instrument(
        name = "search.suggest",
        skip(self),
        fields(returned = tracing::field::Empty)
    )]
    pub async fn suggest(
        &self,
        partial: Option<&str>,
        kinds: &[EntityKind],
    ) -> Result<Vec<Suggestion>> {
        let partial = partial.map(str::trim).filter(|p| !p.is_empty());

        let suggestions = match partial {
            None => {
                metrics::SUGGEST_REQUESTS_TOTAL
                    .with_label_values(&["default"])
                    .inc();
                self.default_suggestions().await?
            }
            Some(partial) => {
                metrics::SUGGEST_REQUESTS_TOTAL
                    .with_label_values(&["query"])
                    .inc();
                self.matching_suggestions(partial, kinds).await?
            }
        };

        tracing::Span::current().record("returned", suggestions.len());
        Ok(suggestions)
    }

    async fn default_suggestions(&self) -> Result<Vec<Suggestion>> {
        let limit = self.config.default_categories.min(self.config.max_total);
        let categories = self.categories.list_active(limit).await?;
        Ok(categories
            .into_iter()
            .map(Suggestion::from_category)
            .collect())
    }

    async fn matching_suggestions(
        &self,
        partial: &str,
        kinds: &[EntityKind],
    ) -> Result<Vec<Suggestion>> {
        let per_kind = try_join_all(kinds.iter().map(|kind| self.kind_suggestions(*kind, partial)));

        let mut suggestions = Vec::new();
        if kinds.contains(&EntityKind::Practitioner) {
            let (categories, providers) =
                futures::try_join!(self.categories.find_active(partial), per_kind)?;
            suggestions.extend(
                categories
                    .into_iter()
                    .take(self.config.max_per_kind)
                    .map(Suggestion::from_category),
            );
            suggestions.extend(providers.into_iter().flatten());
        } else {
            suggestions.extend(per_kind.await?.into_iter().flatten());
        }

        suggestions.truncate(self.config.max_total);
        Ok(suggestions)
    }

    async fn kind_suggestions(&self, kind: EntityKind, partial: &str) -> Result<Vec<Suggestion>> {
        let profile = profile(kind);
        let tokens = token::tokenize(partial);

        let by_text = profile.text_fields.iter().flat_map(|field| {
            tokens
                .iter()
                .map(move |token| Predicate::contains(*field, token.as_str()))
        });
        let predicate = Predicate::or(
            by_text.chain([build_location_predicate(Some(partial), profile.location_fields)]),
        );

        let query = EntityQuery::new(kind)
            .filter(predicate)
            .sort(SortOrder::NameAscending)
            .window(0, self.config.max_per_kind);
        let entities = self.entities.find(&query).await?;

        Ok(entities.into_iter().map(Suggestion::from_entity).collect())
    }
}
