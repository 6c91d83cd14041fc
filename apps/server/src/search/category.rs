//! Free-text category resolution.

use crate::{db::CategoryStore, metrics, Result};
use careway_models::CategoryId;
use std::sync::Arc;

/// Resolves department and specialization names to category ids.
#[derive(Clone)]
pub struct CategoryResolver {
    store: Arc<dyn CategoryStore>,
}

impl CategoryResolver {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self { store }
    }

    /// Ids of active categories whose name, heading or specialization contains
    /// `name`. An empty result is a valid answer, not an error.
    #[tracing::instrument(
        name = "category.resolve",
        skip(self),
        fields(matched = tracing::field::Empty)
    )]
    pub async fn resolve(&self, name: &str) -> Result<Vec<CategoryId>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }

        let categories = self.store.find_active(name).await.inspect_err(|e| {
            metrics::STORE_ERRORS_TOTAL
                .with_label_values(&["category"])
                .inc();
            tracing::warn!(error = %e, "Category lookup failed");
        })?;

        let ids: Vec<CategoryId> = categories.into_iter().map(|c| c.id).collect();
        tracing::Span::current().record("matched", ids.len());
        Ok(ids)
    }
}
