//! PostgreSQL directory store

use crate::db::query::EntityQuery;
use crate::db::query_builder::{build_location_values_sql, escape_like_pattern, BindValue, QueryBuilder};
use crate::db::traits::{CategoryStore, EntityStore};
use crate::Result;
use async_trait::async_trait;
use careway_models::{Category, Entity, EntityKind, FieldPath, GeoPoint};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use std::collections::BTreeSet;

/// Read-only store over the `directory_entities` and `directory_categories` tables.
#[derive(Clone)]
pub struct PostgresDirectoryStore {
    pool: PgPool,
}

impl PostgresDirectoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    bind_values: Vec<BindValue>,
) -> Query<'q, Postgres, PgArguments> {
    for value in bind_values {
        query = match value {
            BindValue::Text(v) => query.bind(v),
            BindValue::TextArray(vs) => query.bind(vs),
        };
    }
    query
}

fn entity_from_row(row: &PgRow) -> Result<Entity> {
    let kind: String = row.try_get("kind")?;
    let longitude: Option<f64> = row.try_get("longitude")?;
    let latitude: Option<f64> = row.try_get("latitude")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let attributes: JsonValue = row.try_get("attributes")?;

    Ok(Entity {
        id: row.try_get("id")?,
        kind: EntityKind::from_selector(&kind)
            .map_err(|e| crate::Error::Internal(format!("corrupt entity row: {e}")))?,
        name: row.try_get("name")?,
        is_active: row.try_get("is_active")?,
        created_at,
        location: GeoPoint::from_parts(longitude, latitude),
        attributes,
        distance_km: row.try_get("distance_km")?,
    })
}

fn category_from_row(row: &PgRow) -> Result<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        heading: row.try_get("heading")?,
        specialization: row.try_get("specialization")?,
        is_active: row.try_get("is_active")?,
    })
}

#[async_trait]
impl EntityStore for PostgresDirectoryStore {
    async fn find(&self, query: &EntityQuery) -> Result<Vec<Entity>> {
        if query.is_unsatisfiable() {
            return Ok(Vec::new());
        }

        let (sql, bind_values) = QueryBuilder::new(query).build_sql();
        tracing::trace!(kind = %query.kind, sql = %sql, "Executing entity query");

        let rows = bind_all(sqlx::query(&sql), bind_values)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(entity_from_row).collect()
    }

    fn supports_full_text(&self) -> bool {
        true
    }

    async fn location_values(
        &self,
        kind: EntityKind,
        fields: &[FieldPath],
    ) -> Result<Vec<String>> {
        let mut values = BTreeSet::new();
        for field in fields {
            let (sql, bind_values) = build_location_values_sql(kind, field);
            let rows = bind_all(sqlx::query(&sql), bind_values)
                .fetch_all(&self.pool)
                .await?;
            for row in rows {
                let value: Option<String> = row.try_get("value")?;
                values.extend(value.filter(|v| !v.is_empty()));
            }
        }
        Ok(values.into_iter().collect())
    }
}

#[async_trait]
impl CategoryStore for PostgresDirectoryStore {
    async fn find_active(&self, needle: &str) -> Result<Vec<Category>> {
        let needle = needle.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like_pattern(needle));
        let rows = sqlx::query(
            "SELECT id, name, heading, specialization, is_active FROM directory_categories \
             WHERE is_active = true AND (name ILIKE $1 ESCAPE E'\\\\' OR heading ILIKE $1 ESCAPE E'\\\\' \
             OR specialization ILIKE $1 ESCAPE E'\\\\') ORDER BY lower(name), id",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(category_from_row).collect()
    }

    async fn list_active(&self, limit: usize) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, name, heading, specialization, is_active FROM directory_categories \
             WHERE is_active = true ORDER BY lower(name), id LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(category_from_row).collect()
    }
}
