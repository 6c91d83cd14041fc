//! SQL query builder for directory searches.
//!
//! Lowers an [`EntityQuery`] into PostgreSQL with positional bind values:
//! - Kind and `is_active` restriction
//! - Predicate tree over the JSON attribute document
//! - Inverted-index text search on the generated `search_vector` column
//! - Haversine proximity restriction, ordering and distance projection
//! - Sorting and `OFFSET`/`LIMIT` pagination

use crate::db::query::{EntityQuery, SortOrder};
use careway_models::{EntityKind, FieldPath, Predicate, RangeFilter};

mod bind;

use bind::{push_text, push_text_array};

/// Bind values for `sqlx` queries. Numbers travel as text and are cast in SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    TextArray(Vec<String>),
}

const SELECT_COLUMNS: &str =
    "e.id, e.kind, e.name, e.is_active, e.created_at, e.longitude, e.latitude, e.attributes";

/// Guard so only numeric-looking text is cast to `numeric`.
const NUMERIC_PATTERN: &str = r"'^\s*[0-9]+(\.[0-9]+)?\s*$'";

#[derive(Debug)]
pub struct QueryBuilder<'a> {
    query: &'a EntityQuery,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(query: &'a EntityQuery) -> Self {
        Self { query }
    }

    pub fn build_sql(&self) -> (String, Vec<BindValue>) {
        let mut bind_params = Vec::new();

        let distance = self.query.near.map(|near| {
            let lon_idx = push_text(&mut bind_params, near.point.longitude.to_string());
            let lat_idx = push_text(&mut bind_params, near.point.latitude.to_string());
            haversine_expr(lon_idx, lat_idx)
        });

        let mut sql = format!(
            "SELECT {}, {} AS distance_km FROM directory_entities e WHERE e.is_active = true",
            SELECT_COLUMNS,
            distance.as_deref().unwrap_or("NULL::float8")
        );

        let kind_idx = push_text(&mut bind_params, self.query.kind.as_str().to_string());
        sql.push_str(&format!(" AND e.kind = ${}", kind_idx));

        if let (Some(near), Some(distance)) = (self.query.near, distance.as_deref()) {
            let max_idx = push_text(&mut bind_params, near.max_distance_km.to_string());
            sql.push_str(&format!(
                " AND e.longitude IS NOT NULL AND e.latitude IS NOT NULL AND {} <= ${}::float8",
                distance, max_idx
            ));
        }

        if let Some(text) = &self.query.full_text {
            let idx = push_text(&mut bind_params, text.clone());
            sql.push_str(&format!(
                " AND e.search_vector @@ websearch_to_tsquery('simple', ${})",
                idx
            ));
        }

        let clause = build_predicate(&self.query.predicate, &mut bind_params);
        if clause != "TRUE" {
            sql.push_str(" AND ");
            sql.push_str(&clause);
        }

        self.push_order_by(&mut sql, &mut bind_params);
        sql.push_str(&format!(
            " OFFSET {} LIMIT {}",
            self.query.skip, self.query.limit
        ));

        (sql, bind_params)
    }

    fn push_order_by(&self, sql: &mut String, bind_params: &mut Vec<BindValue>) {
        let order = match self.query.sort {
            SortOrder::Distance if self.query.near.is_some() => "distance_km ASC".to_string(),
            SortOrder::Distance | SortOrder::NameAscending => "lower(e.name) ASC".to_string(),
            SortOrder::NewestFirst => "e.created_at DESC".to_string(),
            SortOrder::FieldDescending(field) => match field.to_key_path() {
                Some(keys) if !field.is_name() => {
                    let idx = push_text_array(bind_params, keys);
                    let value = format!("(e.attributes #>> ${}::text[])", idx);
                    format!(
                        "CASE WHEN {value} ~ {NUMERIC_PATTERN} THEN {value}::numeric END DESC NULLS LAST"
                    )
                }
                _ => "lower(e.name) ASC".to_string(),
            },
        };
        // Ensure deterministic ordering for pagination.
        sql.push_str(&format!(" ORDER BY {}, e.id ASC", order));
    }
}

/// Distinct string values of one location field for a kind.
pub fn build_location_values_sql(
    kind: EntityKind,
    field: &FieldPath,
) -> (String, Vec<BindValue>) {
    let mut bind_params = Vec::new();
    let kind_idx = push_text(&mut bind_params, kind.as_str().to_string());
    if field.is_name() {
        return (
            format!(
                "SELECT DISTINCT btrim(e.name) AS value FROM directory_entities e WHERE e.is_active = true AND e.kind = ${}",
                kind_idx
            ),
            bind_params,
        );
    }
    let path_idx = push_text(&mut bind_params, leaf_json_path(field));
    (
        format!(
            "SELECT DISTINCT btrim(v.value #>> '{{}}') AS value FROM directory_entities e, jsonb_path_query(e.attributes, ${}::jsonpath) AS v(value) WHERE e.is_active = true AND e.kind = ${} AND jsonb_typeof(v.value) = 'string'",
            path_idx, kind_idx
        ),
        bind_params,
    )
}

fn haversine_expr(lon_idx: usize, lat_idx: usize) -> String {
    format!(
        "(12742.0 * asin(least(1.0, sqrt(power(sin(radians(e.latitude - ${lat}::float8) / 2), 2) + cos(radians(${lat}::float8)) * cos(radians(e.latitude)) * power(sin(radians(e.longitude - ${lon}::float8) / 2), 2)))))",
        lat = lat_idx,
        lon = lon_idx
    )
}

/// JSON path that also unwraps a trailing array (lax `[*]` on a scalar is the scalar).
fn leaf_json_path(field: &FieldPath) -> String {
    let path = field.to_json_path();
    if path.ends_with("[*]") {
        path
    } else {
        format!("{}[*]", path)
    }
}

pub(crate) fn build_predicate(predicate: &Predicate, bind_params: &mut Vec<BindValue>) -> String {
    match predicate {
        Predicate::Always => "TRUE".to_string(),
        Predicate::Never => "FALSE".to_string(),
        Predicate::Contains { field, needle } => {
            let idx = push_text(bind_params, format!("%{}%", escape_like_pattern(needle)));
            value_clause(field, bind_params, |value| {
                format!("{} ILIKE ${} ESCAPE E'\\\\'", value, idx)
            })
        }
        Predicate::EqualsAny { field, values } => {
            let lowered = values.iter().map(|v| v.trim().to_lowercase()).collect();
            let idx = push_text_array(bind_params, lowered);
            value_clause(field, bind_params, |value| {
                format!("lower(btrim({})) = ANY(${})", value, idx)
            })
        }
        Predicate::Range { field, range } => {
            let comparisons = range_comparisons(range, bind_params);
            if comparisons.is_empty() {
                return "TRUE".to_string();
            }
            value_clause(field, bind_params, |value| {
                let number = format!("CASE WHEN {value} ~ {NUMERIC_PATTERN} THEN {value}::numeric END");
                comparisons
                    .iter()
                    .map(|(op, idx)| format!("{} {} ${}::numeric", number, op, idx))
                    .collect::<Vec<_>>()
                    .join(" AND ")
            })
        }
        Predicate::And(parts) => join_parts(parts, " AND ", bind_params),
        Predicate::Or(parts) => join_parts(parts, " OR ", bind_params),
    }
}

fn join_parts(parts: &[Predicate], sep: &str, bind_params: &mut Vec<BindValue>) -> String {
    let clauses: Vec<String> = parts
        .iter()
        .map(|p| build_predicate(p, bind_params))
        .collect();
    format!("({})", clauses.join(sep))
}

fn range_comparisons(range: &RangeFilter, bind_params: &mut Vec<BindValue>) -> Vec<(&'static str, usize)> {
    let mut out = Vec::new();
    if let Some(min) = range.min {
        out.push((">=", push_text(bind_params, min.to_string())));
    }
    if let Some(max) = range.max {
        out.push(("<=", push_text(bind_params, max.to_string())));
    }
    out
}

/// Wrap a condition on a single text value so it applies to every value of `field`.
fn value_clause(
    field: &FieldPath,
    bind_params: &mut Vec<BindValue>,
    condition: impl FnOnce(&str) -> String,
) -> String {
    if field.is_name() {
        return condition("e.name");
    }
    let path_idx = push_text(bind_params, leaf_json_path(field));
    format!(
        "EXISTS (SELECT 1 FROM jsonb_path_query(e.attributes, ${}::jsonpath) AS v(value) WHERE {})",
        path_idx,
        condition("(v.value #>> '{}')")
    )
}

pub(crate) fn escape_like_pattern(s: &str) -> String {
    // Escape SQL LIKE meta-characters so user input is treated literally.
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use careway_models::GeoPoint;
    use rust_decimal::Decimal;

    fn texts(binds: &[BindValue]) -> Vec<String> {
        binds
            .iter()
            .map(|b| match b {
                BindValue::Text(s) => s.clone(),
                BindValue::TextArray(v) => v.join("|"),
            })
            .collect()
    }

    #[test]
    fn base_query_restricts_kind_and_activity() {
        let query = EntityQuery::new(EntityKind::Clinic).window(40, 20);
        let (sql, binds) = QueryBuilder::new(&query).build_sql();
        assert!(sql.contains("e.is_active = true"));
        assert!(sql.contains("e.kind = $1"));
        assert!(sql.ends_with("ORDER BY lower(e.name) ASC, e.id ASC OFFSET 40 LIMIT 20"));
        assert_eq!(texts(&binds), vec!["clinic"]);
    }

    #[test]
    fn contains_on_document_field_uses_json_path() {
        let query = EntityQuery::new(EntityKind::DiagnosticLab).filter(Predicate::contains(
            FieldPath::new("testsOffered[].name"),
            "50%_off",
        ));
        let (sql, binds) = QueryBuilder::new(&query).build_sql();
        assert!(sql.contains("jsonb_path_query(e.attributes, $3::jsonpath)"));
        assert!(sql.contains("ILIKE $2"));
        assert_eq!(
            texts(&binds),
            vec![
                "diagnostic_lab".to_string(),
                "%50\\%\\_off%".to_string(),
                r#"$."testsOffered"[*]."name""#.to_string(),
            ]
        );
    }

    #[test]
    fn name_predicates_use_column() {
        let query = EntityQuery::new(EntityKind::Pharmacy)
            .filter(Predicate::contains(FieldPath::NAME, "care"));
        let (sql, _) = QueryBuilder::new(&query).build_sql();
        assert!(sql.contains("e.name ILIKE $2"));
        assert!(!sql.contains("jsonb_path_query"));
    }

    #[test]
    fn range_binds_both_bounds() {
        let query = EntityQuery::new(EntityKind::Practitioner).filter(Predicate::range(
            FieldPath::new("yearsExperience"),
            RangeFilter::between(Decimal::from(3), Decimal::from(5)),
        ));
        let (sql, binds) = QueryBuilder::new(&query).build_sql();
        assert!(sql.contains(">= $2::numeric"));
        assert!(sql.contains("<= $3::numeric"));
        assert_eq!(texts(&binds)[1..3], ["3".to_string(), "5".to_string()]);
    }

    #[test]
    fn proximity_projects_and_orders_by_distance() {
        let query = EntityQuery::new(EntityKind::Clinic)
            .near(GeoPoint::new(77.2, 28.6), 25.0)
            .sort(SortOrder::Distance);
        let (sql, binds) = QueryBuilder::new(&query).build_sql();
        assert!(sql.contains("AS distance_km"));
        assert!(sql.contains("<= $4::float8"));
        assert!(sql.contains("ORDER BY distance_km ASC, e.id ASC"));
        assert_eq!(texts(&binds), vec!["77.2", "28.6", "clinic", "25"]);
    }

    #[test]
    fn full_text_uses_inverted_index() {
        let query = EntityQuery::new(EntityKind::Practitioner).full_text("heart surgeon");
        let (sql, _) = QueryBuilder::new(&query).build_sql();
        assert!(sql.contains("e.search_vector @@ websearch_to_tsquery('simple', $2)"));
    }

    #[test]
    fn never_predicate_compiles_to_false() {
        let query = EntityQuery::new(EntityKind::Practitioner).filter(Predicate::Never);
        let (sql, _) = QueryBuilder::new(&query).build_sql();
        assert!(sql.contains(" AND FALSE"));
    }

    #[test]
    fn rating_sort_is_numeric_and_nulls_last() {
        let query = EntityQuery::new(EntityKind::Clinic)
            .sort(SortOrder::FieldDescending(FieldPath::new("ratingAverage")));
        let (sql, binds) = QueryBuilder::new(&query).build_sql();
        assert!(sql.contains("DESC NULLS LAST, e.id ASC"));
        assert_eq!(
            binds.last(),
            Some(&BindValue::TextArray(vec!["ratingAverage".to_string()]))
        );
    }
}
