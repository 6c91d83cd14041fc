use crate::{EntityKind, FieldPath, GeoPoint};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// A provider record as the search core reads it.
///
/// The envelope fields are common to every kind; everything kind-specific lives in
/// `attributes` and is reached through [`FieldPath`]s from the kind's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    pub kind: EntityKind,
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default = "empty_object")]
    pub attributes: Value,
    /// Distance from the query point, filled in by proximity searches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

fn default_active() -> bool {
    true
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl Entity {
    /// String values of a logical field. `name` reads the envelope.
    pub fn field_strings(&self, path: &FieldPath) -> Vec<&str> {
        if path.is_name() {
            return vec![self.name.as_str()];
        }
        path.strings(&self.attributes)
    }

    /// Numeric values of a logical field. Numeric strings count as numbers.
    pub fn field_numbers(&self, path: &FieldPath) -> Vec<Decimal> {
        path.resolve(&self.attributes)
            .into_iter()
            .filter_map(|value| match value {
                Value::Number(n) => Decimal::from_str(&n.to_string())
                    .ok()
                    .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
                Value::String(s) => Decimal::from_str(s.trim()).ok(),
                _ => None,
            })
            .collect()
    }

    pub fn field_number(&self, path: &FieldPath) -> Option<Decimal> {
        self.field_numbers(path).into_iter().next()
    }

    /// First non-blank string among `paths`.
    pub fn first_string(&self, paths: &[FieldPath]) -> Option<&str> {
        paths
            .iter()
            .flat_map(|path| self.field_strings(path))
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}
