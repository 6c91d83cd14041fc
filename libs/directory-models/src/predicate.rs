//! Store-agnostic filter tree.
//!
//! Matchers describe what they want in terms of logical fields; each store backend
//! lowers the tree into its own query language. The in-memory evaluator here is the
//! reference semantics every backend must agree with.

use crate::{Entity, FieldPath, RangeFilter};

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Always,
    Never,
    /// Case-insensitive substring match on any value of the field.
    Contains { field: FieldPath, needle: String },
    /// Case-insensitive equality against any of `values`.
    EqualsAny {
        field: FieldPath,
        values: Vec<String>,
    },
    /// Any numeric value of the field lies inside the range.
    Range { field: FieldPath, range: RangeFilter },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn contains(field: FieldPath, needle: impl Into<String>) -> Self {
        Predicate::Contains {
            field,
            needle: needle.into(),
        }
    }

    pub fn equals_any(field: FieldPath, values: Vec<String>) -> Self {
        if values.is_empty() {
            return Predicate::Never;
        }
        Predicate::EqualsAny { field, values }
    }

    pub fn range(field: FieldPath, range: RangeFilter) -> Self {
        Predicate::Range { field, range }
    }

    /// Conjunction with constant folding.
    pub fn and(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut kept = Vec::new();
        for part in parts {
            match part {
                Predicate::Always => {}
                Predicate::Never => return Predicate::Never,
                Predicate::And(inner) => kept.extend(inner),
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => Predicate::Always,
            1 => kept.remove(0),
            _ => Predicate::And(kept),
        }
    }

    /// Disjunction with constant folding. An empty disjunction matches nothing.
    pub fn or(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut kept = Vec::new();
        for part in parts {
            match part {
                Predicate::Never => {}
                Predicate::Always => return Predicate::Always,
                Predicate::Or(inner) => kept.extend(inner),
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => Predicate::Never,
            1 => kept.remove(0),
            _ => Predicate::Or(kept),
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Predicate::Never)
    }

    pub fn evaluate(&self, entity: &Entity) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Never => false,
            Predicate::Contains { field, needle } => {
                let needle = needle.to_lowercase();
                entity
                    .field_strings(field)
                    .iter()
                    .any(|value| value.to_lowercase().contains(&needle))
            }
            Predicate::EqualsAny { field, values } => entity.field_strings(field).iter().any(|value| {
                let value = value.trim().to_lowercase();
                values.iter().any(|v| v.to_lowercase() == value)
            }),
            Predicate::Range { field, range } => entity
                .field_numbers(field)
                .into_iter()
                .any(|value| range.contains(value)),
            Predicate::And(parts) => parts.iter().all(|p| p.evaluate(entity)),
            Predicate::Or(parts) => parts.iter().any(|p| p.evaluate(entity)),
        }
    }
}
