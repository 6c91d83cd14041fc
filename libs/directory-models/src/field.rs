//! Logical field accessors over an entity document.
//!
//! A path is a dotted list of object keys. A key suffixed with `[]` iterates the
//! array stored under it, so `testsOffered[].name` yields the name of every offered
//! test. Leaf arrays are unwrapped as well: `servicesOffered` and
//! `servicesOffered[]` resolve to the same strings.

use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldPath(&'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub key: &'a str,
    pub many: bool,
}

impl FieldPath {
    pub const NAME: FieldPath = FieldPath("name");

    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn is_name(&self) -> bool {
        self.0 == Self::NAME.0
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment<'static>> {
        self.0.split('.').map(|raw| match raw.strip_suffix("[]") {
            Some(key) => Segment { key, many: true },
            None => Segment {
                key: raw,
                many: false,
            },
        })
    }

    /// True when the path can resolve to more than one value.
    pub fn is_multi_valued(&self) -> bool {
        self.segments().any(|s| s.many)
    }

    /// Resolve the path against a JSON document.
    pub fn resolve<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];
        for segment in self.segments() {
            let mut next = Vec::new();
            for value in current {
                let Some(child) = value.get(segment.key) else {
                    continue;
                };
                match child {
                    Value::Array(items) if segment.many => next.extend(items.iter()),
                    other => next.push(other),
                }
            }
            current = next;
        }
        current
    }

    /// String leaves reachable through the path, with leaf arrays unwrapped.
    pub fn strings<'a>(&self, root: &'a Value) -> Vec<&'a str> {
        let mut out = Vec::new();
        for value in self.resolve(root) {
            match value {
                Value::String(s) => out.push(s.as_str()),
                Value::Array(items) => out.extend(items.iter().filter_map(Value::as_str)),
                _ => {}
            }
        }
        out
    }

    /// SQL/JSON path expression (`$."address"."city"`, `$."testsOffered"[*]."name"`).
    pub fn to_json_path(&self) -> String {
        let mut out = String::from("$");
        for segment in self.segments() {
            out.push_str(".\"");
            out.push_str(segment.key);
            out.push('"');
            if segment.many {
                out.push_str("[*]");
            }
        }
        out
    }

    /// Key list for the PostgreSQL `#>>` operator. `None` for multi-valued paths.
    pub fn to_key_path(&self) -> Option<Vec<String>> {
        if self.is_multi_valued() {
            return None;
        }
        Some(self.segments().map(|s| s.key.to_string()).collect())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_nested_and_array_paths() {
        let doc = json!({
            "address": { "city": "Springfield" },
            "testsOffered": [{ "name": "Lipid panel" }, { "name": "CBC" }],
            "servicesOffered": ["X-Ray", "MRI"]
        });

        assert_eq!(
            FieldPath::new("address.city").strings(&doc),
            vec!["Springfield"]
        );
        assert_eq!(
            FieldPath::new("testsOffered[].name").strings(&doc),
            vec!["Lipid panel", "CBC"]
        );
        assert_eq!(
            FieldPath::new("servicesOffered").strings(&doc),
            vec!["X-Ray", "MRI"]
        );
        assert!(FieldPath::new("address.state").strings(&doc).is_empty());
    }

    #[test]
    fn renders_sql_paths() {
        assert_eq!(
            FieldPath::new("testsOffered[].name").to_json_path(),
            r#"$."testsOffered"[*]."name""#
        );
        assert_eq!(
            FieldPath::new("address.city").to_key_path(),
            Some(vec!["address".to_string(), "city".to_string()])
        );
        assert_eq!(FieldPath::new("servicesOffered[]").to_key_path(), None);
    }
}
