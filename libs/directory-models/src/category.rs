use serde::{Deserialize, Serialize};

pub type CategoryId = String;

/// Department grouping a practitioner may belong to (e.g. "Cardiology").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Category {
    /// Case-insensitive substring match on name, heading or specialization.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        std::iter::once(Some(self.name.as_str()))
            .chain([self.heading.as_deref(), self.specialization.as_deref()])
            .flatten()
            .any(|alias| alias.to_lowercase().contains(&needle))
    }
}
