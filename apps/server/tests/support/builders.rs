use careway_models::{Category, Entity, EntityKind, GeoPoint};
use serde_json::{json, Map, Value};

/// Builder for directory entities of any kind.
pub struct EntityBuilder {
    id: String,
    kind: EntityKind,
    name: String,
    active: bool,
    created_at: Option<String>,
    location: Option<GeoPoint>,
    attributes: Map<String, Value>,
}

impl EntityBuilder {
    pub fn new(kind: EntityKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            active: true,
            created_at: None,
            location: None,
            attributes: Map::new(),
        }
    }

    pub fn practitioner(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(EntityKind::Practitioner, id, name)
    }

    pub fn clinic(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(EntityKind::Clinic, id, name)
    }

    pub fn pharmacy(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(EntityKind::Pharmacy, id, name)
    }

    pub fn lab(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(EntityKind::DiagnosticLab, id, name)
    }

    pub fn ambulance(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(EntityKind::Ambulance, id, name)
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn created_at(mut self, rfc3339: impl Into<String>) -> Self {
        self.created_at = Some(rfc3339.into());
        self
    }

    pub fn at(mut self, longitude: f64, latitude: f64) -> Self {
        self.location = Some(GeoPoint::new(longitude, latitude));
        self
    }

    /// Set a top-level attribute.
    pub fn attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn city(self, city: &str) -> Self {
        self.address("city", city)
    }

    /// Set a field inside the `address` object.
    pub fn address(mut self, key: &str, value: &str) -> Self {
        let address = self
            .attributes
            .entry("address")
            .or_insert_with(|| json!({}));
        if let Value::Object(map) = address {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
        self
    }

    pub fn rating(self, rating: f64) -> Self {
        self.attr("ratingAverage", rating)
    }

    pub fn services(self, services: &[&str]) -> Self {
        self.attr("servicesOffered", json!(services))
    }

    pub fn build(self) -> Entity {
        let mut value = json!({
            "id": self.id,
            "kind": self.kind,
            "name": self.name,
            "isActive": self.active,
            "attributes": Value::Object(self.attributes),
        });
        if let Some(location) = self.location {
            value["location"] = json!(location);
        }
        if let Some(created_at) = self.created_at {
            value["createdAt"] = json!(created_at);
        }
        serde_json::from_value(value).expect("valid entity")
    }
}

/// Builder for categories.
pub struct CategoryBuilder {
    category: Category,
}

impl CategoryBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: Category {
                id: id.into(),
                name: name.into(),
                heading: None,
                specialization: None,
                is_active: true,
            },
        }
    }

    pub fn heading(mut self, heading: impl Into<String>) -> Self {
        self.category.heading = Some(heading.into());
        self
    }

    pub fn specialization(mut self, specialization: impl Into<String>) -> Self {
        self.category.specialization = Some(specialization.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.category.is_active = false;
        self
    }

    pub fn build(self) -> Category {
        self.category
    }
}
