//! Entity kinds and the per-kind field-mapping table.
//!
//! Provider records come from several legacy schemas, so the same logical concept
//! (where is it, what does it offer) lives under different keys per kind. The table
//! below is the single place that knows those keys; adding a kind means adding a
//! variant and a row.

use crate::{Error, FieldPath, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Practitioner,
    Clinic,
    Pharmacy,
    DiagnosticLab,
    Ambulance,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Practitioner,
        EntityKind::Clinic,
        EntityKind::Pharmacy,
        EntityKind::DiagnosticLab,
        EntityKind::Ambulance,
    ];

    /// Plural selector used in requests and as the response key.
    pub fn selector(&self) -> &'static str {
        profile(*self).selector
    }

    /// Storage discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Practitioner => "practitioner",
            EntityKind::Clinic => "clinic",
            EntityKind::Pharmacy => "pharmacy",
            EntityKind::DiagnosticLab => "diagnostic_lab",
            EntityKind::Ambulance => "ambulance",
        }
    }

    fn index(&self) -> usize {
        match self {
            EntityKind::Practitioner => 0,
            EntityKind::Clinic => 1,
            EntityKind::Pharmacy => 2,
            EntityKind::DiagnosticLab => 3,
            EntityKind::Ambulance => 4,
        }
    }

    /// Parse a `type` selector value. Accepts plural selectors, storage names and a
    /// few common aliases, case-insensitively.
    pub fn from_selector(raw: &str) -> Result<Self> {
        let kind = match raw.trim().to_ascii_lowercase().as_str() {
            "practitioners" | "practitioner" | "doctors" | "doctor" => EntityKind::Practitioner,
            "clinics" | "clinic" | "hospitals" | "hospital" => EntityKind::Clinic,
            "pharmacies" | "pharmacy" => EntityKind::Pharmacy,
            "labs" | "lab" | "diagnostic_lab" | "diagnosticlab" | "diagnostics" => {
                EntityKind::DiagnosticLab
            }
            "ambulances" | "ambulance" => EntityKind::Ambulance,
            _ => return Err(Error::UnknownKind(raw.to_string())),
        };
        Ok(kind)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_selector(s)
    }
}

/// Ordering used when a search has neither text nor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultSort {
    /// Numeric document field, highest first, missing values last.
    FieldDescending(FieldPath),
    NameAscending,
    NewestFirst,
}

/// One row of the field-mapping table.
#[derive(Debug)]
pub struct KindProfile {
    pub kind: EntityKind,
    pub selector: &'static str,
    /// Fields searched by free text, in priority order.
    pub text_fields: &'static [FieldPath],
    /// Fields a place name is matched against.
    pub location_fields: &'static [FieldPath],
    /// Fields matched by the `service` filter.
    pub service_fields: &'static [FieldPath],
    pub rating_field: Option<FieldPath>,
    pub default_sort: DefaultSort,
    /// Secondary line shown under a typeahead suggestion.
    pub subtext_fields: &'static [FieldPath],
}

const RATING: FieldPath = FieldPath::new("ratingAverage");

static PROFILES: [KindProfile; 5] = [
    KindProfile {
        kind: EntityKind::Practitioner,
        selector: "practitioners",
        text_fields: &[
            FieldPath::NAME,
            FieldPath::new("specialization"),
            FieldPath::new("bio"),
        ],
        location_fields: &[
            FieldPath::new("city"),
            FieldPath::new("state"),
            FieldPath::new("address.city"),
            FieldPath::new("address.state"),
        ],
        service_fields: &[FieldPath::new("servicesOffered[]")],
        rating_field: Some(RATING),
        default_sort: DefaultSort::FieldDescending(RATING),
        subtext_fields: &[FieldPath::new("specialization"), FieldPath::new("city")],
    },
    KindProfile {
        kind: EntityKind::Clinic,
        selector: "clinics",
        text_fields: &[
            FieldPath::NAME,
            FieldPath::new("description"),
            FieldPath::new("servicesOffered[]"),
        ],
        location_fields: &[
            FieldPath::new("address.city"),
            FieldPath::new("address.state"),
            FieldPath::new("place"),
        ],
        service_fields: &[FieldPath::new("servicesOffered[]")],
        rating_field: Some(RATING),
        default_sort: DefaultSort::FieldDescending(RATING),
        subtext_fields: &[FieldPath::new("address.city"), FieldPath::new("place")],
    },
    KindProfile {
        kind: EntityKind::Pharmacy,
        selector: "pharmacies",
        text_fields: &[
            FieldPath::NAME,
            FieldPath::new("description"),
            FieldPath::new("servicesOffered[]"),
        ],
        location_fields: &[
            FieldPath::new("address.city"),
            FieldPath::new("address.state"),
            FieldPath::new("address.locality"),
        ],
        service_fields: &[FieldPath::new("servicesOffered[]")],
        rating_field: Some(RATING),
        default_sort: DefaultSort::NameAscending,
        subtext_fields: &[
            FieldPath::new("address.locality"),
            FieldPath::new("address.city"),
        ],
    },
    KindProfile {
        kind: EntityKind::DiagnosticLab,
        selector: "labs",
        text_fields: &[
            FieldPath::NAME,
            FieldPath::new("testsOffered[].name"),
            FieldPath::new("servicesOffered[]"),
        ],
        location_fields: &[
            FieldPath::new("address.city"),
            FieldPath::new("address.state"),
            FieldPath::new("place"),
        ],
        service_fields: &[
            FieldPath::new("servicesOffered[]"),
            FieldPath::new("testsOffered[].name"),
        ],
        rating_field: Some(RATING),
        default_sort: DefaultSort::FieldDescending(RATING),
        subtext_fields: &[FieldPath::new("address.city"), FieldPath::new("place")],
    },
    KindProfile {
        kind: EntityKind::Ambulance,
        selector: "ambulances",
        text_fields: &[
            FieldPath::NAME,
            FieldPath::new("vehicleType"),
            FieldPath::new("servicesOffered[]"),
        ],
        location_fields: &[
            FieldPath::new("serviceArea"),
            FieldPath::new("city"),
            FieldPath::new("state"),
        ],
        service_fields: &[FieldPath::new("servicesOffered[]")],
        rating_field: None,
        default_sort: DefaultSort::NewestFirst,
        subtext_fields: &[FieldPath::new("vehicleType"), FieldPath::new("serviceArea")],
    },
];

/// Field-mapping row for a kind.
pub fn profile(kind: EntityKind) -> &'static KindProfile {
    &PROFILES[kind.index()]
}
