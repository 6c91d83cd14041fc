use super::builders::{CategoryBuilder, EntityBuilder};
use careway::db::InMemoryDirectoryStore;
use careway_models::{Category, Entity};

/// Common coordinates
pub mod places {
    /// Springfield city centre (longitude, latitude).
    pub const SPRINGFIELD: (f64, f64) = (-89.65, 39.78);
    /// Roughly 85 km from Springfield.
    pub const SHELBYVILLE: (f64, f64) = (-88.79, 39.41);
}

pub fn fixture_categories() -> Vec<Category> {
    let mut categories = vec![
        CategoryBuilder::new("cat-card", "Cardiology")
            .heading("Heart Care")
            .specialization("Cardiologist")
            .build(),
        CategoryBuilder::new("cat-derm", "Dermatology")
            .heading("Skin")
            .build(),
        CategoryBuilder::new("cat-retired", "Cardio Rehab (retired)")
            .inactive()
            .build(),
    ];
    for (i, name) in [
        "Dentistry",
        "ENT",
        "Gastroenterology",
        "General Medicine",
        "Neurology",
        "Oncology",
        "Orthopaedics",
        "Pediatrics",
        "Psychiatry",
        "Urology",
    ]
    .into_iter()
    .enumerate()
    {
        categories.push(CategoryBuilder::new(format!("cat-{i}"), name).build());
    }
    categories
}

pub fn fixture_entities() -> Vec<Entity> {
    let (sx, sy) = places::SPRINGFIELD;
    let (bx, by) = places::SHELBYVILLE;

    vec![
        EntityBuilder::practitioner("p-amir", "Dr. Amir Khan")
            .attr("specialization", "Physician")
            .attr("department", "cat-card")
            .attr("city", "Springfield")
            .attr("yearsExperience", 12)
            .attr("consultationFee", 500)
            .rating(4.1)
            .at(sx - 0.005, sy + 0.005)
            .build(),
        EntityBuilder::practitioner("p-bela", "Dr. Bela Rao")
            .attr("specialization", "Cardiologist")
            .attr("specializationCategory", "cardiology")
            .attr("city", "Shelbyville")
            .attr("yearsExperience", 4)
            .attr("consultationFee", "800")
            .rating(4.8)
            .at(bx, by)
            .build(),
        EntityBuilder::practitioner("p-chen", "Dr. Chen Li")
            .attr("specialization", "Dermatologist")
            .attr("department", "cat-derm")
            .attr("city", "Springfield")
            .attr("yearsExperience", 3)
            .rating(3.9)
            .build(),
        EntityBuilder::practitioner("p-old", "Dr. Cardio Retired")
            .attr("specialization", "Cardiologist")
            .attr("city", "Springfield")
            .attr("yearsExperience", 40)
            .inactive()
            .build(),
        EntityBuilder::clinic("c-sun", "Sunrise Clinic")
            .city("Springfield")
            .services(&["X-Ray", "Vaccination"])
            .rating(4.2)
            .at(sx, sy)
            .build(),
        EntityBuilder::clinic("c-river", "Riverside Clinic")
            .attr("place", "Springfield Heights")
            .services(&["Dental"])
            .rating(4.7)
            .at(sx + 0.03, sy + 0.02)
            .build(),
        EntityBuilder::clinic("c-shelby", "Shelby Clinic")
            .city("Shelbyville")
            .rating(4.9)
            .at(bx, by)
            .build(),
        EntityBuilder::clinic("c-closed", "Closed Springfield Clinic")
            .city("Springfield")
            .rating(5.0)
            .at(sx, sy)
            .inactive()
            .build(),
        EntityBuilder::pharmacy("ph-corner", "Corner Pharmacy")
            .city("Springfield")
            .address("locality", "Old Town")
            .rating(4.0)
            .at(sx - 0.01, sy + 0.01)
            .build(),
        EntityBuilder::lab("l-precision", "Precision Diagnostics")
            .city("springfield")
            .attr(
                "testsOffered",
                serde_json::json!([{ "name": "Lipid Profile" }, { "name": "CBC" }]),
            )
            .rating(4.4)
            .at(sx + 0.01, sy - 0.01)
            .build(),
        EntityBuilder::ambulance("a-rapid", "Rapid Response")
            .attr("serviceArea", "Springfield")
            .attr("vehicleType", "ALS")
            .created_at("2024-03-01T00:00:00Z")
            .at(sx + 0.05, sy - 0.03)
            .build(),
    ]
}

/// The standard test directory.
pub fn directory_fixture() -> InMemoryDirectoryStore {
    InMemoryDirectoryStore::new(fixture_entities(), fixture_categories())
}
