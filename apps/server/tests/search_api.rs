#![allow(unused)]

#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use careway_models::EntityKind;
use support::*;

#[tokio::test]
async fn place_filter_returns_active_clinics_by_rating() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app.get_json("/api/search?type=clinics&place=Springfield").await?;
            assert_status(status, StatusCode::OK, "place search");
            assert_ok_status(&body);
            assert_eq!(body["strategy"], "filters_only");
            assert_eq!(result_ids(&body, "clinics")?, vec!["c-river", "c-sun"]);
            assert_eq!(body["totalCount"], 2);
            assert_eq!(body["filters"]["place"], "Springfield");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn free_text_matches_names_specializations_and_departments() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app.get_json("/api/search?type=practitioners&q=cardio").await?;
            assert_status(status, StatusCode::OK, "text search");
            assert_eq!(body["strategy"], "text");
            // p-amir only matches through the Cardiology department
            assert_eq!(result_ids(&body, "practitioners")?, vec!["p-amir", "p-bela"]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn unknown_category_yields_no_results() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app
                .get_json("/api/search?type=practitioners&category=Astrology")
                .await?;
            assert_status(status, StatusCode::OK, "unknown category");
            assert_no_results(&body);
            assert_eq!(body["message"], "No providers matched your search");

            let (_, body) = app
                .get_json("/api/search?type=practitioners&category=heart")
                .await?;
            assert_eq!(result_ids(&body, "practitioners")?, vec!["p-amir"]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn experience_ranges() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (_, body) = app
                .get_json("/api/search?type=practitioners&experience=10%2B")
                .await?;
            assert_eq!(result_ids(&body, "practitioners")?, vec!["p-amir"]);

            let (_, body) = app
                .get_json("/api/search?type=practitioners&experience=3-5")
                .await?;
            assert_eq!(result_ids(&body, "practitioners")?, vec!["p-bela", "p-chen"]);

            // Malformed ranges are ignored
            let (status, body) = app
                .get_json("/api/search?type=practitioners&experience=lots")
                .await?;
            assert_status(status, StatusCode::OK, "malformed experience");
            assert_eq!(
                result_ids(&body, "practitioners")?,
                vec!["p-bela", "p-amir", "p-chen"]
            );
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn fee_filter_reads_numeric_strings() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (_, body) = app
                .get_json("/api/search?type=practitioners&fee=600-1000")
                .await?;
            assert_eq!(result_ids(&body, "practitioners")?, vec!["p-bela"]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn service_and_rating_filters_apply_to_facilities() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (_, body) = app.get_json("/api/search?type=clinics&service=x-ray").await?;
            assert_eq!(result_ids(&body, "clinics")?, vec!["c-sun"]);

            let (_, body) = app.get_json("/api/search?type=clinics&rating=4.5").await?;
            assert_eq!(result_ids(&body, "clinics")?, vec!["c-shelby", "c-river"]);

            // Practitioner-only filters do not narrow facilities
            let (_, body) = app
                .get_json("/api/search?type=clinics&experience=50%2B&place=Shelbyville")
                .await?;
            assert_eq!(result_ids(&body, "clinics")?, vec!["c-shelby"]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn text_with_coordinates_is_rejected_by_default() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app
                .get_json("/api/search?type=clinics&q=clinic&lng=-89.65&lat=39.78")
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "text with geo");
            assert_eq!(error_code(&body), Some("invalid_request"));

            let (status, _) = app
                .get_json("/api/search?type=clinics&q=clinic&place=Springfield")
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "text with place");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn geo_text_pages_from_a_bounded_candidate_window() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| config.search.reject_text_with_geography = false,
        |app| {
            Box::pin(async move {
                let (lng, lat) = places::SPRINGFIELD;
                let (status, body) = app
                    .get_json(&format!(
                        "/api/search?type=clinics&q=clinic&lng={lng}&lat={lat}&limit=1"
                    ))
                    .await?;
                assert_status(status, StatusCode::OK, "geo text");
                assert_eq!(body["strategy"], "geo_text");
                assert_eq!(result_ids(&body, "clinics")?, vec!["c-sun"]);
                assert_eq!(body["counts"]["clinics"]["returned"], 1);
                let considered = body["counts"]["clinics"]["considered"].as_u64().unwrap();
                assert!(considered <= 5, "considered {considered} candidates");

                let (_, body) = app
                    .get_json(&format!(
                        "/api/search?type=clinics&q=riverside&lng={lng}&lat={lat}"
                    ))
                    .await?;
                assert_eq!(result_ids(&body, "clinics")?, vec!["c-river"]);
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn coordinates_sort_by_distance_within_radius() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (lng, lat) = places::SPRINGFIELD;
            let (status, body) = app
                .get_json(&format!("/api/search?type=clinics&lng={lng}&lat={lat}"))
                .await?;
            assert_status(status, StatusCode::OK, "geo search");
            assert_eq!(body["strategy"], "geo");
            assert_eq!(result_ids(&body, "clinics")?, vec!["c-sun", "c-river"]);
            assert!(body["results"]["clinics"][0]["distanceKm"].as_f64().unwrap() < 0.01);

            let (_, body) = app
                .get_json(&format!(
                    "/api/search?type=clinics&lng={lng}&lat={lat}&maxDistance=200"
                ))
                .await?;
            assert_eq!(
                result_ids(&body, "clinics")?,
                vec!["c-sun", "c-river", "c-shelby"]
            );
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn every_requested_kind_is_keyed() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (_, body) = app
                .get_json("/api/search?type=clinics,labs,pharmacies&place=old%20town")
                .await?;
            assert_ok_status(&body);
            assert_eq!(result_ids(&body, "pharmacies")?, vec!["ph-corner"]);
            assert!(result_ids(&body, "clinics")?.is_empty());
            assert!(result_ids(&body, "labs")?.is_empty());
            assert!(body["results"].get("practitioners").is_none());
            assert_eq!(body["unavailableKinds"], serde_json::json!([]));
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn lab_text_search_reaches_offered_tests() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (_, body) = app.get_json("/api/search?type=labs&q=lipid").await?;
            assert_eq!(result_ids(&body, "labs")?, vec!["l-precision"]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn invalid_parameters_are_rejected() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app.get_json("/api/search?type=patients").await?;
            assert_status(status, StatusCode::BAD_REQUEST, "unknown type");
            assert_eq!(error_code(&body), Some("invalid_request"));

            let (status, _) = app.get_json("/api/search?page=0").await?;
            assert_status(status, StatusCode::BAD_REQUEST, "page zero");

            let (status, _) = app.get_json("/api/search?maxDistance=-3").await?;
            assert_status(status, StatusCode::BAD_REQUEST, "negative distance");

            let (status, _) = app.get_json("/api/search?limit=1000").await?;
            assert_status(status, StatusCode::BAD_REQUEST, "limit above max");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn restricted_kinds_follow_caller_role() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| config.search.restricted_kinds = vec![EntityKind::Ambulance],
        |app| {
            Box::pin(async move {
                let (status, _) = app.get_json("/api/search?type=ambulances").await?;
                assert_status(status, StatusCode::BAD_REQUEST, "public ambulances");

                let (status, body) = app
                    .get_json_as("/api/search?type=ambulances", Some("staff"))
                    .await?;
                assert_status(status, StatusCode::OK, "staff ambulances");
                assert_eq!(result_ids(&body, "ambulances")?, vec!["a-rapid"]);

                let (_, body) = app.get_json("/api/search?place=Springfield").await?;
                assert!(body["results"].get("ambulances").is_none());
                assert!(body["results"].get("clinics").is_some());
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn health_and_request_headers() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, headers, _) = app.request(Method::GET, "/health", None).await?;
            assert_status(status, StatusCode::OK, "health");
            assert!(headers.contains_key("x-request-id"));
            assert_eq!(headers["x-content-type-options"], "nosniff");

            let (status, headers, _) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/api/search?type=clinics",
                    None,
                    &[("x-request-id", "req-42")],
                )
                .await?;
            assert_status(status, StatusCode::OK, "search");
            assert!(headers.contains_key("x-request-id"));
            assert_eq!(headers["x-correlation-id"], "req-42");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn blank_or_malformed_coordinates_fall_back_to_place() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for coords in ["lng=&lat=", "lng=abc&lat=39.78", "lng=-89.65"] {
                let (status, body) = app
                    .get_json(&format!("/api/search?type=clinics&place=Springfield&{coords}"))
                    .await?;
                assert_status(status, StatusCode::OK, coords);
                assert_eq!(body["strategy"], "filters_only", "{coords}");
                assert_eq!(result_ids(&body, "clinics")?, vec!["c-river", "c-sun"]);
            }

            // Blank coordinates do not count as geography next to free text
            let (status, body) = app
                .get_json("/api/search?type=clinics&q=sunrise&lng=&lat=")
                .await?;
            assert_status(status, StatusCode::OK, "text with blank coordinates");
            assert_eq!(body["strategy"], "text");
            assert_eq!(result_ids(&body, "clinics")?, vec!["c-sun"]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn multi_word_text_keeps_department_matches() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (_, body) = app
                .get_json("/api/search?type=practitioners&q=cardio%20doctor")
                .await?;
            assert_eq!(result_ids(&body, "practitioners")?, vec!["p-amir", "p-bela"]);
            Ok(())
        })
    })
    .await
}
