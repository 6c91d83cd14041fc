use anyhow::Context as _;
use axum::http::StatusCode;
use serde_json::Value;

/// Assert a status code with context
pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(
        actual, expected,
        "{context}: expected status {expected}, got {actual}"
    );
}

/// Ids of one kind's results, in response order.
pub fn result_ids(response: &Value, selector: &str) -> anyhow::Result<Vec<String>> {
    let items = response["results"][selector]
        .as_array()
        .with_context(|| format!("results.{selector} is an array in {response}"))?;
    Ok(items
        .iter()
        .filter_map(|item| item["id"].as_str().map(str::to_string))
        .collect())
}

pub fn assert_ok_status(response: &Value) {
    assert_eq!(
        response["status"], "ok",
        "expected an ok search response, got {response}"
    );
}

pub fn assert_no_results(response: &Value) {
    assert_eq!(
        response["status"], "no_results",
        "expected a no_results response, got {response}"
    );
    assert_eq!(response["totalCount"], 0);
    assert!(response.get("results").is_none());
}

/// Error envelope code (`invalid_request`, `store_unavailable`, ...).
pub fn error_code(response: &Value) -> Option<&str> {
    response["error"]["code"].as_str()
}
