//! Search handlers
//!
//! - `GET /api/search`: federated search across kinds
//! - `GET /api/search/suggest`: typeahead
//! - `GET /api/search/locations`: known place names

use crate::{
    api::extractors::{Caller, ValidatedQuery},
    api::params::{SearchParams, SuggestParams},
    search::AggregateOutcome,
    state::AppState,
    Result,
};
use axum::{extract::State, Json};
use serde_json::{json, Value as JsonValue};

pub async fn search_handler(
    State(state): State<AppState>,
    Caller(role): Caller,
    ValidatedQuery(params): ValidatedQuery<SearchParams>,
) -> Result<Json<AggregateOutcome>> {
    let outcome = state.directory.search(params.into(), role).await?;
    Ok(Json(outcome))
}

pub async fn suggest_handler(
    State(state): State<AppState>,
    Caller(role): Caller,
    ValidatedQuery(params): ValidatedQuery<SuggestParams>,
) -> Result<Json<JsonValue>> {
    let suggestions = state
        .directory
        .suggest(params.q.as_deref(), params.kind.as_deref(), role)
        .await?;
    Ok(Json(json!({ "suggestions": suggestions })))
}

pub async fn locations_handler(State(state): State<AppState>) -> Result<Json<JsonValue>> {
    let locations = state.directory.known_locations().await?;
    Ok(Json(json!({ "locations": locations })))
}
