pub mod assertions;
pub mod builders;
pub mod fixtures;

use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use careway::{
    api::create_router, config::StoreBackend, db::InMemoryDirectoryStore, AppState, Config,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt as _;

// Re-export commonly used items
pub use assertions::*;
pub use builders::*;
pub use fixtures::*;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new(store: InMemoryDirectoryStore) -> Self {
        Self::new_with_config(store, |_| {})
    }

    pub fn new_with_config(store: InMemoryDirectoryStore, configure: impl FnOnce(&mut Config)) -> Self {
        let mut config = Config::default();
        config.database.backend = StoreBackend::Memory;
        configure(&mut config);

        let store = Arc::new(store);
        let state = AppState::with_stores(config, store.clone(), store);
        let router = create_router(state.clone());

        Self { router, state }
    }

    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Bytes>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        self.request_with_extra_headers(method, path_and_query, body, &[])
            .await
    }

    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Bytes>,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut request = Request::builder()
            .method(method)
            .uri(path_and_query)
            .header("host", "example.org")
            .header("accept", "application/json")
            .body(match body {
                Some(bytes) => Body::from(bytes),
                None => Body::empty(),
            })
            .context("build request")?;

        for (name, value) in extra_headers {
            request.headers_mut().insert(
                name.parse::<HeaderName>().context("parse header name")?,
                value.parse::<HeaderValue>().context("parse header value")?,
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;

        Ok((status, headers, body))
    }

    /// GET returning the parsed JSON body.
    pub async fn get_json(&self, path_and_query: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.get_json_as(path_and_query, None).await
    }

    /// GET as a caller with the given `x-caller-role`.
    pub async fn get_json_as(
        &self,
        path_and_query: &str,
        role: Option<&str>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let headers: Vec<(&str, &str)> = role.map(|r| ("x-caller-role", r)).into_iter().collect();
        let (status, _headers, body) = self
            .request_with_extra_headers(Method::GET, path_and_query, None, &headers)
            .await?;
        let value = serde_json::from_slice(&body)
            .with_context(|| format!("parse JSON body: {}", String::from_utf8_lossy(&body)))?;
        Ok((status, value))
    }
}

/// Run `f` against the standard directory fixture with default configuration.
pub async fn with_test_app<F>(f: F) -> anyhow::Result<()>
where
    F: for<'a> FnOnce(
        &'a TestApp,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = anyhow::Result<()>> + 'a>,
    >,
{
    with_test_app_with_config(|_| {}, f).await
}

pub async fn with_test_app_with_config<C, F>(configure: C, f: F) -> anyhow::Result<()>
where
    C: FnOnce(&mut Config),
    F: for<'a> FnOnce(
        &'a TestApp,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = anyhow::Result<()>> + 'a>,
    >,
{
    with_test_app_over(directory_fixture(), configure, f).await
}

/// Run `f` against a custom store.
pub async fn with_test_app_over<C, F>(
    store: InMemoryDirectoryStore,
    configure: C,
    f: F,
) -> anyhow::Result<()>
where
    C: FnOnce(&mut Config),
    F: for<'a> FnOnce(
        &'a TestApp,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = anyhow::Result<()>> + 'a>,
    >,
{
    let app = TestApp::new_with_config(store, configure);
    f(&app).await
}
