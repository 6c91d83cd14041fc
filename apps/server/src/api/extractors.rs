//! Custom Axum extractors for the search API.

use crate::request_context::{CallerRole, RequestContext, CALLER_ROLE_HEADER};
use crate::Error;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Query-string extractor that deserializes and then validates `T`.
///
/// Both failure kinds surface as [`Error::InvalidRequest`] so every 400 from the
/// API shares the same JSON envelope.
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::InvalidRequest(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| Error::InvalidRequest(errors.to_string()))?;
        Ok(ValidatedQuery(value))
    }
}

/// Caller role resolved by the request-id middleware, or read from the
/// gateway-supplied header when the middleware did not run. Never rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub CallerRole);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<RequestContext>() {
            return Ok(Caller(context.role));
        }
        let header = parts
            .headers
            .get(CALLER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok());
        Ok(Caller(CallerRole::from_header(header)))
    }
}
