// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::auth::AuthContext;
use crate::error::ApiError;

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for the verified caller.
///
/// The gate middleware inserts the [`AuthContext`] for every protected
/// method. Returns 401 if the request was not authorized.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(ctx): Auth) -> impl IntoResponse {
///     format!("Hello, {}", ctx.user_id())
/// }
/// ```
pub struct Auth(pub AuthContext);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(Auth)
            .ok_or_else(|| ApiError::unauthenticated("authorization token is not provided"))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for JSON payloads.
///
/// Extracts and deserializes JSON, returning a 400 for malformed input.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Request ID Extractor
// =============================================================================

/// Extractor for the request ID.
pub struct RequestId(pub uuid::Uuid);

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .extensions
            .get::<AuthContext>()
            .map(|ctx| ctx.request_id)
            .unwrap_or_else(uuid::Uuid::now_v7);

        Ok(RequestId(id))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    #[tokio::test]
    async fn test_auth_rejects_missing_context() {
        let (mut parts, _) = Request::builder()
            .uri("/x")
            .body(Body::empty())
            .unwrap()
            .into_parts();
        let err = Auth::from_request_parts(&mut parts, &()).await.err().unwrap();
        assert!(matches!(err, ApiError::Unauthenticated { .. }));
    }

    #[tokio::test]
    async fn test_validated_json_rejects_garbage() {
        let req = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let result = ValidatedJson::<serde_json::Value>::from_request(req, &()).await;
        assert!(matches!(result.err(), Some(ApiError::BadRequest { .. })));
    }
}
