// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authorization gate middleware.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::auth::AuthorizationGate;

// =============================================================================
// GateLayer
// =============================================================================

/// Layer running every request through the [`AuthorizationGate`].
///
/// The request path is the method name. Admitted requests carry an
/// [`AuthContext`](crate::auth::AuthContext) in their extensions.
#[derive(Clone)]
pub struct GateLayer {
    gate: AuthorizationGate,
}

impl GateLayer {
    /// Creates a new gate layer.
    pub fn new(gate: AuthorizationGate) -> Self {
        Self { gate }
    }
}

impl<S> Layer<S> for GateLayer {
    type Service = GateMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GateMiddleware {
            inner,
            gate: self.gate.clone(),
        }
    }
}

// =============================================================================
// GateMiddleware
// =============================================================================

#[derive(Clone)]
pub struct GateMiddleware<S> {
    inner: S,
    gate: AuthorizationGate,
}

impl<S> Service<Request<Body>> for GateMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let gate = self.gate.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let method = req.uri().path().to_string();
            let token = extract_token(&req);

            let ctx = match gate.authorize(&method, token.as_deref()).await {
                Ok(ctx) => ctx,
                Err(e) => return Ok(e.into_response()),
            };

            if let Some(mut ctx) = ctx {
                if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
                    ctx = ctx.with_client_ip(addr.ip());
                }
                tracing::debug!(
                    method = %method,
                    user_id = %ctx.user_id(),
                    request_id = %ctx.request_id,
                    "Request authorized"
                );
                req.extensions_mut().insert(ctx);
            }

            inner.call(req).await
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Extracts the token from the `authorization` header, with or without a
/// `Bearer ` prefix.
fn extract_token<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim().to_string())
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token() {
        let mut req = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        assert!(extract_token(&req).is_none());

        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("raw-token"));
        assert_eq!(extract_token(&req), Some("raw-token".to_string()));

        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer mytoken123"),
        );
        assert_eq!(extract_token(&req), Some("mytoken123".to_string()));

        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_token(&req).is_none());
    }
}
