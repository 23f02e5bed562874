// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token middleware for the gateway.
//!
//! When no token is configured, all requests are rejected (fail-closed).

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

/// Authentication configuration for the gateway.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected bearer token.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Rejects requests whose `Authorization: Bearer <token>` does not match.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = auth.bearer_token.as_deref() else {
        tracing::error!("gateway has no bearer token configured -- rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let matches = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token == expected);

    match matches {
        Some(true) => Ok(next.run(request).await),
        Some(false) => {
            tracing::debug!(path = %request.uri().path(), "bearer token mismatch");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => Err(StatusCode::UNAUTHORIZED),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http, middleware, routing::get};
    use tower::ServiceExt;
    use tracing_test::traced_test;

    use super::*;

    fn app(token: Option<&str>) -> Router {
        let auth = AuthConfig {
            bearer_token: token.map(str::to_string),
        };
        Router::new()
            .route("/secret", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(auth, auth_middleware))
    }

    async fn status_for(app: Router, header: Option<&str>) -> StatusCode {
        let mut request = http::Request::builder().uri("/secret");
        if let Some(value) = header {
            request = request.header("authorization", value);
        }
        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn matching_token_passes() {
        let status = status_for(app(Some("s3cret")), Some("Bearer s3cret")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_or_missing_token_is_unauthorized() {
        for header in [None, Some("Bearer nope"), Some("s3cret"), Some("bearer s3cret")] {
            let status = status_for(app(Some("s3cret")), header).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{header:?}");
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn no_token_configured_fails_closed() {
        let status = status_for(app(None), Some("Bearer anything")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(logs_contain("no bearer token configured"));
    }

    #[test]
    fn debug_redacts_token() {
        let config = AuthConfig {
            bearer_token: Some("s3cret".into()),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[redacted]"));
        assert!(!debug.contains("s3cret"));
    }
}
