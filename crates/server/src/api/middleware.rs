//! Caller authentication and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use docvault_core::{AuthMethod, CallerAuthError, CallerRequest};

use super::error::ApiError;
use crate::metrics::{
    normalize_path, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};
use crate::state::AppState;

/// Records duration, count and in-flight gauge for every request.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();
    let response = next.run(request).await;
    HTTP_REQUESTS_IN_FLIGHT.dec();

    let status = response.status().as_u16().to_string();
    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(start.elapsed().as_secs_f64());
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Rejects callers the configured authenticator does not accept.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let authenticator = state.authenticator();
    if authenticator.method() == AuthMethod::None {
        return next.run(request).await;
    }

    let caller_request = CallerRequest {
        headers: request
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect(),
    };

    match authenticator.verify(&caller_request) {
        Ok(caller) => {
            debug!(caller = %caller.id, "Accepted API caller");
            next.run(request).await
        }
        Err(e) => {
            let reason = match e {
                CallerAuthError::MissingCredentials => "missing_credentials",
                CallerAuthError::InvalidCredentials => "invalid_credentials",
                CallerAuthError::Configuration(_) => "configuration",
            };
            AUTH_FAILURES_TOTAL.with_label_values(&[reason]).inc();
            debug!(reason, "Rejected API caller");

            let status = match e {
                CallerAuthError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::UNAUTHORIZED,
            };
            ApiError::new(status, e.to_string()).into_response()
        }
    }
}
