// SPDX-FileCopyrightText: 2026 CWT Studio
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the form relay service.
//!
//! Every form endpoint runs the same pipeline: configuration check, rate
//! limit, body parse, validation, then the notification email. The first
//! failing step decides the response.

use crate::config::Config;
use crate::error::{ApiError, ErrorResponse, Result};
use crate::forms::{FormDefinition, Payload, FORMS};
use crate::limiter::RateLimiter;
use crate::mailer::Mailer;
use crate::metrics::Metrics;
use crate::validator::ValidationError;
use axum::{
    body::to_bytes,
    extract::{ConnectInfo, Request, State},
    http::{header, Extensions, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub mailer: Arc<dyn Mailer>,
    pub metrics: Metrics,
    pub config: Config,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Successful submission body.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
}

/// Build the service router with every form endpoint mounted under `/api/`.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health));

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(metrics));
    }

    for form in FORMS {
        router = router.route(
            &format!("/api/{}", form.name),
            post(move |State(state): State<Arc<AppState>>, request: Request| {
                submit(form, state, request)
            })
            .fallback(move |State(state): State<Arc<AppState>>| {
                method_not_allowed(form, state)
            }),
        );
    }

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "cwt-forms",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => ApiError::Internal(e.to_string()).into_response(),
    }
}

/// Any method other than POST on a form endpoint.
pub async fn method_not_allowed(form: &'static FormDefinition, state: Arc<AppState>) -> Response {
    let err = ApiError::MethodNotAllowed;
    state.metrics.record(form.name, err.outcome());
    err.into_response()
}

/// Handle one form submission.
pub async fn submit(form: &'static FormDefinition, state: Arc<AppState>, request: Request) -> Response {
    match process(form, &state, request).await {
        Ok(()) => {
            state.metrics.record(form.name, "sent");
            info!(form = form.name, "Submission relayed");
            (StatusCode::OK, Json(SubmitResponse { success: true })).into_response()
        }
        Err(err) => {
            state.metrics.record(form.name, err.outcome());
            if let ApiError::Validation(ref reason) = err {
                info!(form = form.name, error = %reason, "Submission rejected");
            }
            err.into_response()
        }
    }
}

async fn process(form: &'static FormDefinition, state: &AppState, request: Request) -> Result<()> {
    if state.config.email.api_key.is_none() {
        return Err(ApiError::Config("RESEND_API_KEY"));
    }

    let ip = client_ip(request.headers(), request.extensions());
    let identifier = format!("{}:{}", form.name, ip);

    let rate = state.limiter.check(&identifier).await;
    state.metrics.set_tracked_identifiers(state.limiter.tracked().await);
    if let Some(retry_after_secs) = rate.retry_after_secs() {
        return Err(ApiError::RateLimited { retry_after_secs });
    }

    let body = to_bytes(request.into_body(), state.config.validation.max_body_bytes)
        .await
        .map_err(|_| ValidationError::PayloadTooLarge)?;
    let payload = parse_body(&body)?;
    debug!(form = form.name, %ip, fields = payload.len(), "Parsed submission");

    form.validate(&payload, state.config.validation.max_payload_bytes)?;

    let message = form.compose(&payload, &state.config.email, Utc::now());
    state.mailer.send(&message).await?;

    Ok(())
}

/// Parse a request body leniently.
///
/// An empty body or `null` is an empty object, and a JSON string is parsed
/// again as the document it contains. Anything that does not end up as an
/// object is rejected.
pub fn parse_body(body: &[u8]) -> std::result::Result<Payload, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError::InvalidBody)?;
    let value = match value {
        Value::String(inner) if inner.trim().is_empty() => return Ok(Map::new()),
        Value::String(inner) => {
            serde_json::from_str(&inner).map_err(|_| ValidationError::InvalidBody)?
        }
        other => other,
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(ValidationError::InvalidBody),
    }
}

/// Best-effort client address: proxy headers first, then the socket peer.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .map(str::to_string)
        .or_else(|| {
            extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(%detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal server error")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_empty_body() {
        assert!(parse_body(b"").unwrap().is_empty());
        assert!(parse_body(b"  \n").unwrap().is_empty());
        assert!(parse_body(b"null").unwrap().is_empty());
        assert!(parse_body(br#""""#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_object_and_encoded_string() {
        let direct = parse_body(br#"{"name": "Ada"}"#).unwrap();
        let encoded = parse_body(br#""{\"name\": \"Ada\"}""#).unwrap();
        assert_eq!(direct, encoded);
        assert_eq!(direct["name"], "Ada");
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert_eq!(parse_body(b"{oops"), Err(ValidationError::InvalidBody));
        assert_eq!(parse_body(b"[1, 2]"), Err(ValidationError::InvalidBody));
        assert_eq!(parse_body(br#""not json""#), Err(ValidationError::InvalidBody));
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers, &Extensions::new()), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_fallbacks() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers, &Extensions::new()), "198.51.100.2");

        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4000))));
        assert_eq!(client_ip(&HeaderMap::new(), &extensions), "192.0.2.1");

        assert_eq!(client_ip(&HeaderMap::new(), &Extensions::new()), "unknown");
    }
}
