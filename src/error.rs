// SPDX-FileCopyrightText: 2026 CWT Studio
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP-facing error types for the form endpoints.
//!
//! Client input errors are returned verbatim. Everything else gets a
//! generic message; the detail is logged here and never sent back.

use crate::mailer::MailerError;
use crate::validator::ValidationError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Too many requests")]
    RateLimited { retry_after_secs: u64 },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Missing configuration: {0}")]
    Config(&'static str),

    #[error("Email delivery failed: {0}")]
    Upstream(#[from] MailerError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            retry_after: None,
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Validation(ValidationError::PayloadTooLarge) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short outcome label used in logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method_not_allowed",
            Self::RateLimited { .. } => "rate_limited",
            Self::Validation(ValidationError::PayloadTooLarge) => "too_large",
            Self::Validation(_) => "invalid",
            Self::Config(_) => "config_error",
            Self::Upstream(_) => "upstream_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Message safe to send to the client.
    pub fn public_message(&self) -> String {
        match self {
            Self::MethodNotAllowed | Self::RateLimited { .. } | Self::Validation(_) => {
                self.to_string()
            }
            Self::Config(_) => "Server configuration error".to_string(),
            Self::Upstream(_) => "Failed to deliver email".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::Config(_) | Self::Upstream(_) | Self::Internal(_) => {
                error!(error = %self, status = status.as_u16(), "Request failed");
            }
            _ => {}
        }

        let mut body = ErrorResponse::new(self.public_message());

        match self {
            Self::MethodNotAllowed => {
                (status, [(header::ALLOW, "POST")], Json(body)).into_response()
            }
            Self::RateLimited { retry_after_secs } => {
                body.retry_after = Some(retry_after_secs);
                (
                    status,
                    [(header::RETRY_AFTER, retry_after_secs.to_string())],
                    Json(body),
                )
                    .into_response()
            }
            _ => (status, Json(body)).into_response(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;
