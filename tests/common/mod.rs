// SPDX-FileCopyrightText: 2026 CWT Studio
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Shared fixtures for router-level tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use cwt_forms::{
    config::{Config, EmailConfig},
    handlers::{router, AppState},
    limiter::RateLimiter,
    mailer::{EmailMessage, Mailer, MailerError},
    metrics::Metrics,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Mailer that records messages instead of sending them.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        if self.fail {
            return Err(MailerError::Rejected {
                status: 500,
                body: "provider down".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        email: EmailConfig {
            api_key: Some("re_test".to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn app_with(config: Config, mailer: Arc<dyn Mailer>) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        limiter: RateLimiter::new(config.rate_limit.clone()),
        mailer,
        metrics: Metrics::new().unwrap(),
        config,
    });
    (router(state.clone()), state)
}

pub fn post_json(uri: &str, ip: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(body.into())
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn contact_body() -> String {
    serde_json::json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "company": "Analytical Engines Ltd",
        "message": "We would like to talk about automating our reporting."
    })
    .to_string()
}
