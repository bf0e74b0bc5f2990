// SPDX-FileCopyrightText: 2026 CWT Studio
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Notification email relay.
//!
//! Submissions are forwarded to the transactional email provider's HTTP
//! API. The handlers only see the [`Mailer`] trait so tests can swap in a
//! recording implementation.

use crate::config::EmailConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Mail relay error types. Never shown to the client.
#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Email API key is not configured")]
    MissingApiKey,

    #[error("Email request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Email provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// A plain-text notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// Something that can deliver an [`EmailMessage`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError>;
}

/// Client for the Resend `POST /emails` API.
pub struct ResendMailer {
    client: Client,
    api_base: String,
    api_key: Option<String>,
}

impl ResendMailer {
    /// Build a mailer from configuration.
    pub fn new(config: &EmailConfig) -> Result<Self, MailerError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        let api_key = self.api_key.as_deref().ok_or(MailerError::MissingApiKey)?;
        let url = format!("{}/emails", self.api_base);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), subject = %message.subject, "Email accepted");
            return Ok(());
        }

        let body: String = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(1000)
            .collect();
        warn!(status = status.as_u16(), "Email provider returned an error");

        Err(MailerError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
