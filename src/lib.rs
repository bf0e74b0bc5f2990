// SPDX-FileCopyrightText: 2026 CWT Studio
// SPDX-License-Identifier: PMPL-1.0-or-later

//! CWT Studio form relay
//!
//! Backend for the site's lead forms. Each submission is rate limited per
//! endpoint and client IP, validated, and forwarded as a notification
//! email through the transactional email provider:
//!
//! - Fixed-window rate limiting (10 requests per 60 s per identifier)
//! - Payload size, required field, email format and length checks
//! - Contact, consultation and assessment forms
//! - Prometheus counters per form and outcome

pub mod config;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod validator;

pub use config::Config;
pub use error::ApiError;
pub use limiter::{RateLimitResult, RateLimiter};
pub use validator::{ValidationError, ValidationReport};
