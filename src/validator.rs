// SPDX-FileCopyrightText: 2026 CWT Studio
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Form payload validation.
//!
//! Every check is a pure function over a JSON payload. None of them
//! throw or log on bad input: they return booleans, lists, or a
//! [`ValidationReport`], and the caller decides which HTTP status a failure
//! maps to. Endpoints compose the subset they need and layer their own
//! format checks on top (see `crate::forms`).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Default ceiling for a serialized payload, in bytes.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 50_000;

/// Longest email address accepted (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

// Deliberately loose: something@something.something with no whitespace.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Validation error types.
///
/// The `Display` text of each variant is safe to return to the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid request body")]
    InvalidBody,

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("{field} {reason}")]
    InvalidField { field: &'static str, reason: &'static str },

    /// A length overflow, carrying the message from [`validate_text_fields`].
    #[error("{0}")]
    FieldTooLong(String),
}

/// Outcome of a multi-field check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// First error message, if any.
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

/// Check that a string looks like an email address.
pub fn validate_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.len() <= MAX_EMAIL_LENGTH && EMAIL_PATTERN.is_match(email)
}

/// Check an optional value against a maximum length.
///
/// Absent and `null` values pass.
pub fn validate_length(value: Option<&Value>, max_length: usize) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(v) => text_length(v) <= max_length,
    }
}

/// Names of required fields that are absent, `null`, or blank strings,
/// in the order they were asked for.
pub fn validate_required(payload: &Map<String, Value>, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .filter(|field| match payload.get(**field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        })
        .map(|field| field.to_string())
        .collect()
}

/// Check that the payload's JSON serialization fits in `max_bytes`.
///
/// A payload that cannot be serialized is treated as too large.
pub fn validate_payload_size<T: Serialize + ?Sized>(payload: &T, max_bytes: usize) -> bool {
    match serde_json::to_vec(payload) {
        Ok(bytes) => bytes.len() <= max_bytes,
        Err(_) => false,
    }
}

/// Check every present field that has a configured limit.
///
/// Errors follow the order of `limits`. Values are never modified.
pub fn validate_text_fields(
    payload: &Map<String, Value>,
    limits: &[(&str, usize)],
) -> ValidationReport {
    let errors: Vec<String> = limits
        .iter()
        .filter(|(field, max)| !validate_length(payload.get(*field), *max))
        .map(|(field, max)| format!("{} exceeds maximum length of {} characters", field, max))
        .collect();

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

/// Text form of a JSON value: strings as-is, everything else as compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn text_length(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        other => other.to_string().chars().count(),
    }
}
