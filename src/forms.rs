// SPDX-FileCopyrightText: 2026 CWT Studio
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Form definitions for the site's submission endpoints.
//!
//! A form is data: which fields are required, how long each may be, any
//! extra format rule, and how a submission reads in the notification email.
//! The shared checks live in [`crate::validator`]; form-specific rules such
//! as "servicesInterested must be a non-empty array" are layered on here.

use crate::config::EmailConfig;
use crate::mailer::EmailMessage;
use crate::validator::{
    stringify, validate_email, validate_payload_size, validate_required, validate_text_fields,
    ValidationError,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// A JSON object payload.
pub type Payload = Map<String, Value>;

/// Static description of one submission endpoint.
pub struct FormDefinition {
    /// Endpoint name, also the rate limit scope (`/api/<name>`)
    pub name: &'static str,
    /// Human name used in the email subject
    pub title: &'static str,
    /// Fields that must be present and non-blank
    pub required: &'static [&'static str],
    /// Maximum lengths, checked in this order
    pub limits: &'static [(&'static str, usize)],
    /// Form-specific format rule run after the email check
    pub extra_check: Option<fn(&Payload) -> Result<(), ValidationError>>,
    /// Fields listed in the email body, as (key, label)
    pub summary: &'static [(&'static str, &'static str)],
}

pub static CONTACT: FormDefinition = FormDefinition {
    name: "contact",
    title: "contact enquiry",
    required: &["name", "email", "message"],
    limits: &[
        ("name", 100),
        ("email", 254),
        ("company", 200),
        ("phone", 50),
        ("message", 5000),
    ],
    extra_check: None,
    summary: &[
        ("name", "Name"),
        ("email", "Email"),
        ("company", "Company"),
        ("phone", "Phone"),
        ("message", "Message"),
    ],
};

pub static CONSULTATION: FormDefinition = FormDefinition {
    name: "consultation",
    title: "consultation request",
    required: &["name", "email", "servicesInterested"],
    limits: &[
        ("name", 100),
        ("email", 254),
        ("company", 200),
        ("phone", 50),
        ("budget", 100),
        ("timeline", 100),
        ("message", 5000),
    ],
    extra_check: Some(check_services),
    summary: &[
        ("name", "Name"),
        ("email", "Email"),
        ("company", "Company"),
        ("phone", "Phone"),
        ("servicesInterested", "Services"),
        ("budget", "Budget"),
        ("timeline", "Timeline"),
        ("message", "Message"),
    ],
};

pub static ASSESSMENT: FormDefinition = FormDefinition {
    name: "assessment",
    title: "assessment result",
    required: &["name", "email", "assessmentType", "score"],
    limits: &[
        ("name", 100),
        ("email", 254),
        ("company", 200),
        ("assessmentType", 100),
    ],
    extra_check: Some(check_score),
    summary: &[
        ("name", "Name"),
        ("email", "Email"),
        ("company", "Company"),
        ("assessmentType", "Assessment"),
        ("score", "Score"),
        ("categoryScores", "Category scores"),
    ],
};

/// Every form served by the relay.
pub static FORMS: [&FormDefinition; 3] = [&CONTACT, &CONSULTATION, &ASSESSMENT];

impl FormDefinition {
    /// Run the full check sequence, stopping at the first failure:
    /// payload size, required fields, email format, form rule, lengths.
    pub fn validate(&self, payload: &Payload, max_payload_bytes: usize) -> Result<(), ValidationError> {
        if !validate_payload_size(payload, max_payload_bytes) {
            return Err(ValidationError::PayloadTooLarge);
        }

        let missing = validate_required(payload, self.required);
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        match payload.get("email") {
            Some(Value::String(email)) if validate_email(email) => {}
            _ => return Err(ValidationError::InvalidEmail),
        }

        if let Some(check) = self.extra_check {
            check(payload)?;
        }

        let report = validate_text_fields(payload, self.limits);
        match report.first_error() {
            Some(message) => Err(ValidationError::FieldTooLong(message.to_string())),
            None => Ok(()),
        }
    }

    /// Build the notification email for a validated submission.
    pub fn compose(
        &self,
        payload: &Payload,
        email: &EmailConfig,
        submitted_at: DateTime<Utc>,
    ) -> EmailMessage {
        let name = payload
            .get("name")
            .map(stringify)
            .unwrap_or_default()
            .trim()
            .to_string();

        let mut text = format!("New {} via cwtstudio.com\n\n", self.title);
        for (key, label) in self.summary {
            if let Some(value) = payload.get(*key).filter(|v| !v.is_null()) {
                text.push_str(&format!("{}: {}\n", label, display_value(value)));
            }
        }
        text.push_str(&format!("\nSubmitted at: {}\n", submitted_at.to_rfc3339()));

        EmailMessage {
            from: email.from.clone(),
            to: vec![email.to.clone()],
            subject: format!("New {} from {}", self.title, name),
            text,
            reply_to: payload
                .get("email")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string()),
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(", "),
        other => stringify(other),
    }
}

fn check_services(payload: &Payload) -> Result<(), ValidationError> {
    let invalid = ValidationError::InvalidField {
        field: "servicesInterested",
        reason: "must be a non-empty list of services",
    };

    match payload.get("servicesInterested") {
        Some(Value::Array(items))
            if !items.is_empty()
                && items
                    .iter()
                    .all(|item| item.as_str().is_some_and(|s| !s.trim().is_empty())) =>
        {
            Ok(())
        }
        _ => Err(invalid),
    }
}

fn check_score(payload: &Payload) -> Result<(), ValidationError> {
    match payload.get("score").and_then(Value::as_f64) {
        Some(score) if (0.0..=100.0).contains(&score) => Ok(()),
        _ => Err(ValidationError::InvalidField {
            field: "score",
            reason: "must be a number between 0 and 100",
        }),
    }
}
