// SPDX-FileCopyrightText: 2026 CWT Studio
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for form submissions.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Counters owned by one service instance.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
    tracked_identifiers: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new(
                "cwt_form_submissions_total",
                "Form submissions by form and outcome",
            ),
            &["form", "outcome"],
        )?;
        let tracked_identifiers = IntGauge::new(
            "cwt_rate_limit_tracked_identifiers",
            "Identifiers currently held by the rate limiter",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(tracked_identifiers.clone()))?;

        Ok(Self {
            registry,
            submissions,
            tracked_identifiers,
        })
    }

    /// Count one submission outcome.
    pub fn record(&self, form: &str, outcome: &str) {
        self.submissions.with_label_values(&[form, outcome]).inc();
    }

    pub fn set_tracked_identifiers(&self, count: usize) {
        self.tracked_identifiers.set(count as i64);
    }

    pub fn submissions(&self, form: &str, outcome: &str) -> u64 {
        self.submissions.with_label_values(&[form, outcome]).get()
    }

    /// Render every metric in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
