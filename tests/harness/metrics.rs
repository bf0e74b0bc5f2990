// SPDX-FileCopyrightText: 2026 CWT Studio
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome tallies for flood simulation results.

#![allow(dead_code)]

use axum::http::StatusCode;
use std::collections::HashMap;
use std::time::Duration;

/// Collects outcomes during a simulated flood.
#[derive(Debug, Default)]
pub struct FloodMetrics {
    /// Count of responses by status
    outcomes: HashMap<StatusCode, usize>,
    /// Count of requests by client IP
    requests_per_ip: HashMap<String, usize>,
    /// Latency samples (microseconds)
    latencies: Vec<u64>,
}

impl FloodMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a response.
    pub fn record(&mut self, status: StatusCode, ip: &str, latency: Duration) {
        *self.outcomes.entry(status).or_insert(0) += 1;
        *self.requests_per_ip.entry(ip.to_string()).or_insert(0) += 1;
        self.latencies.push(latency.as_micros() as u64);
    }

    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, status: StatusCode) -> usize {
        self.outcomes.get(&status).copied().unwrap_or(0)
    }

    pub fn unique_ips(&self) -> usize {
        self.requests_per_ip.len()
    }

    /// Ratio of non-200 responses to total.
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        (total - self.count(StatusCode::OK)) as f64 / total as f64
    }

    pub fn median_latency_us(&self) -> u64 {
        if self.latencies.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();
        sorted[sorted.len() / 2]
    }
}

impl std::fmt::Display for FloodMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Flood Report ===")?;
        writeln!(f, "Total Requests:    {}", self.total_requests())?;
        writeln!(f, "Unique IPs:        {}", self.unique_ips())?;
        let mut statuses: Vec<_> = self.outcomes.iter().collect();
        statuses.sort_by_key(|(status, _)| status.as_u16());
        for (status, count) in statuses {
            writeln!(f, "{:<18} {}", status.as_u16(), count)?;
        }
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate() * 100.0)?;
        writeln!(f, "Median latency:    {} us", self.median_latency_us())?;
        Ok(())
    }
}
