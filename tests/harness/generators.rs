// SPDX-FileCopyrightText: 2026 CWT Studio
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for flood simulation.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of IP addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// A well-formed contact submission.
pub fn valid_contact(i: usize) -> Value {
    json!({
        "name": format!("Visitor {}", i),
        "email": format!("visitor{}@example.com", i),
        "message": "Interested in a discovery call."
    })
}

/// Bodies that must never reach the email provider.
pub fn junk_bodies() -> Vec<String> {
    vec![
        String::new(),
        "{}".to_string(),
        "[]".to_string(),
        "null".to_string(),
        "\"just a string\"".to_string(),
        "{\"name\": ".to_string(),
        json!({"name": "x", "email": "not-an-email", "message": "hi"}).to_string(),
        json!({"name": "x", "email": "a@b.co", "message": "m".repeat(6000)}).to_string(),
        json!({"name": "x", "email": "a@b.co", "message": "y".repeat(60_000)}).to_string(),
        json!({"name": null, "email": "a@b.co", "message": "hi"}).to_string(),
        json!({"name": "   ", "email": "a@b.co", "message": "hi"}).to_string(),
        json!({"name": ["x"], "email": ["a@b.co"], "message": "hi"}).to_string(),
        json!({"name": "x", "email": format!("{}@b.co", "a".repeat(260)), "message": "hi"})
            .to_string(),
    ]
}
