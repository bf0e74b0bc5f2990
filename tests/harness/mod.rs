// SPDX-FileCopyrightText: 2026 CWT Studio
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for flood simulation against the form endpoints.

pub mod generators;
pub mod metrics;
