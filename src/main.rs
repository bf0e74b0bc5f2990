// SPDX-FileCopyrightText: 2026 CWT Studio
// SPDX-License-Identifier: PMPL-1.0-or-later

//! CWT Studio form relay service
//!
//! Serves `POST /api/contact`, `/api/consultation` and `/api/assessment`.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (and `.env` when
//! present):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_MAX_REQUESTS`: Requests per window per client (default: 10)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length (default: 60)
//! - `RESEND_API_KEY`: Email provider key; form endpoints return 500 without it
//! - `EMAIL_FROM` / `EMAIL_TO`: Notification sender and recipient

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cwt_forms::{
    config::Config,
    handlers::{router, AppState},
    limiter::RateLimiter,
    mailer::ResendMailer,
    metrics::Metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        email_to = %config.email.to,
        "Starting form relay"
    );
    if config.email.api_key.is_none() {
        warn!("RESEND_API_KEY is not set; form submissions will fail with 500");
    }

    let mailer = ResendMailer::new(&config.email).context("building email client")?;
    let state = Arc::new(AppState {
        limiter: RateLimiter::new(config.rate_limit.clone()),
        mailer: Arc::new(mailer),
        metrics: Metrics::new().context("registering metrics")?,
        config: config.clone(),
    });

    // Expired windows are also swept inline once the table passes its
    // threshold; this keeps a quiet instance from holding stale entries.
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(
            cleanup_state.config.rate_limit.window_secs.max(1),
        ));
        loop {
            interval.tick().await;
            let evicted = cleanup_state.limiter.cleanup().await;
            cleanup_state
                .metrics
                .set_tracked_identifiers(cleanup_state.limiter.tracked().await);
            if evicted > 0 {
                info!(evicted, "Evicted expired rate limit windows");
            }
        }
    });

    let app = router(state);

    let addr: SocketAddr = config.bind_addr.parse().context("parsing BIND_ADDR")?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
