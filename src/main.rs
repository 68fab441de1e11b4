// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Intake Relay Service
//!
//! Accepts job applications and insurance inquiries over HTTP and relays
//! them to an operator mailbox.
//!
//! ## Endpoints
//!
//! - `POST /api/apply`: multipart form with a `cv` file part
//! - `POST /api/insurance`: multipart, urlencoded or JSON form
//! - `GET /health`: liveness
//! - `GET /metrics`: Prometheus counters (when enabled)
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables, after an optional
//! `.env` file:
//!
//! - `PORT`: Listening port (default: 3000)
//! - `SMTP_HOST` / `SMTP_PORT` / `SMTP_USER` / `SMTP_PASS`: mail relay
//! - `MAIL_TRANSPORT`: `smtp` (default) or `file`
//! - `MAIL_TO`: operator mailbox
//! - `RECAPTCHA_SECRET`: enables bot verification when set
//! - `RATE_LIMIT_MAX` / `RATE_LIMIT_WINDOW_SECS`: default 5 per 900s

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use intake_relay::{config::Config, handlers::router, AppState, LettreMailer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env();
    info!(
        listen_addr = %config.listen_addr(),
        transport = ?config.mail.transport,
        smtp_host = %config.mail.smtp_host,
        smtp_port = config.mail.smtp_port,
        bot_check = config.bot_check.is_enabled(),
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        "Starting intake relay"
    );

    // Create application state
    let mailer = LettreMailer::from_config(&config.mail)?;
    let addr: SocketAddr = config.listen_addr().parse()?;
    let state = Arc::new(AppState::new(config, Arc::new(mailer))?);

    // Spawn cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_state.limiter.cleanup().await;
        }
    });

    let app = router(state);

    // Start server
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
