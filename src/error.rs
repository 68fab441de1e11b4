// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the intake endpoints

use crate::bot_check::BotCheckError;
use crate::mailer::MailError;
use crate::models::IntakeResponse;
use crate::validator::ValidationError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

/// Which intake form a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Application,
    Inquiry,
}

impl FormKind {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "apply",
            Self::Inquiry => "insurance",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Application => "Application submitted successfully! We will contact you soon.",
            Self::Inquiry => {
                "Inquiry submitted successfully! Our team will contact you within 24 hours."
            }
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::Application => "Failed to send application. Please try again.",
            Self::Inquiry => "Failed to send inquiry. Please try again.",
        }
    }
}

/// Every way an intake request can fail.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Rate limit exceeded, retry in {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("Bot check failed: {0}")]
    BotCheck(#[from] BotCheckError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Malformed form body: {0}")]
    MalformedForm(String),

    #[error("Delivery of {} failed: {source}", .form.as_str())]
    Delivery {
        form: FormKind,
        #[source]
        source: MailError,
    },
}

impl IntakeError {
    /// Message shown to the requester. Never carries internal detail.
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited { .. } => "Too many submissions. Please try again later.".to_string(),
            Self::BotCheck(_) => "Bot verification failed. Please try again.".to_string(),
            Self::Validation(err) => err.to_string(),
            Self::MalformedForm(_) => "Invalid form submission. Please try again.".to_string(),
            Self::Delivery { form, .. } => form.failure_message().to_string(),
        }
    }

    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::BotCheck(_) => "bot_check_failed",
            Self::Validation(err) => err.kind(),
            Self::MalformedForm(_) => "malformed_form",
            Self::Delivery { .. } => "delivery_failed",
        }
    }

    /// Log the failure server-side with full detail.
    pub fn log(&self, form: FormKind) {
        match self {
            Self::Delivery { .. } => {
                error!(form = form.as_str(), error = %self, "Failed to deliver notification");
            }
            _ => {
                info!(form = form.as_str(), outcome = self.kind(), error = %self, "Submission rejected");
            }
        }
    }
}

/// Failures are reported as `{success: false, message}` with HTTP 200 so
/// existing front-ends keep reading the body.
impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let body = Json(IntakeResponse::rejected(self.user_message()));

        match self {
            Self::RateLimited { retry_after } => (
                StatusCode::OK,
                [(header::RETRY_AFTER, retry_after.as_secs().to_string())],
                body,
            )
                .into_response(),
            _ => (StatusCode::OK, body).into_response(),
        }
    }
}

/// Errors raised while wiring the service at startup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Bot verification client: {0}")]
    BotCheck(#[from] reqwest::Error),

    #[error("Metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),
}
