// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Intake Relay
//!
//! HTTP intake endpoints for job applications and insurance inquiries.
//! Each submission is validated and relayed to an operator mailbox as an
//! HTML notification:
//!
//! - Per-IP fixed-window rate limiting (5 requests / 15 minutes default)
//! - Optional reCAPTCHA-style bot verification (fail-closed)
//! - Required field, email format and attachment validation
//! - HTML notification rendering with the CV attached
//! - SMTP or file-based delivery

pub mod bot_check;
pub mod composer;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod models;
pub mod validator;

pub use config::Config;
pub use error::{FormKind, IntakeError};
pub use handlers::{router, AppState};
pub use limiter::{RateLimitResult, RateLimiter};
pub use mailer::{LettreMailer, MailError, MailTransport};
pub use validator::{FormValidator, ValidationError};
