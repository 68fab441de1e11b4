// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for driving the intake router end to end.
//!
//! Provides request builders, an in-memory mail transport and a stand-in
//! for the bot verification service.

#![allow(dead_code)]

pub mod generators;
pub mod mailbox;
pub mod verifier;

use axum::{body::Body, http::Request, Router};
use intake_relay::{config::Config, router, AppState};
use mailbox::RecordingMailer;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Router plus the mailbox it delivers into.
pub struct TestApp {
    pub router: Router,
    pub mailbox: Arc<RecordingMailer>,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub fn new(config: Config) -> Self {
        Self::with_mailer(config, Arc::new(RecordingMailer::new()))
    }

    pub fn with_mailer(config: Config, mailbox: Arc<RecordingMailer>) -> Self {
        let state = Arc::new(AppState::new(config, mailbox.clone()).expect("state builds"));
        Self {
            router: router(state.clone()),
            mailbox,
            state,
        }
    }

    /// Send a request and decode the JSON reply.
    pub async fn send(&self, request: Request<Body>) -> Reply {
        send_to(&self.router, request).await
    }
}

/// Send a request through any router and decode the JSON reply.
pub async fn send_to(router: &Router, request: Request<Body>) -> Reply {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");

    Reply {
        status,
        headers,
        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        text: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

/// Decoded response.
pub struct Reply {
    pub status: axum::http::StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
    pub text: String,
}

impl Reply {
    pub fn success(&self) -> bool {
        self.body["success"].as_bool().expect("success flag present")
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().expect("message present")
    }
}
