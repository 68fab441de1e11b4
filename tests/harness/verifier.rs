// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Stand-in for the bot verification service.
//!
//! Tokens map to fixed verdicts:
//! - `human`: success with score 0.9
//! - `borderline`: success with score 0.5
//! - `bot`: success with score 0.1
//! - anything else: `success: false`

use axum::{extract::State, routing::post, Form, Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;

pub const SECRET: &str = "test-secret";

/// Running fake verification server.
pub struct FakeVerifier {
    pub addr: SocketAddr,
    calls: Arc<AtomicUsize>,
}

impl FakeVerifier {
    pub async fn start() -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/siteverify", post(siteverify))
            .with_state(calls.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, calls }
    }

    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/siteverify", self.addr)).unwrap()
    }

    /// Number of verification requests received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn siteverify(
    State(calls): State<Arc<AtomicUsize>>,
    Form(params): Form<HashMap<String, String>>,
) -> Json<Value> {
    calls.fetch_add(1, Ordering::SeqCst);

    if params.get("secret").map(String::as_str) != Some(SECRET) {
        return Json(json!({ "success": false, "error-codes": ["invalid-input-secret"] }));
    }

    let reply = match params.get("response").map(String::as_str) {
        Some("human") => json!({ "success": true, "score": 0.9, "action": "submit" }),
        Some("borderline") => json!({ "success": true, "score": 0.5, "action": "submit" }),
        Some("bot") => json!({ "success": true, "score": 0.1, "action": "submit" }),
        _ => json!({ "success": false, "error-codes": ["invalid-input-response"] }),
    };
    Json(reply)
}
