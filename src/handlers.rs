// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the intake relay.
//!
//! Every intake request runs the same pipeline: rate limit, parse the form,
//! bot check, validate, compose, send. The first failure ends the request.

use crate::bot_check::BotVerifier;
use crate::composer::NotificationComposer;
use crate::config::Config;
use crate::error::{FormKind, IntakeError, SetupError};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::mailer::MailTransport;
use crate::metrics::IntakeMetrics;
use crate::models::{IntakeResponse, SubmittedForm, UploadedFile};
use crate::validator::FormValidator;
use axum::{
    extract::{
        multipart::MultipartError, ConnectInfo, DefaultBodyLimit, FromRequest, Multipart, Request,
        State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

/// Room for the text fields of a multipart body on top of the file ceiling.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub validator: FormValidator,
    pub bot_verifier: Option<BotVerifier>,
    pub composer: NotificationComposer,
    pub mailer: Arc<dyn MailTransport>,
    pub metrics: IntakeMetrics,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, mailer: Arc<dyn MailTransport>) -> Result<Self, SetupError> {
        Ok(Self {
            limiter: RateLimiter::new(config.rate_limit.clone()),
            validator: FormValidator::new(config.validation.clone()),
            bot_verifier: BotVerifier::from_config(&config.bot_check)?,
            composer: NotificationComposer::new(config.mail.site_name.clone()),
            mailer,
            metrics: IntakeMetrics::new()?,
            config,
        })
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = body_limit(state.validator.max_file_bytes());

    let mut router = Router::new()
        .route("/api/apply", post(apply).fallback(invalid_method))
        .route("/api/insurance", post(insurance).fallback(invalid_method))
        .route("/health", get(health))
        .route("/healthz", get(health));

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(metrics));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Request body ceiling for a given attachment ceiling.
fn body_limit(max_file_bytes: usize) -> usize {
    max_file_bytes.saturating_add(FORM_OVERHEAD_BYTES)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "intake-relay",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Reply for non-POST requests on the intake routes.
pub async fn invalid_method() -> Json<IntakeResponse> {
    Json(IntakeResponse::rejected("Invalid request method"))
}

/// Job application endpoint: multipart form with a `cv` file part.
pub async fn apply(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
) -> Response {
    submit(&state, FormKind::Application, peer, request).await
}

/// Insurance inquiry endpoint: multipart, urlencoded or JSON form.
pub async fn insurance(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
) -> Response {
    submit(&state, FormKind::Inquiry, peer, request).await
}

async fn submit(state: &AppState, kind: FormKind, peer: SocketAddr, request: Request) -> Response {
    let ip = client_ip(
        request.headers(),
        peer,
        state.config.rate_limit.trust_forwarded_for,
    );

    match process(state, kind, ip, request).await {
        Ok(()) => {
            info!(form = kind.as_str(), %ip, "Submission relayed");
            state.metrics.record(kind.as_str(), "sent");
            Json(IntakeResponse::accepted(kind.success_message())).into_response()
        }
        Err(err) => {
            err.log(kind);
            state.metrics.record(kind.as_str(), err.kind());
            err.into_response()
        }
    }
}

async fn process(
    state: &AppState,
    kind: FormKind,
    ip: IpAddr,
    request: Request,
) -> Result<(), IntakeError> {
    if let RateLimitResult::Limited { retry_after } = state.limiter.check(ip).await {
        return Err(IntakeError::RateLimited { retry_after });
    }

    let form = read_form(request, kind, &state.validator).await?;

    if let Some(verifier) = &state.bot_verifier {
        verifier.verify(form.bot_token(), ip).await?;
    }

    let submitted_at = Utc::now();
    let notification = match kind {
        FormKind::Application => {
            let application = state.validator.validate_application(&form)?;
            state.composer.compose_application(&application, submitted_at)
        }
        FormKind::Inquiry => {
            let inquiry = state.validator.validate_inquiry(&form)?;
            state.composer.compose_inquiry(&inquiry, submitted_at)
        }
    }
    .map_err(|e| IntakeError::Delivery {
        form: kind,
        source: e.into(),
    })?;

    state
        .mailer
        .deliver(&notification)
        .await
        .map_err(|source| IntakeError::Delivery { form: kind, source })
}

/// Address used for rate limiting and bot verification.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, trust_forwarded_for: bool) -> IpAddr {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse().ok());
        if let Some(ip) = forwarded {
            return ip;
        }
    }
    peer.ip()
}

/// Parse the request body into a submitted form.
async fn read_form(
    request: Request,
    kind: FormKind,
    validator: &FormValidator,
) -> Result<SubmittedForm, IntakeError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_lowercase())
        .unwrap_or_default();

    debug!(form = kind.as_str(), %content_type, "Reading form body");

    match content_type.as_str() {
        "multipart/form-data" => {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| IntakeError::MalformedForm(e.body_text()))?;
            read_multipart(multipart, kind, validator).await
        }
        "application/x-www-form-urlencoded" => {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, &())
                .await
                .map_err(|e| IntakeError::MalformedForm(e.body_text()))?;
            let mut form = SubmittedForm::new();
            for (name, value) in pairs {
                form.insert(name, &value);
            }
            Ok(form)
        }
        "application/json" => {
            let Json(values) =
                Json::<HashMap<String, serde_json::Value>>::from_request(request, &())
                    .await
                    .map_err(|e| IntakeError::MalformedForm(e.body_text()))?;
            let mut form = SubmittedForm::new();
            for (name, value) in values {
                match value {
                    serde_json::Value::String(s) => form.insert(name, &s),
                    serde_json::Value::Number(n) => form.insert(name, &n.to_string()),
                    serde_json::Value::Bool(b) => form.insert(name, &b.to_string()),
                    _ => {}
                }
            }
            Ok(form)
        }
        other => Err(IntakeError::MalformedForm(format!(
            "unsupported content type {other:?}"
        ))),
    }
}

async fn read_multipart(
    mut multipart: Multipart,
    kind: FormKind,
    validator: &FormValidator,
) -> Result<SubmittedForm, IntakeError> {
    let body_error = |e: MultipartError| {
        if kind == FormKind::Application && e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            IntakeError::Validation(validator.too_large())
        } else {
            IntakeError::MalformedForm(e.body_text())
        }
    };

    let mut form = SubmittedForm::new();

    while let Some(field) = multipart.next_field().await.map_err(body_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(body_error)?;

                if name == "cv" && kind == FormKind::Application {
                    form.file = Some(UploadedFile {
                        file_name,
                        content_type,
                        bytes,
                    });
                } else {
                    debug!(field = %name, "Ignoring unexpected file part");
                }
            }
            None => {
                let value = field.text().await.map_err(body_error)?;
                form.insert(name, &value);
            }
        }
    }

    Ok(form)
}
