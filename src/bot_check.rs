// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Bot verification gate.
//!
//! Forwards the client's token to a reCAPTCHA-compatible `siteverify`
//! endpoint. Only a successful reply with a score above the threshold
//! passes; any transport or decoding failure rejects the request.

use crate::config::BotCheckConfig;
use serde::Deserialize;
use std::net::IpAddr;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Reasons a submission fails the bot check.
#[derive(Debug, Error)]
pub enum BotCheckError {
    #[error("Verification token missing")]
    MissingToken,

    #[error("Verification service rejected token: {codes:?}")]
    Rejected { codes: Vec<String> },

    #[error("Score {score:?} not above threshold {threshold}")]
    LowScore { score: Option<f64>, threshold: f64 },

    #[error("Verification service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Reply body of the verification service.
#[derive(Debug, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

/// Client for the verification service.
pub struct BotVerifier {
    client: reqwest::Client,
    secret: String,
    verify_url: Url,
    min_score: f64,
}

impl BotVerifier {
    /// Build a verifier, or `None` when no secret is configured.
    pub fn from_config(config: &BotCheckConfig) -> Result<Option<Self>, reqwest::Error> {
        let Some(secret) = config.secret.clone() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;

        Ok(Some(Self {
            client,
            secret,
            verify_url: config.verify_url.clone(),
            min_score: config.min_score,
        }))
    }

    /// Verify a client token. Fails closed.
    pub async fn verify(&self, token: Option<&str>, remote_ip: IpAddr) -> Result<(), BotCheckError> {
        let token = match token {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(BotCheckError::MissingToken),
        };

        let remote_ip = remote_ip.to_string();
        let params = [
            ("secret", self.secret.as_str()),
            ("response", token),
            ("remoteip", remote_ip.as_str()),
        ];

        let reply: VerifyResponse = self
            .client
            .post(self.verify_url.clone())
            .form(&params)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                warn!(error = %e, "Bot verification request failed");
                e
            })?
            .json()
            .await?;

        self.judge(reply)
    }

    fn judge(&self, reply: VerifyResponse) -> Result<(), BotCheckError> {
        if !reply.success {
            return Err(BotCheckError::Rejected {
                codes: reply.error_codes,
            });
        }

        match reply.score {
            Some(score) if score > self.min_score => {
                debug!(score, action = ?reply.action, "Bot verification passed");
                Ok(())
            }
            score => Err(BotCheckError::LowScore {
                score,
                threshold: self.min_score,
            }),
        }
    }
}
