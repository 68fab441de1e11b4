// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Mail dispatch for composed notifications.
//!
//! Every notification goes to the fixed operator mailbox with the requester
//! as Reply-To. Delivery is a single awaited send; failures are returned to
//! the caller, which logs them and answers with a generic message.

use crate::composer::Notification;
use crate::config::{MailConfig, TransportKind};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Mail dispatch errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid mailbox {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("Invalid attachment content type {0:?}")]
    InvalidContentType(String),

    #[error("Failed to render notification: {0}")]
    Render(#[from] askama::Error),

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("File delivery failed: {0}")]
    File(#[from] lettre::transport::file::Error),

    #[error("Failed to prepare outbox directory: {0}")]
    Outbox(#[from] std::io::Error),

    #[error("Mail transport unavailable: {0}")]
    Unavailable(String),
}

/// Delivers composed notifications.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), MailError>;
}

enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

/// lettre-backed transport that sends to the operator mailbox.
pub struct LettreMailer {
    transport: Transport,
    from: Mailbox,
    to: Mailbox,
}

impl LettreMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let transport = match config.transport {
            TransportKind::Smtp => {
                if !config.smtp_tls {
                    warn!("SMTP TLS is disabled - credentials are sent in clear text");
                }

                let builder = if config.smtp_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                };

                Transport::Smtp(
                    builder
                        .port(config.smtp_port)
                        .credentials(Credentials::new(
                            config.smtp_user.clone(),
                            config.smtp_pass.clone(),
                        ))
                        .build(),
                )
            }
            TransportKind::File => {
                let dir = Path::new(&config.file_dir);
                std::fs::create_dir_all(dir)?;
                Transport::File(AsyncFileTransport::<Tokio1Executor>::new(dir))
            }
        };

        Ok(Self {
            transport,
            from: parse_mailbox(&config.from)?,
            to: parse_mailbox(&config.to)?,
        })
    }

    /// Build the MIME message for a notification.
    pub fn build_message(&self, notification: &Notification) -> Result<Message, MailError> {
        let builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .reply_to(parse_mailbox(&notification.reply_to)?)
            .subject(notification.subject.as_str());

        let body = SinglePart::html(notification.html.clone());

        let message = match &notification.attachment {
            Some(file) => {
                let content_type = ContentType::parse(&file.media_type())
                    .map_err(|_| MailError::InvalidContentType(file.content_type.clone()))?;
                let attachment =
                    Attachment::new(file.file_name.clone()).body(file.bytes.to_vec(), content_type);
                builder.multipart(MultiPart::mixed().singlepart(body).singlepart(attachment))?
            }
            None => builder.singlepart(body)?,
        };

        Ok(message)
    }
}

#[async_trait]
impl MailTransport for LettreMailer {
    async fn deliver(&self, notification: &Notification) -> Result<(), MailError> {
        let message = self.build_message(notification)?;

        match &self.transport {
            Transport::Smtp(smtp) => {
                let response = smtp.send(message).await?;
                debug!(code = %response.code(), "SMTP relay accepted notification");
            }
            Transport::File(file) => {
                let id = file.send(message).await?;
                debug!(%id, "Notification written to outbox");
            }
        }

        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse::<Mailbox>()
        .map_err(|source| MailError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}
