// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! In-memory mail transport.

use async_trait::async_trait;
use intake_relay::composer::Notification;
use intake_relay::{MailError, MailTransport};
use std::sync::Mutex;

/// Records delivered notifications, or fails every delivery.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every delivery fails.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn deliver(&self, notification: &Notification) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Unavailable(
                "535 5.7.8 Username and Password not accepted".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
