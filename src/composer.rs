// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Renders validated submissions into operator notifications.

use crate::models::{InsuranceInquiry, JobApplication, UploadedFile};
use askama::Template;
use chrono::{DateTime, Utc};

const NOT_PROVIDED: &str = "Not provided";
const NOT_SPECIFIED: &str = "Not specified";

/// A composed notification, ready for a mail transport.
#[derive(Debug, Clone)]
pub struct Notification {
    pub subject: String,
    pub html: String,
    /// Requester's address, used as Reply-To
    pub reply_to: String,
    pub attachment: Option<UploadedFile>,
}

#[derive(Template)]
#[template(path = "application.html")]
struct ApplicationTemplate<'a> {
    full_name: &'a str,
    email: &'a str,
    phone: &'a str,
    education: &'a str,
    experience: &'a str,
    motivation: &'a str,
    cv_name: &'a str,
    site_name: &'a str,
    submitted_at: String,
}

#[derive(Template)]
#[template(path = "inquiry.html")]
struct InquiryTemplate<'a> {
    full_name: &'a str,
    email: &'a str,
    phone: &'a str,
    insurance_type: &'a str,
    selected_plan: &'a str,
    number_of_people: &'a str,
    motivation: &'a str,
    site_name: &'a str,
    submitted_at: String,
}

/// Builds notifications from validated forms. Values are HTML-escaped by the
/// templates.
#[derive(Debug, Clone)]
pub struct NotificationComposer {
    site_name: String,
}

impl NotificationComposer {
    pub fn new(site_name: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
        }
    }

    pub fn compose_application(
        &self,
        application: &JobApplication,
        submitted_at: DateTime<Utc>,
    ) -> Result<Notification, askama::Error> {
        let html = ApplicationTemplate {
            full_name: &application.full_name,
            email: &application.email,
            phone: &application.phone,
            education: &application.education,
            experience: &application.experience,
            motivation: application.motivation.as_deref().unwrap_or(NOT_PROVIDED),
            cv_name: &application.cv.file_name,
            site_name: &self.site_name,
            submitted_at: timestamp(submitted_at),
        }
        .render()?;

        Ok(Notification {
            subject: format!("New Job Application - Sales Agent: {}", application.full_name),
            html,
            reply_to: application.email.clone(),
            attachment: Some(application.cv.clone()),
        })
    }

    pub fn compose_inquiry(
        &self,
        inquiry: &InsuranceInquiry,
        submitted_at: DateTime<Utc>,
    ) -> Result<Notification, askama::Error> {
        let selected_plan = inquiry.selected_plan();
        let html = InquiryTemplate {
            full_name: &inquiry.full_name,
            email: &inquiry.email,
            phone: &inquiry.phone,
            insurance_type: inquiry.insurance_type.as_str(),
            selected_plan: &selected_plan,
            number_of_people: inquiry.number_of_people.as_deref().unwrap_or(NOT_SPECIFIED),
            motivation: inquiry.motivation.as_deref().unwrap_or(NOT_PROVIDED),
            site_name: &self.site_name,
            submitted_at: timestamp(submitted_at),
        }
        .render()?;

        Ok(Notification {
            subject: format!(
                "New Insurance Inquiry: {} - {}",
                inquiry.full_name, inquiry.insurance_type
            ),
            html,
            reply_to: inquiry.email.clone(),
            attachment: None,
        })
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}
