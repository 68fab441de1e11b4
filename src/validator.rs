// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Intake form validator.
//!
//! Implements the checks applied to every submission before anything is
//! composed or sent:
//! - Required field presence
//! - Email address format
//! - Attachment presence, MIME type and size (job applications)
//! - Insurance type (inquiries)

use crate::config::ValidationConfig;
use crate::models::{InsuranceInquiry, InsuranceType, JobApplication, SubmittedForm, UploadedFile};
use lettre::Address;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Validation error types. The display text is what the requester sees.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill all required fields")]
    MissingFields { missing: Vec<&'static str> },

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Please upload your CV")]
    MissingAttachment,

    #[error("Invalid file type. Only PDF, JPG, PNG allowed")]
    InvalidFileType { content_type: String },

    #[error("File too large. Maximum {limit_mib}MB allowed")]
    FileTooLarge { limit_mib: usize },

    #[error("Please select a valid insurance type")]
    InvalidInsuranceType { value: String },
}

impl ValidationError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFields { .. } => "missing_fields",
            Self::InvalidEmail => "invalid_email",
            Self::MissingAttachment => "missing_attachment",
            Self::InvalidFileType { .. } => "invalid_file_type",
            Self::FileTooLarge { .. } => "file_too_large",
            Self::InvalidInsuranceType { .. } => "invalid_insurance_type",
        }
    }
}

const APPLICATION_REQUIRED: &[&str] = &["fullName", "email", "phone", "education", "experience"];
const INQUIRY_REQUIRED: &[&str] = &["fullName", "email", "phone", "insuranceType"];

// Local part without whitespace or delimiters, dotted domain of LDH labels.
const EMAIL_PATTERN: &str = r#"^[^\s@<>()\[\],;:"]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$"#;

// RFC 5321 path limit
const MAX_EMAIL_LEN: usize = 254;

/// Intake form validator.
pub struct FormValidator {
    config: ValidationConfig,
    email_pattern: Regex,
}

impl FormValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            email_pattern: Regex::new(EMAIL_PATTERN).expect("email pattern compiles"),
        }
    }

    /// Largest accepted attachment in bytes.
    pub fn max_file_bytes(&self) -> usize {
        self.config.max_file_bytes
    }

    /// Check that every named field has a non-blank value.
    pub fn validate_required(
        &self,
        form: &SubmittedForm,
        required: &[&'static str],
    ) -> Result<(), ValidationError> {
        let missing: Vec<&'static str> = required
            .iter()
            .copied()
            .filter(|name| form.get(name).is_none())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            debug!(?missing, "Required fields missing");
            Err(ValidationError::MissingFields { missing })
        }
    }

    /// Check an email address against the standard address pattern.
    ///
    /// The address must also parse as a mail address, since it becomes the
    /// Reply-To of the notification.
    pub fn validate_email(&self, email: &str) -> Result<(), ValidationError> {
        if email.len() <= MAX_EMAIL_LEN
            && self.email_pattern.is_match(email)
            && email.parse::<Address>().is_ok()
        {
            Ok(())
        } else {
            debug!(%email, "Email address rejected");
            Err(ValidationError::InvalidEmail)
        }
    }

    /// Check presence, MIME type and size of an uploaded attachment.
    pub fn validate_attachment(&self, file: Option<&UploadedFile>) -> Result<(), ValidationError> {
        let file = match file {
            Some(f) if !f.is_empty() => f,
            _ => return Err(ValidationError::MissingAttachment),
        };

        let media_type = file.media_type();

        if !self
            .config
            .allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&media_type))
        {
            debug!(content_type = %file.content_type, "Attachment type rejected");
            return Err(ValidationError::InvalidFileType {
                content_type: file.content_type.clone(),
            });
        }

        if file.len() > self.config.max_file_bytes {
            debug!(size = file.len(), limit = self.config.max_file_bytes, "Attachment too large");
            return Err(self.too_large());
        }

        Ok(())
    }

    /// Error for an attachment over the ceiling.
    pub fn too_large(&self) -> ValidationError {
        ValidationError::FileTooLarge {
            limit_mib: self.config.max_file_bytes / (1024 * 1024),
        }
    }

    /// Validate a complete job application.
    pub fn validate_application(&self, form: &SubmittedForm) -> Result<JobApplication, ValidationError> {
        self.validate_required(form, APPLICATION_REQUIRED)?;

        let email = required(form, "email");
        self.validate_email(&email)?;

        self.validate_attachment(form.file.as_ref())?;
        let cv = form
            .file
            .as_ref()
            .map(UploadedFile::normalized)
            .ok_or(ValidationError::MissingAttachment)?;

        Ok(JobApplication {
            full_name: required(form, "fullName"),
            email,
            phone: required(form, "phone"),
            education: required(form, "education"),
            experience: required(form, "experience"),
            motivation: form.get_owned("motivation"),
            cv,
        })
    }

    /// Validate a complete insurance inquiry.
    pub fn validate_inquiry(&self, form: &SubmittedForm) -> Result<InsuranceInquiry, ValidationError> {
        self.validate_required(form, INQUIRY_REQUIRED)?;

        let email = required(form, "email");
        self.validate_email(&email)?;

        let raw_type = required(form, "insuranceType");
        let insurance_type: InsuranceType = raw_type.parse().map_err(|_| {
            debug!(insurance_type = %raw_type, "Unknown insurance type");
            ValidationError::InvalidInsuranceType { value: raw_type.clone() }
        })?;

        let age_category = match insurance_type {
            InsuranceType::Personal => form.get_owned("ageCategory"),
            _ => None,
        };

        Ok(InsuranceInquiry {
            full_name: required(form, "fullName"),
            email,
            phone: required(form, "phone"),
            plan: form.get_owned(insurance_type.plan_field()),
            insurance_type,
            age_category,
            number_of_people: form.get_owned("numberOfPeople"),
            motivation: form.get_owned("motivation"),
        })
    }
}

/// Value of a field already checked by `validate_required`.
fn required(form: &SubmittedForm, name: &str) -> String {
    form.get_owned(name).unwrap_or_default()
}
