// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request-scoped records for the two intake forms.
//!
//! Nothing here outlives a single request.

use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A file part received with a form submission.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Declared media type without parameters, lowercased.
    pub fn media_type(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }

    /// Copy of the file carrying only its bare media type.
    pub fn normalized(&self) -> Self {
        Self {
            content_type: self.media_type(),
            ..self.clone()
        }
    }
}

/// Raw form submission: text fields plus at most one file part.
#[derive(Debug, Clone, Default)]
pub struct SubmittedForm {
    fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl SubmittedForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a text field. Values are stored trimmed.
    pub fn insert(&mut self, name: impl Into<String>, value: &str) {
        self.fields.insert(name.into(), value.trim().to_string());
    }

    /// Builder-style variant of [`SubmittedForm::insert`].
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_file(mut self, file: UploadedFile) -> Self {
        self.file = Some(file);
        self
    }

    /// Non-empty value of a field, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Owned copy of a non-empty field value.
    pub fn get_owned(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    /// Client-supplied bot verification token.
    pub fn bot_token(&self) -> Option<&str> {
        self.get("recaptchaToken")
            .or_else(|| self.get("g-recaptcha-response"))
    }
}

/// Job application for the sales agent role.
#[derive(Debug, Clone)]
pub struct JobApplication {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub education: String,
    pub experience: String,
    pub motivation: Option<String>,
    pub cv: UploadedFile,
}

/// Insurance product line selected on the inquiry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsuranceType {
    Corporate,
    Sme,
    Personal,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown insurance type: {0}")]
pub struct UnknownInsuranceType(pub String);

impl InsuranceType {
    /// Name as submitted by the form and shown in notifications.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Corporate => "Corporate",
            Self::Sme => "SME",
            Self::Personal => "Personal",
        }
    }

    /// Form field holding the plan selector for this type.
    pub fn plan_field(&self) -> &'static str {
        match self {
            Self::Corporate => "corporatePlan",
            Self::Sme => "smePlan",
            Self::Personal => "personalPlan",
        }
    }
}

impl fmt::Display for InsuranceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsuranceType {
    type Err = UnknownInsuranceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Corporate" => Ok(Self::Corporate),
            "SME" => Ok(Self::Sme),
            "Personal" => Ok(Self::Personal),
            other => Err(UnknownInsuranceType(other.to_string())),
        }
    }
}

/// Insurance inquiry.
#[derive(Debug, Clone)]
pub struct InsuranceInquiry {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub insurance_type: InsuranceType,
    pub plan: Option<String>,
    pub age_category: Option<String>,
    pub number_of_people: Option<String>,
    pub motivation: Option<String>,
}

impl InsuranceInquiry {
    /// Plan description shown to the operator.
    ///
    /// Personal plans carry the age category as a suffix, e.g.
    /// `"Gold - Age: 26-35"`.
    pub fn selected_plan(&self) -> String {
        let Some(plan) = self.plan.as_deref() else {
            return String::new();
        };
        match (self.insurance_type, self.age_category.as_deref()) {
            (InsuranceType::Personal, Some(age)) => format!("{plan} - Age: {age}"),
            _ => plan.to_string(),
        }
    }
}

/// Uniform JSON reply of both intake endpoints.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IntakeResponse {
    pub success: bool,
    pub message: String,
}

impl IntakeResponse {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inquiry(insurance_type: InsuranceType, plan: Option<&str>, age: Option<&str>) -> InsuranceInquiry {
        InsuranceInquiry {
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "+256700000000".to_string(),
            insurance_type,
            plan: plan.map(str::to_string),
            age_category: age.map(str::to_string),
            number_of_people: None,
            motivation: None,
        }
    }

    #[test]
    fn test_personal_plan_carries_age_category() {
        let inquiry = inquiry(InsuranceType::Personal, Some("Gold"), Some("26-35"));
        assert_eq!(inquiry.selected_plan(), "Gold - Age: 26-35");
    }

    #[test]
    fn test_age_category_ignored_outside_personal() {
        let inquiry = inquiry(InsuranceType::Corporate, Some("Platinum"), Some("26-35"));
        assert_eq!(inquiry.selected_plan(), "Platinum");
    }

    #[test]
    fn test_missing_plan_is_empty_even_with_age() {
        let inquiry = inquiry(InsuranceType::Personal, None, Some("26-35"));
        assert_eq!(inquiry.selected_plan(), "");
    }

    #[test]
    fn test_insurance_type_parsing() {
        assert_eq!("SME".parse::<InsuranceType>(), Ok(InsuranceType::Sme));
        assert_eq!(InsuranceType::Sme.plan_field(), "smePlan");
        assert!("sme".parse::<InsuranceType>().is_err());
        assert!("Vehicle".parse::<InsuranceType>().is_err());
    }

    #[test]
    fn test_submitted_form_trims_and_hides_blank_values() {
        let form = SubmittedForm::new()
            .with_field("fullName", "  Jane Doe  ")
            .with_field("phone", "   ");

        assert_eq!(form.get("fullName"), Some("Jane Doe"));
        assert_eq!(form.get("phone"), None);
        assert_eq!(form.get("email"), None);
    }
}
