// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for submission outcomes.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Submission outcome counters.
pub struct IntakeMetrics {
    registry: Registry,
    submissions: IntCounterVec,
}

impl IntakeMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let submissions = IntCounterVec::new(
            Opts::new(
                "intake_submissions_total",
                "Form submissions by form and outcome",
            ),
            &["form", "outcome"],
        )?;
        registry.register(Box::new(submissions.clone()))?;

        Ok(Self {
            registry,
            submissions,
        })
    }

    /// Count one submission of `form` that ended in `outcome`.
    pub fn record(&self, form: &str, outcome: &str) {
        self.submissions.with_label_values(&[form, outcome]).inc();
    }

    pub fn count(&self, form: &str, outcome: &str) -> u64 {
        self.submissions.with_label_values(&[form, outcome]).get()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
