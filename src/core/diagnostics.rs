//! Diagnostics sink for setup and phase anomalies
//!
//! Passed explicitly into setup and the simulation manager. Every record is
//! also forwarded to `tracing`.

use serde::Serialize;

use crate::core::types::Round;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub round: Option<Round>,
    pub message: String,
}

/// Ordered record of everything worth reporting about one resolution
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, severity: Severity, round: Option<Round>, message: String) {
        match severity {
            Severity::Info => tracing::info!(round = ?round, "{}", message),
            Severity::Warning => tracing::warn!(round = ?round, "{}", message),
            Severity::Error => tracing::error!(round = ?round, "{}", message),
        }
        self.entries.push(Diagnostic {
            severity,
            round,
            message,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(Severity::Info, None, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(Severity::Warning, None, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(Severity::Error, None, message.into());
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
