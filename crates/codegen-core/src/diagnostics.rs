//! Structured diagnostics collected by the engine.
//!
//! Load and generate failures are not propagated as errors. They are logged
//! and recorded here so callers (CLI, tests, hosts) can inspect what was
//! skipped without scraping logs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::errors::CodegenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            code: code.into(),
            message: message.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, code, message)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, code, message)
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, code, message)
    }

    pub fn with(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.data.insert(k.into(), v.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }
}

impl From<&CodegenError> for Diagnostic {
    fn from(e: &CodegenError) -> Self {
        let level = match e {
            CodegenError::MergeAmbiguity { .. } => DiagnosticLevel::Warning,
            _ => DiagnosticLevel::Error,
        };
        Diagnostic::new(level, e.code(), e.to_string())
    }
}

/// Counting helpers shared by engine reports.
pub trait DiagnosticsExt {
    fn diagnostics(&self) -> &[Diagnostic];

    fn has_errors(&self) -> bool {
        self.diagnostics().iter().any(Diagnostic::is_error)
    }

    fn warnings(&self) -> usize {
        self.diagnostics()
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
            .count()
    }

    fn with_code<'a>(&'a self, code: &'a str) -> Box<dyn Iterator<Item = &'a Diagnostic> + 'a> {
        Box::new(self.diagnostics().iter().filter(move |d| d.code == code))
    }
}

impl DiagnosticsExt for Vec<Diagnostic> {
    fn diagnostics(&self) -> &[Diagnostic] {
        self
    }
}
