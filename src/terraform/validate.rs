// Copyright (c) 2025 - Cowboy AI, Inc.
//! Parsing of `terraform validate -json`

use serde::{Deserialize, Serialize};

use crate::errors::{InfrastructureError, InfrastructureResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One problem reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub range: Option<SourceRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    pub filename: String,
    pub start: SourcePos,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

/// Result of validating the definition set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateReport {
    pub valid: bool,
    #[serde(default)]
    pub error_count: u32,
    #[serde(default)]
    pub warning_count: u32,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidateReport {
    pub fn parse(raw: &str) -> InfrastructureResult<Self> {
        serde_json::from_str(raw.trim())
            .map_err(|e| InfrastructureError::Deserialization(format!("validate report: {e}")))
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// One line per error, `file:line: summary`
    pub fn error_summary(&self) -> String {
        self.errors()
            .map(|d| match &d.range {
                Some(range) => format!("{}:{}: {}", range.filename, range.start.line, d.summary),
                None => d.summary.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_report() {
        let report = ValidateReport::parse(
            r#"{"format_version":"1.0","valid":true,"error_count":0,"warning_count":0,"diagnostics":[]}"#,
        )
        .unwrap();
        assert!(report.valid);
        assert_eq!(report.errors().count(), 0);
    }

    #[test]
    fn test_parse_invalid_report() {
        let raw = r#"{
            "format_version": "1.0",
            "valid": false,
            "error_count": 1,
            "warning_count": 1,
            "diagnostics": [
                {"severity": "error", "summary": "Reference to undeclared input variable",
                 "detail": "An input variable with the name \"vnet\" has not been declared.",
                 "range": {"filename": "main.tf", "start": {"line": 9, "column": 25, "byte": 200},
                           "end": {"line": 9, "column": 33, "byte": 208}}},
                {"severity": "warning", "summary": "Deprecated attribute"}
            ]
        }"#;
        let report = ValidateReport::parse(raw).unwrap();
        assert!(!report.valid);
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(
            report.error_summary(),
            "main.tf:9: Reference to undeclared input variable"
        );
    }
}
