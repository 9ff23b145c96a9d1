//! # Diagnostic Reports
//!
//! A [`DiagnosticReport`] is the display-ready form of one validation
//! outcome. Entries fall into three categories:
//!
//! - [`ReportCategory::FleetName`]: an invalid fleet-name key. If any exist,
//!   they are the only entries shown for the pass; field-level entries are
//!   counted as suppressed.
//! - [`ReportCategory::Field`]: every other fatal violation.
//! - [`ReportCategory::Parse`]: the text was not JSON. No path exists.
//!
//! Advisories are kept apart from entries: they never block acceptance and
//! are not part of navigation.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sfmt_core::LogicalPath;
use sfmt_schema::{EngineError, ValidationResult, Violation};
use tracing::debug;

use crate::cursor::NavigationState;
use crate::lines::LineIndex;
use crate::options::ReportOptions;
use crate::path::render_path;

/// Category of a report entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    /// The fleet-name key is invalid.
    FleetName,
    /// A field-level violation.
    Field,
    /// The document text could not be parsed.
    Parse,
}

/// One display-ready message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Category of the entry.
    pub category: ReportCategory,
    /// Logical path, absent for parse failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<LogicalPath>,
    /// Human-readable location, e.g. `f1 > Overrides > item 2`.
    pub location: String,
    /// The message, including the literal value when it is a scalar.
    pub message: String,
    /// 1-based line in the rendered document, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            write!(f, "line {line}: ")?;
        }
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Display-ready, navigable view of one validation outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// Fatal entries in display order.
    pub entries: Vec<ReportEntry>,
    /// Non-fatal findings.
    pub advisories: Vec<ReportEntry>,
    /// Field-level violations hidden behind fleet-name errors.
    pub suppressed: usize,
}

impl DiagnosticReport {
    /// Build a report from a validation result. `lines`, when given, is the
    /// line index of the rendered document the host displays.
    pub fn from_result(
        result: &ValidationResult,
        lines: Option<&LineIndex>,
        options: &ReportOptions,
    ) -> Self {
        let mut report = Self::from_violations(result.violations(), lines, options);
        report.advisories = result
            .advisories()
            .iter()
            .map(|v| entry(v, ReportCategory::Field, lines, options))
            .collect();
        report
    }

    /// Build a report from fatal violations in evaluation order.
    pub fn from_violations(
        violations: &[Violation],
        lines: Option<&LineIndex>,
        options: &ReportOptions,
    ) -> Self {
        let key_level: Vec<&Violation> = violations.iter().filter(|v| v.is_key_level()).collect();
        let (shown, category, suppressed) = if key_level.is_empty() {
            (violations.iter().collect::<Vec<_>>(), ReportCategory::Field, 0)
        } else {
            let suppressed = violations.len() - key_level.len();
            (key_level, ReportCategory::FleetName, suppressed)
        };
        if suppressed > 0 {
            debug!(suppressed, "field-level violations hidden behind fleet-name errors");
        }
        Self {
            entries: shown
                .into_iter()
                .map(|v| entry(v, category, lines, options))
                .collect(),
            advisories: Vec::new(),
            suppressed,
        }
    }

    /// A report for text that could not be parsed. Errors other than parse
    /// failures are reported without a line.
    pub fn from_engine_error(error: &EngineError) -> Self {
        let (line, message) = match error {
            EngineError::Parse { line, message, .. } => (Some(*line), message.clone()),
            other => (None, other.to_string()),
        };
        Self {
            entries: vec![ReportEntry {
                category: ReportCategory::Parse,
                path: None,
                location: "document".to_string(),
                message,
                line,
            }],
            advisories: Vec::new(),
            suppressed: 0,
        }
    }

    /// Number of navigable entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there is nothing to navigate.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if fleet-name errors are shown instead of field errors.
    pub fn has_key_level(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.category == ReportCategory::FleetName)
    }

    /// The entry the cursor points at.
    pub fn current(&self, state: &NavigationState) -> Option<&ReportEntry> {
        state.current().and_then(|index| self.entries.get(index))
    }

    /// A navigation state matching this report's length.
    pub fn navigation(&self) -> NavigationState {
        NavigationState::new(self.entries.len())
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.entries.len();
        for (i, entry) in self.entries.iter().enumerate() {
            writeln!(f, "[{}/{total}] {entry}", i + 1)?;
        }
        if self.suppressed > 0 {
            writeln!(
                f,
                "({} field-level violation(s) hidden until fleet names are fixed)",
                self.suppressed
            )?;
        }
        for advisory in &self.advisories {
            writeln!(f, "warning: {advisory}")?;
        }
        Ok(())
    }
}

fn entry(
    violation: &Violation,
    category: ReportCategory,
    lines: Option<&LineIndex>,
    options: &ReportOptions,
) -> ReportEntry {
    let mut message = violation.message.clone();
    if options.show_values {
        if let Some(literal) = violation.offending_value.as_ref().and_then(scalar_literal) {
            message.push_str(&format!(" (found {literal})"));
        }
    }
    ReportEntry {
        category,
        path: Some(violation.path.clone()),
        location: render_path(&violation.path, &options.path_separator),
        message,
        line: lines.and_then(|index| index.line_of(&violation.path)),
    }
}

/// JSON literal of a scalar. Structured values have no literal.
fn scalar_literal(value: &Value) -> Option<String> {
    match value {
        Value::Object(_) | Value::Array(_) => None,
        scalar => Some(scalar.to_string()),
    }
}
