//! # Violations
//!
//! A [`Violation`] records one rule failure: where it happened (a
//! [`LogicalPath`]), what went wrong, and the offending value when there is
//! one. Violations are created by the validation pass and never mutated
//! afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sfmt_core::LogicalPath;

/// Category of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The fleet-name key itself is invalid.
    FleetName,
    /// Missing or malformed field, wrong type, pattern or cardinality failure.
    Structural,
    /// A rule spanning several entries of one fleet.
    Relational,
    /// Non-fatal finding. The document is still accepted.
    Advisory,
}

/// A single rule failure with its location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Category of the failure.
    pub kind: ViolationKind,
    /// Location inside the document. Empty for the document root.
    pub path: LogicalPath,
    /// Predicate describing the failure, e.g. `is required`.
    pub message: String,
    /// The value found at `path`, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offending_value: Option<Value>,
}

impl Violation {
    /// A fleet name that does not match the fleet-name pattern.
    pub fn fleet_name(name: &str) -> Self {
        Self {
            kind: ViolationKind::FleetName,
            path: LogicalPath::fleet(name),
            message: "is not a valid fleet name: only A-Z, a-z, 0-9, - and _ are allowed"
                .to_string(),
            offending_value: Some(Value::String(name.to_string())),
        }
    }

    /// A shape, type or pattern failure.
    pub fn structural(path: LogicalPath, message: impl Into<String>, value: Option<&Value>) -> Self {
        Self {
            kind: ViolationKind::Structural,
            path,
            message: message.into(),
            offending_value: value.cloned(),
        }
    }

    /// A failure of a rule that spans several entries.
    pub fn relational(path: LogicalPath, message: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            kind: ViolationKind::Relational,
            path,
            message: message.into(),
            offending_value: value,
        }
    }

    /// A non-fatal finding.
    pub fn advisory(path: LogicalPath, message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::Advisory,
            path,
            message: message.into(),
            offending_value: None,
        }
    }

    /// Returns true if the fleet-name key itself is at fault.
    pub fn is_key_level(&self) -> bool {
        self.kind == ViolationKind::FleetName
    }

    /// Returns true if this violation blocks acceptance.
    pub fn is_fatal(&self) -> bool {
        self.kind != ViolationKind::Advisory
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.path, self.message)
        }
    }
}

/// Ordered collection of fatal violations from one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Wrap violations in evaluation order.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Iterate violations in evaluation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl<'a> IntoIterator for &'a ValidationViolations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}
