//! # Validation Engine
//!
//! The host-facing entry points. A candidate document goes through:
//!
//! 1. Fleet-name check on every key (key-level violations).
//! 2. Structural check of every fleet against the rule set built from
//!    that fleet's own context.
//! 3. Relational check of every fleet that passed steps 1 and 2.
//! 4. On full success, normalization of every fleet (mandatory tag
//!    injected, overrides flattened).
//!
//! Either every fleet is accepted and the normalized document is returned,
//! or nothing is: a rejected document yields only its violations.

use serde_json::Value;
use sfmt_core::catalog;
use sfmt_core::{normalize_fleet, strip_priorities, FleetDocument, FleetSpec, LogicalPath, SfmtError};
use thiserror::Error;
use tracing::{debug, trace};

use crate::consistency::check_consistency;
use crate::rules::{build_rules, RuleContext};
use crate::structural::check_fleet;
use crate::violation::{ValidationViolations, Violation};

/// Errors that prevent validation from running at all.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The raw document text is not valid JSON. No logical path exists.
    #[error("document is not valid JSON (line {line}, column {column}): {message}")]
    Parse {
        /// 1-based line of the syntax error.
        line: usize,
        /// 1-based column of the syntax error.
        column: usize,
        /// Parser message.
        message: String,
    },

    /// The document could not be converted to or from its JSON form.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from the document model.
    #[error(transparent)]
    Model(#[from] SfmtError),
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Every fleet passed. `normalized` replaces the host's working copy.
    Accepted {
        /// The normalized document, fleets in their original order.
        normalized: FleetDocument,
        /// Non-fatal findings.
        advisories: Vec<Violation>,
    },
    /// At least one fatal violation. The host's working copy stays as it was.
    Rejected {
        /// Fatal violations in evaluation order.
        violations: ValidationViolations,
        /// Non-fatal findings.
        advisories: Vec<Violation>,
    },
}

impl ValidationResult {
    /// Returns true if the document was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Fatal violations; empty when accepted.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Accepted { .. } => &[],
            Self::Rejected { violations, .. } => violations.violations(),
        }
    }

    /// Non-fatal findings.
    pub fn advisories(&self) -> &[Violation] {
        match self {
            Self::Accepted { advisories, .. } | Self::Rejected { advisories, .. } => advisories,
        }
    }

    /// The normalized document, if accepted.
    pub fn normalized(&self) -> Option<&FleetDocument> {
        match self {
            Self::Accepted { normalized, .. } => Some(normalized),
            Self::Rejected { .. } => None,
        }
    }
}

/// Host-selected engine behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Remove priorities from fleets whose strategy does not use them,
    /// instead of rejecting them.
    pub strip_priorities: bool,
}

/// Validate a parsed document with default options.
pub fn validate(document: &Value) -> ValidationResult {
    validate_with(document, &ValidationOptions::default())
}

/// Validate raw document text.
///
/// # Errors
///
/// [`EngineError::Parse`] if `text` is not valid JSON.
pub fn validate_text(text: &str) -> Result<ValidationResult, EngineError> {
    Ok(validate(&parse_document(text)?))
}

/// Parse raw document text, keeping field order.
///
/// # Errors
///
/// [`EngineError::Parse`] if `text` is not valid JSON.
pub fn parse_document(text: &str) -> Result<Value, EngineError> {
    serde_json::from_str(text).map_err(|e| EngineError::Parse {
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
    })
}

/// Validate a typed document, e.g. one edited through the guided form.
///
/// # Errors
///
/// [`EngineError::Model`] if the document cannot be serialized.
pub fn validate_document(document: &FleetDocument) -> Result<ValidationResult, EngineError> {
    Ok(validate(&document.to_value()?))
}

/// Validate a parsed document.
pub fn validate_with(document: &Value, options: &ValidationOptions) -> ValidationResult {
    let mut fatal: Vec<Violation> = Vec::new();
    let mut advisories: Vec<Violation> = Vec::new();

    let Some(fleets) = document.as_object() else {
        fatal.push(Violation::structural(
            LogicalPath::root(),
            "must be an object keyed by fleet name",
            Some(document),
        ));
        debug!(violations = 1, "rejected document: root is not an object");
        return ValidationResult::Rejected {
            violations: ValidationViolations::new(fatal),
            advisories,
        };
    };

    let mut normalized = FleetDocument::new();
    for (name, fleet) in fleets {
        let path = LogicalPath::fleet(name);
        let mut found: Vec<Violation> = Vec::new();
        if !catalog::is_fleet_name(name) {
            found.push(Violation::fleet_name(name));
        }

        let context = RuleContext::from_fleet(fleet).with_strip_priorities(options.strip_priorities);
        check_fleet(&path, fleet, &build_rules(&context), &mut found);
        let passed_structure = !found.iter().any(Violation::is_fatal);

        if passed_structure {
            match serde_json::from_value::<FleetSpec>(fleet.clone()) {
                Ok(spec) => {
                    let spec = if options.strip_priorities {
                        strip_priorities(&spec)
                    } else {
                        spec
                    };
                    check_consistency(&path, &spec, &mut found);
                    normalized.insert(name.clone(), normalize_fleet(&spec));
                }
                Err(e) => found.push(Violation::structural(path.clone(), e.to_string(), None)),
            }
        }

        trace!(
            fleet = %name,
            passed_structure,
            findings = found.len(),
            "checked fleet"
        );
        for violation in found {
            if violation.is_fatal() {
                fatal.push(violation);
            } else {
                advisories.push(violation);
            }
        }
    }

    debug!(
        fleets = fleets.len(),
        violations = fatal.len(),
        advisories = advisories.len(),
        "validated fleet document"
    );

    if fatal.is_empty() {
        ValidationResult::Accepted {
            normalized,
            advisories,
        }
    } else {
        ValidationResult::Rejected {
            violations: ValidationViolations::new(fatal),
            advisories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sfmt_core::catalog::{MANDATORY_TAG_KEY, MANDATORY_TAG_VALUE};

    use crate::violation::ViolationKind;

    fn fleet() -> Value {
        json!({
            "AllocationStrategy": "lowestPrice",
            "IamFleetRole": "arn:aws:iam::123456789012:role/x",
            "TargetCapacity": 5,
            "LaunchTemplateConfigs": [{
                "LaunchTemplateSpecification": {
                    "LaunchTemplateId": "lt-00000000000000000",
                    "Version": "1"
                },
                "Overrides": [{
                    "InstanceType": "c5.large",
                    "SubnetId": ["subnet-00000000000000000", "subnet-11111111111111111"],
                    "WeightedCapacity": 2
                }]
            }]
        })
    }

    #[test]
    fn test_accepts_and_normalizes() {
        let result = validate(&json!({"render": fleet()}));
        let normalized = result.normalized().unwrap();
        let spec = normalized.get("render").unwrap();
        assert_eq!(spec.launch_template_configs[0].overrides.len(), 2);
        let tags = &spec.tag_specifications[0].tags;
        assert_eq!(tags[0].key, MANDATORY_TAG_KEY);
        assert_eq!(tags[0].value, MANDATORY_TAG_VALUE);
        assert!(result.advisories().is_empty());
    }

    #[test]
    fn test_root_must_be_object() {
        let result = validate(&json!([1, 2]));
        assert_eq!(result.violations().len(), 1);
        assert!(result.violations()[0].path.is_empty());
    }

    #[test]
    fn test_empty_document_is_accepted() {
        let result = validate(&json!({}));
        assert!(result.is_accepted());
        assert!(result.normalized().unwrap().is_empty());
    }

    #[test]
    fn test_bad_name_still_checks_fields() {
        let mut bad = fleet();
        bad["TargetCapacity"] = json!("5");
        let result = validate(&json!({"bad name": bad}));
        let kinds: Vec<_> = result.violations().iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec![ViolationKind::FleetName, ViolationKind::Structural]);
    }

    #[test]
    fn test_one_bad_fleet_rejects_whole_document() {
        let mut bad = fleet();
        bad.as_object_mut().unwrap().remove("IamFleetRole");
        let result = validate(&json!({"good": fleet(), "bad": bad}));
        assert!(!result.is_accepted());
        assert!(result.normalized().is_none());
        assert_eq!(result.violations().len(), 1);
        assert_eq!(result.violations()[0].path.fleet_name(), Some("bad"));
    }

    #[test]
    fn test_structural_failure_skips_relational_stage() {
        let mut bad = fleet();
        bad["TargetCapacity"] = json!(-1);
        bad["TagSpecifications"] = json!([{
            "ResourceType": "spot-fleet-request",
            "Tags": [{"Key": "aws:createdBy", "Value": "x"}]
        }]);
        let result = validate(&json!({"f1": bad}));
        assert_eq!(result.violations().len(), 1);
        assert_eq!(result.violations()[0].kind, ViolationKind::Structural);
    }

    #[test]
    fn test_advisory_does_not_block() {
        let mut doc = fleet();
        doc["LaunchTemplateConfigs"][0]["Overrides"][0]
            .as_object_mut()
            .unwrap()
            .remove("WeightedCapacity");
        let result = validate(&json!({"f1": doc}));
        assert!(result.is_accepted());
        assert_eq!(result.advisories().len(), 1);
        assert_eq!(result.advisories()[0].kind, ViolationKind::Advisory);
    }

    #[test]
    fn test_strip_priorities_option() {
        let mut doc = fleet();
        doc["LaunchTemplateConfigs"][0]["Overrides"][0]["Priority"] = json!(4);
        let document = json!({"f1": doc});
        assert!(!validate(&document).is_accepted());

        let options = ValidationOptions {
            strip_priorities: true,
        };
        let result = validate_with(&document, &options);
        let spec = result.normalized().unwrap().get("f1").unwrap();
        assert!(spec.overrides().all(|o| o.priority.is_none()));
    }

    #[test]
    fn test_parse_failure_has_position() {
        let err = validate_text("{\n  \"f1\": {,}\n}").unwrap_err();
        match err {
            EngineError::Parse { line, column, .. } => {
                assert_eq!(line, 2);
                assert!(column > 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_document_round_trips_typed_model() {
        let mut document = FleetDocument::new();
        let name = document.add_fleet();
        let result = validate_document(&document).unwrap();
        assert!(!result.is_accepted());
        assert!(result
            .violations()
            .iter()
            .all(|v| v.path.fleet_name() == Some(name.as_str())));
    }
}
