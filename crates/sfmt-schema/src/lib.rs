//! # sfmt-schema: Validation Engine for Fleet Documents
//!
//! Decides whether a candidate fleet document is acceptable and, when it
//! is, hands back the normalized document. Validation runs in two stages
//! per fleet:
//!
//! 1. **Structural** ([`structural`]): shape, types, patterns, cardinality
//!    and the conditional priority requirement. [`build_rules`] derives a
//!    declarative [`RuleSet`] from each fleet's context, [`fleet_schema`]
//!    turns it into a JSON Schema, and `jsonschema` evaluates it.
//! 2. **Relational** ([`consistency`]): priority and weight consistency,
//!    duplicate pairs and groups, reserved tag keys. Only fleets that passed the
//!    structural stage enter it.
//!
//! All violations across all fleets are collected in one pass. Advisory
//! findings (a missing weight) are reported but never block acceptance.
//!
//! ## Entry Points
//!
//! - [`validate`] for a parsed JSON value.
//! - [`validate_text`] for raw document text; parse failures surface as
//!   [`EngineError::Parse`] with no logical path.
//! - [`fleet_document_schema`] exports the per-field rules as a Draft
//!   2020-12 JSON Schema. Relational rules are engine-only.
//!
//! ## Crate Policy
//!
//! - Depends only on `sfmt-core` internally.
//! - Never mutates its input. Rejected documents produce no partial output.

pub mod consistency;
pub mod engine;
pub mod export;
pub mod rules;
pub mod structural;
pub mod violation;

pub use engine::{
    parse_document, validate, validate_document, validate_text, validate_with, EngineError,
    ValidationOptions, ValidationResult,
};
pub use export::{fleet_document_schema, fleet_schema};
pub use rules::{build_rules, Field, Presence, PriorityRule, RuleContext, RuleSet, Shape, StringRule};
pub use violation::{ValidationViolations, Violation, ViolationKind};
