//! # Error Types
//!
//! Errors raised by document editing operations. Validation failures are
//! not errors: they are reported as data by the schema crate so that every
//! violation can be collected in one pass.

use thiserror::Error;

/// Top-level error type for fleet document operations.
#[derive(Error, Debug)]
pub enum SfmtError {
    /// A fleet name does not match the fleet-name pattern.
    #[error("invalid fleet name {0:?}: valid characters are A-Z, a-z, 0-9, - and _")]
    InvalidFleetName(String),

    /// The referenced fleet does not exist in the document.
    #[error("fleet {0:?} not found")]
    FleetNotFound(String),

    /// A rename would collide with a different existing fleet.
    #[error("fleet name {0:?} already exists; choose another name")]
    FleetNameTaken(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
