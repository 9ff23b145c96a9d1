//! # Normalize Subcommand
//!
//! Validates a document and writes its normalized form: mandatory tag
//! injected, overrides flattened. Rejected documents produce no output.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use sfmt_report::DiagnosticReport;
use sfmt_schema::{parse_document, validate_with, ValidationOptions, ValidationResult};

use crate::config::CliConfig;
use crate::{emit, read_document, to_json, EXIT_ACCEPTED, EXIT_INPUT_ERROR, EXIT_REJECTED};

/// Arguments for the normalize subcommand.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Fleet document to normalize (JSON).
    pub file: PathBuf,

    /// Remove priorities from fleets whose strategy does not use them
    /// instead of rejecting the document.
    #[arg(long)]
    pub strip_priorities: bool,

    /// Write the normalized document here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Execute the normalize subcommand.
pub fn run_normalize(args: &NormalizeArgs, config: &CliConfig) -> Result<u8> {
    let text = read_document(&args.file)?;
    let document = match parse_document(&text) {
        Ok(document) => document,
        Err(e) => {
            eprint!("{}", DiagnosticReport::from_engine_error(&e));
            return Ok(EXIT_INPUT_ERROR);
        }
    };

    let options = ValidationOptions {
        strip_priorities: args.strip_priorities,
    };
    let result = validate_with(&document, &options);
    let report = DiagnosticReport::from_result(&result, None, &config.report);

    match &result {
        ValidationResult::Accepted { normalized, .. } => {
            for advisory in &report.advisories {
                tracing::warn!("{advisory}");
            }
            emit(&to_json(normalized, config.output.pretty)?, args.output.as_deref())?;
            Ok(EXIT_ACCEPTED)
        }
        ValidationResult::Rejected { .. } => {
            eprint!("{report}");
            Ok(EXIT_REJECTED)
        }
    }
}
