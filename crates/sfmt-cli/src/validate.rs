//! # Validate Subcommand
//!
//! Parses a document, validates it and prints the diagnostic report with
//! line numbers that refer to the input text as written.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use sfmt_report::{DiagnosticReport, LineIndex, ReportOptions};
use sfmt_schema::{parse_document, validate};

use crate::config::CliConfig;
use crate::{read_document, to_json, EXIT_ACCEPTED, EXIT_INPUT_ERROR, EXIT_REJECTED};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Fleet document to validate (JSON).
    pub file: PathBuf,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Report format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Numbered, human-readable lines.
    #[default]
    Text,
    /// The report as JSON.
    Json,
}

#[derive(Serialize)]
struct ValidationOutput<'a> {
    accepted: bool,
    report: &'a DiagnosticReport,
}

/// Validate document text and return the report with its exit code.
pub fn check_text(text: &str, options: &ReportOptions) -> (DiagnosticReport, u8) {
    match parse_document(text) {
        Err(e) => (DiagnosticReport::from_engine_error(&e), EXIT_INPUT_ERROR),
        Ok(document) => {
            let result = validate(&document);
            let lines = LineIndex::from_source(text);
            let report = DiagnosticReport::from_result(&result, lines.as_ref(), options);
            let code = if result.is_accepted() {
                EXIT_ACCEPTED
            } else {
                EXIT_REJECTED
            };
            (report, code)
        }
    }
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, config: &CliConfig) -> Result<u8> {
    let text = read_document(&args.file)?;
    let (report, code) = check_text(&text, &config.report);
    tracing::debug!(
        file = %args.file.display(),
        entries = report.len(),
        code,
        "validated document"
    );

    match args.format {
        OutputFormat::Json => {
            let output = ValidationOutput {
                accepted: code == EXIT_ACCEPTED,
                report: &report,
            };
            println!("{}", to_json(&output, config.output.pretty)?);
        }
        OutputFormat::Text => {
            match code {
                EXIT_ACCEPTED => println!("OK: {} is a valid fleet document", args.file.display()),
                EXIT_REJECTED => println!(
                    "FAIL: {} has {} violation(s)",
                    args.file.display(),
                    report.len() + report.suppressed
                ),
                _ => println!("FAIL: {} could not be parsed", args.file.display()),
            }
            print!("{report}");
        }
    }
    Ok(code)
}
