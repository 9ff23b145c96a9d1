//! # Group Subcommand
//!
//! Prints the guided-form view of one fleet: each launch template group
//! with its overrides merged by instance type.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sfmt_core::{group_fleet, FleetDocument};
use sfmt_report::DiagnosticReport;
use sfmt_schema::parse_document;

use crate::config::CliConfig;
use crate::{emit, read_document, to_json, EXIT_ACCEPTED, EXIT_INPUT_ERROR};

/// Arguments for the group subcommand.
#[derive(Args, Debug)]
pub struct GroupArgs {
    /// Fleet document (JSON).
    pub file: PathBuf,

    /// Name of the fleet to show.
    #[arg(long)]
    pub fleet: String,
}

/// Execute the group subcommand.
pub fn run_group(args: &GroupArgs, config: &CliConfig) -> Result<u8> {
    let text = read_document(&args.file)?;
    let value = match parse_document(&text) {
        Ok(value) => value,
        Err(e) => {
            eprint!("{}", DiagnosticReport::from_engine_error(&e));
            return Ok(EXIT_INPUT_ERROR);
        }
    };
    let document = FleetDocument::from_value(value)
        .with_context(|| format!("{} does not match the fleet document model", args.file.display()))?;
    let spec = document
        .get(&args.fleet)
        .with_context(|| format!("fleet {:?} not found", args.fleet))?;
    emit(&to_json(&group_fleet(spec), config.output.pretty)?, None)?;
    Ok(EXIT_ACCEPTED)
}
