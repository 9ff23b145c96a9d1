//! # Rename Subcommand
//!
//! Renames one fleet in place. The fleet keeps its position and every
//! fleet is written back as it was read, fields and all. An invalid new
//! name or a collision with another fleet is refused.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use serde_json::Value;
use sfmt_core::rename_fleet_entry;
use sfmt_report::DiagnosticReport;
use sfmt_schema::parse_document;

use crate::config::CliConfig;
use crate::{emit, read_document, to_json, EXIT_ACCEPTED, EXIT_INPUT_ERROR, EXIT_REJECTED};

/// Arguments for the rename subcommand.
#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Fleet document (JSON).
    pub file: PathBuf,

    /// Current fleet name.
    pub old: String,

    /// New fleet name.
    pub new: String,

    /// Write the updated document here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Execute the rename subcommand.
pub fn run_rename(args: &RenameArgs, config: &CliConfig) -> Result<u8> {
    let text = read_document(&args.file)?;
    let value = match parse_document(&text) {
        Ok(value) => value,
        Err(e) => {
            eprint!("{}", DiagnosticReport::from_engine_error(&e));
            return Ok(EXIT_INPUT_ERROR);
        }
    };
    let Value::Object(mut fleets) = value else {
        bail!("{} is not an object keyed by fleet name", args.file.display());
    };

    if let Err(e) = rename_fleet_entry(&mut fleets, &args.old, &args.new) {
        eprintln!("rename refused: {e}");
        return Ok(EXIT_REJECTED);
    }
    tracing::info!(old = %args.old, new = %args.new, "renamed fleet");
    emit(&to_json(&Value::Object(fleets), config.output.pretty)?, args.output.as_deref())?;
    Ok(EXIT_ACCEPTED)
}
