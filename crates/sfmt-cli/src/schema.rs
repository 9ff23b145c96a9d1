//! # Schema Subcommand
//!
//! Prints the fleet document JSON Schema for use by editors and linters.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use sfmt_schema::fleet_document_schema;

use crate::config::CliConfig;
use crate::{emit, to_json, EXIT_ACCEPTED};

/// Arguments for the schema subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Write the schema here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs, config: &CliConfig) -> Result<u8> {
    emit(
        &to_json(&fleet_document_schema(), config.output.pretty)?,
        args.output.as_deref(),
    )?;
    Ok(EXIT_ACCEPTED)
}
