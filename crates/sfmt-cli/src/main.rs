//! # sfmt CLI entry point
//!
//! Parses command-line arguments, loads the optional configuration file
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sfmt_cli::config::CliConfig;
use sfmt_cli::group::{run_group, GroupArgs};
use sfmt_cli::normalize::{run_normalize, NormalizeArgs};
use sfmt_cli::rename::{run_rename, RenameArgs};
use sfmt_cli::schema::{run_schema, SchemaArgs};
use sfmt_cli::validate::{run_validate, ValidateArgs};
use sfmt_cli::EXIT_INPUT_ERROR;

/// Spot fleet configuration validator and normalizer.
///
/// Checks fleet documents against the structural and relational rules,
/// reports violations with document lines, and writes normalized documents.
#[derive(Parser, Debug)]
#[command(name = "sfmt", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a fleet document and print the violation report.
    Validate(ValidateArgs),

    /// Validate and write the normalized fleet document.
    Normalize(NormalizeArgs),

    /// Show one fleet's overrides grouped by instance type.
    Group(GroupArgs),

    /// Rename a fleet, keeping its position in the document.
    Rename(RenameArgs),

    /// Print the fleet document JSON Schema.
    Schema(SchemaArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("sfmt CLI starting");

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(EXIT_INPUT_ERROR);
        }
    };

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, &config),
        Commands::Normalize(args) => run_normalize(args, &config),
        Commands::Group(args) => run_group(args, &config),
        Commands::Rename(args) => run_rename(args, &config),
        Commands::Schema(args) => run_schema(args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_INPUT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfmt_cli::validate::OutputFormat;

    #[test]
    fn cli_parse_validate_json() {
        let cli = Cli::try_parse_from(["sfmt", "validate", "fleet.json", "--format", "json"]).unwrap();
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("fleet.json"));
            assert_eq!(args.format, OutputFormat::Json);
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_normalize_flags() {
        let cli = Cli::try_parse_from([
            "sfmt",
            "-vv",
            "normalize",
            "fleet.json",
            "--strip-priorities",
            "-o",
            "out.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        if let Commands::Normalize(args) = cli.command {
            assert!(args.strip_priorities);
            assert_eq!(args.output, Some(PathBuf::from("out.json")));
        } else {
            panic!("expected normalize");
        }
    }

    #[test]
    fn cli_parse_rename_and_global_config() {
        let cli = Cli::try_parse_from(["sfmt", "rename", "fleet.json", "old", "new", "--config", "c.yaml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.yaml")));
        assert!(matches!(cli.command, Commands::Rename(_)));
    }

    #[test]
    fn cli_group_requires_fleet() {
        assert!(Cli::try_parse_from(["sfmt", "group", "fleet.json"]).is_err());
    }
}
