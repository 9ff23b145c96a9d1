//! # sfmt-cli: Command-Line Host for the Fleet Engine
//!
//! A thin host around the engine: it owns file input and output, calls
//! the engine's entry points, and prints the diagnostic report. No rule
//! lives here.
//!
//! ## Subcommands
//!
//! - `sfmt validate`: validate a document and print the navigable report.
//! - `sfmt normalize`: print or write the accepted, normalized document.
//! - `sfmt group`: print the guided-form (grouped) view of one fleet.
//! - `sfmt rename`: rename a fleet with collision detection.
//! - `sfmt schema`: print the exported JSON Schema.
//!
//! ## Exit Codes
//!
//! `0` accepted, `1` rejected, `2` unreadable or unparsable input.

pub mod config;
pub mod group;
pub mod normalize;
pub mod rename;
pub mod schema;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// The document was accepted.
pub const EXIT_ACCEPTED: u8 = 0;
/// The document was rejected.
pub const EXIT_REJECTED: u8 = 1;
/// The input could not be read or parsed.
pub const EXIT_INPUT_ERROR: u8 = 2;

/// Read a document file as text.
pub fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read document {}", path.display()))
}

/// Serialize `value` as JSON, pretty or compact.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.context("failed to serialize output")
}

/// Write `text` to `output`, or print it when no output file is given.
pub fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, format!("{text}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{text}"),
    }
    Ok(())
}
