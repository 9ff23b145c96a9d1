//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`. Every key is optional:
//!
//! ```yaml
//! report:
//!   path_separator: " / "
//!   show_values: false
//! output:
//!   pretty: true
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sfmt_report::ReportOptions;

/// Top-level CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// How violation reports are rendered.
    pub report: ReportOptions,
    /// How JSON output is written.
    pub output: OutputConfig,
}

/// JSON output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl CliConfig {
    /// Load the configuration file, or the defaults when none is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parse configuration YAML. An empty document yields the defaults.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.report.path_separator, " > ");
        assert!(config.report.show_values);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = CliConfig::from_yaml("report:\n  show_values: false\n").unwrap();
        assert!(!config.report.show_values);
        assert_eq!(config.report.path_separator, " > ");
        assert!(config.output.pretty);
    }

    #[test]
    fn test_empty_yaml() {
        assert_eq!(CliConfig::from_yaml("").unwrap(), CliConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(CliConfig::from_yaml("report: [1, 2").is_err());
    }
}
