//! Presentation options for reports, loaded from the host's configuration.

use serde::{Deserialize, Serialize};

/// Separator placed between rendered path segments by default.
pub const DEFAULT_PATH_SEPARATOR: &str = " > ";

/// How violation entries are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    /// Separator between path segments.
    pub path_separator: String,
    /// Include scalar offending values in messages.
    pub show_values: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            path_separator: DEFAULT_PATH_SEPARATOR.to_string(),
            show_values: true,
        }
    }
}
