//! # sfmt-report: Diagnostic Reporter
//!
//! Turns the engine's violations into display-ready, navigable messages.
//! The reporter never validates anything and never renders UI; it only
//! shapes data for a host to present.
//!
//! - [`render_path`] converts a logical path into a human label, with
//!   array indices shown as 1-based `item N`.
//! - [`LineIndex`] maps a logical path to its line in the pretty-printed
//!   document produced by [`render_document`].
//! - [`DiagnosticReport`] groups entries by [`ReportCategory`]. Fleet-name
//!   errors take precedence and suppress field-level entries.
//! - [`NavigationState`] steps through the entries, clamped at both ends,
//!   and survives re-renders with a changed violation list.

pub mod cursor;
pub mod lines;
pub mod options;
pub mod path;
pub mod report;

pub use cursor::{next_violation, previous_violation, NavigationState};
pub use lines::{render_document, LineIndex};
pub use options::ReportOptions;
pub use path::render_path;
pub use report::{DiagnosticReport, ReportCategory, ReportEntry};
