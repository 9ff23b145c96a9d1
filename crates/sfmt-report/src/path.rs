//! Human-readable rendering of logical paths.

use sfmt_core::{LogicalPath, PathSegment};

/// Render `path` for humans: named segments as-is, array indices as
/// 1-based `item N`, joined by `separator`. The root renders as `(root)`.
pub fn render_path(path: &LogicalPath, separator: &str) -> String {
    if path.is_empty() {
        return "(root)".to_string();
    }
    path.segments()
        .iter()
        .map(|segment| match segment {
            PathSegment::Key(key) => key.clone(),
            PathSegment::Index(index) => format!("item {}", index + 1),
        })
        .collect::<Vec<_>>()
        .join(separator)
}
