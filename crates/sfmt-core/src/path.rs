//! # Logical Paths
//!
//! A [`LogicalPath`] locates a value inside a fleet document as an ordered
//! sequence of field names and 0-based array indices, starting with the
//! fleet name. The empty path denotes the document root.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a logical path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// An object field name (or a fleet name at the first position).
    Key(String),
    /// A 0-based array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Ordered sequence of path segments from the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalPath(Vec<PathSegment>);

impl LogicalPath {
    /// The document root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// The path of a fleet entry.
    pub fn fleet(name: &str) -> Self {
        Self(vec![PathSegment::Key(name.to_string())])
    }

    /// Returns a child path through an object field.
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    /// Returns a child path through an array index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Returns the segments of this path.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the document root.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The fleet this path points into, if any.
    pub fn fleet_name(&self) -> Option<&str> {
        match self.0.first() {
            Some(PathSegment::Key(name)) => Some(name),
            _ => None,
        }
    }

    /// The last named segment, skipping trailing indices.
    pub fn field_name(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|segment| match segment {
            PathSegment::Key(key) => Some(key.as_str()),
            PathSegment::Index(_) => None,
        })
    }

    /// Returns the path without its last segment, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Returns true if `prefix` is a (non-strict) prefix of this path.
    pub fn starts_with(&self, prefix: &LogicalPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl From<Vec<PathSegment>> for LogicalPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for LogicalPath {
    /// Dotted form, e.g. `f1.LaunchTemplateConfigs.0.Overrides.1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
