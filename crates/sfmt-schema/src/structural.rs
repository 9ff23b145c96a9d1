//! # Structural Checker
//!
//! Compiles a fleet's [`RuleSet`] to JSON Schema with
//! [`fleet_schema`](crate::export::fleet_schema) and validates the raw
//! fleet value with `jsonschema`. Every schema error is collected: a
//! malformed group does not hide problems in the groups after it.
//!
//! The rule tree words each error. The field under the error's instance
//! path supplies the label, the presence condition and the declaration
//! order. Violations are sorted by declaration order, with undeclared
//! fields after the declared ones. An empty string in a required field
//! reads as missing, and so does a null one.
//!
//! Two checks have no schema keyword and walk the value directly: an
//! absent or null weight is an advisory, and tag keys must be unique
//! within one list.

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, ValidationError, Validator};
use serde_json::Value;
use sfmt_core::{LogicalPath, PathSegment};

use crate::export::fleet_schema;
use crate::rules::{Field, Presence, RuleSet, Shape, StringRule};
use crate::violation::Violation;

// Ranks order several failures of one value; only the first is kept.
const PRESENCE: u8 = 0;
const RANGE: u8 = 1;
const VALUE: u8 = 2;
const UNIQUE: u8 = 3;

/// Check one fleet value. Fatal violations are appended to `out` in
/// declaration order, followed by the advisories.
pub fn check_fleet(path: &LogicalPath, fleet: &Value, rules: &RuleSet, out: &mut Vec<Violation>) {
    let validator = match compile(rules) {
        Ok(validator) => validator,
        Err(e) => {
            out.push(Violation::structural(
                path.clone(),
                format!("rules could not be compiled: {e}"),
                None,
            ));
            return;
        }
    };
    let root = Shape::Object(rules.fields.clone());

    let mut found: Vec<Found> = validator
        .iter_errors(fleet)
        .flat_map(|error| describe(&error, &root, fleet))
        .collect();
    sort(&mut found);
    found.dedup_by(|later, earlier| later.segments == earlier.segments);

    let mut walked = Walked::default();
    walk(&root, fleet, &[], &mut walked);
    for (segments, message, offending) in walked.duplicates {
        let node = node_at(&root, fleet, &segments);
        found.push(Found::new(segments, node, UNIQUE, message, offending));
    }
    sort(&mut found);

    for entry in found {
        out.push(Violation::structural(
            to_path(path, &entry.segments),
            entry.message,
            entry.offending.as_ref(),
        ));
    }
    for (segments, note) in walked.advisories {
        out.push(Violation::advisory(to_path(path, &segments), note));
    }
}

fn compile(rules: &RuleSet) -> Result<Validator, ValidationError<'static>> {
    let schema = fleet_schema(rules);
    let mut opts = jsonschema::options();
    opts.with_draft(Draft::Draft202012);
    opts.build(&schema)
}

/// A failure located by path segments below the fleet.
struct Found {
    segments: Vec<PathSegment>,
    order: Vec<usize>,
    rank: u8,
    message: String,
    offending: Option<Value>,
}

impl Found {
    fn new(
        segments: Vec<PathSegment>,
        node: Node<'_>,
        rank: u8,
        message: impl Into<String>,
        offending: Option<Value>,
    ) -> Self {
        Self {
            segments,
            order: node.order,
            rank,
            message: message.into(),
            offending,
        }
    }
}

fn sort(found: &mut [Found]) {
    found.sort_by(|a, b| a.order.cmp(&b.order).then(a.rank.cmp(&b.rank)));
}

fn describe(error: &ValidationError<'_>, root: &Shape, fleet: &Value) -> Vec<Found> {
    let at = pointer_segments(fleet, error.instance_path.as_str());
    let value: &Value = &error.instance;
    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map_or_else(|| property.to_string(), str::to_string);
            let segments = extend(&at, PathSegment::Key(name));
            let node = node_at(root, fleet, &segments);
            let message = match node.field.map(|f| &f.presence) {
                Some(Presence::RequiredWhen(condition)) => format!("is required when {condition}"),
                _ => "is required".to_string(),
            };
            vec![Found::new(segments, node, PRESENCE, message, None)]
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => unexpected
            .iter()
            .map(|name| {
                let segments = extend(&at, PathSegment::Key(name.clone()));
                let node = node_at(root, fleet, &segments);
                let offending = value.get(name.as_str()).cloned();
                Found::new(segments, node, PRESENCE, "is not allowed", offending)
            })
            .collect(),
        kind => {
            let node = node_at(root, fleet, &at);
            if reads_as_missing(node.field, value) {
                return vec![Found::new(at, node, PRESENCE, "is required", None)];
            }
            let (rank, message, with_value) = value_message(kind, &node, error);
            let offending = with_value.then(|| value.clone());
            vec![Found::new(at, node, rank, message, offending)]
        }
    }
}

/// Rank, message, and whether the value is reported, for a failure of the
/// value itself.
fn value_message(kind: &ValidationErrorKind, node: &Node<'_>, error: &ValidationError<'_>) -> (u8, String, bool) {
    match kind {
        ValidationErrorKind::FalseSchema => {
            let message = match node.field.map(|f| &f.presence) {
                Some(Presence::ForbiddenWhen(condition)) => format!("is not allowed when {condition}"),
                _ => "is not allowed".to_string(),
            };
            (PRESENCE, message, true)
        }
        ValidationErrorKind::Type { .. } => (PRESENCE, format!("must be {}", expected(node.shape)), true),
        ValidationErrorKind::Minimum { limit } => {
            (RANGE, format!("must be greater than or equal to {limit}"), true)
        }
        ValidationErrorKind::MinItems { limit } => {
            (RANGE, format!("must contain at least {limit} {}", plural(*limit)), false)
        }
        ValidationErrorKind::MaxItems { .. } if matches!(node.shape, Some(Shape::Unsupported)) => {
            (RANGE, "is not supported".to_string(), true)
        }
        ValidationErrorKind::MaxItems { limit } => {
            (RANGE, format!("must contain at most {limit} {}", plural(*limit)), false)
        }
        ValidationErrorKind::MinLength { .. } => (RANGE, "must not be empty".to_string(), true),
        ValidationErrorKind::MaxLength { limit } => {
            (RANGE, format!("must be at most {limit} characters"), true)
        }
        ValidationErrorKind::Enum { .. } => {
            let message = match node.shape {
                Some(Shape::String(StringRule::OneOf(allowed))) => {
                    format!("must be one of: {}", allowed.join(", "))
                }
                Some(Shape::String(StringRule::Member { label, .. })) => {
                    format!("is not a supported {label}")
                }
                _ => error.to_string(),
            };
            (VALUE, message, true)
        }
        ValidationErrorKind::Constant { expected_value } => {
            (VALUE, format!("must be {expected_value}"), true)
        }
        ValidationErrorKind::Pattern { .. } => {
            let message = match node.shape {
                Some(Shape::String(StringRule::Pattern { label, .. })) => {
                    format!("is not a valid {label}")
                }
                _ => error.to_string(),
            };
            (VALUE, message, true)
        }
        _ => (VALUE, error.to_string(), true),
    }
}

fn reads_as_missing(field: Option<&Field>, value: &Value) -> bool {
    match (field.map(|f| &f.presence), value) {
        (Some(Presence::Required | Presence::RequiredWhen(_)), Value::String(s)) => s.is_empty(),
        (Some(Presence::Required), Value::Null) => true,
        _ => false,
    }
}

fn expected(shape: Option<&Shape>) -> String {
    match shape {
        Some(Shape::Either(first, second)) => {
            format!("{} or {}", first.describe(), second.describe())
        }
        Some(shape) => shape.describe().to_string(),
        None => "a value".to_string(),
    }
}

/// Where a path lands in the rule tree.
struct Node<'r> {
    /// The field named by the last segment, if it is a declared key.
    field: Option<&'r Field>,
    /// The expected shape, resolved against the value when it is an
    /// either-shape.
    shape: Option<&'r Shape>,
    /// Sort key: declaration index per key, undeclared keys after the
    /// declared ones in document order, array indices as they are.
    order: Vec<usize>,
}

fn node_at<'r>(root: &'r Shape, fleet: &Value, segments: &[PathSegment]) -> Node<'r> {
    let mut node = Node {
        field: None,
        shape: Some(resolve(root, Some(fleet))),
        order: Vec::with_capacity(segments.len()),
    };
    let mut value = Some(fleet);
    for segment in segments {
        let next = value.and_then(|v| child(v, segment));
        match segment {
            PathSegment::Key(key) => {
                let fields: &[Field] = match node.shape {
                    Some(Shape::Object(fields)) => fields,
                    _ => &[],
                };
                match fields.iter().position(|f| f.name == key.as_str()) {
                    Some(index) => {
                        let field = &fields[index];
                        node.order.push(index);
                        node.field = Some(field);
                        node.shape = Some(resolve(&field.shape, next));
                    }
                    None => {
                        let position = value
                            .and_then(Value::as_object)
                            .and_then(|map| map.keys().position(|k| k == key))
                            .unwrap_or_default();
                        node.order.push(fields.len() + position);
                        node.field = None;
                        node.shape = None;
                    }
                }
            }
            PathSegment::Index(index) => {
                node.order.push(*index);
                node.field = None;
                node.shape = match node.shape {
                    Some(Shape::Array { items, .. }) => Some(resolve(items, next)),
                    _ => None,
                };
            }
        }
        value = next;
    }
    node
}

/// Pick the branch of an either-shape that matches the value's JSON type.
/// A value of neither type keeps the either-shape.
fn resolve<'r>(shape: &'r Shape, value: Option<&Value>) -> &'r Shape {
    match (shape, value) {
        (Shape::Either(first, _), Some(v)) if first.accepts_type(v) => resolve(first, value),
        (Shape::Either(_, second), Some(v)) if second.accepts_type(v) => resolve(second, value),
        _ => shape,
    }
}

#[derive(Default)]
struct Walked {
    duplicates: Vec<(Vec<PathSegment>, String, Option<Value>)>,
    advisories: Vec<(Vec<PathSegment>, &'static str)>,
}

fn walk(shape: &Shape, value: &Value, at: &[PathSegment], walked: &mut Walked) {
    match resolve(shape, Some(value)) {
        Shape::Object(fields) => {
            let Some(map) = value.as_object() else {
                return;
            };
            for field in fields {
                let segments = extend(at, PathSegment::Key(field.name.to_string()));
                match (&field.presence, map.get(field.name)) {
                    (Presence::Advisory(note), None | Some(Value::Null)) => {
                        walked.advisories.push((segments, *note));
                    }
                    (_, Some(child)) => walk(&field.shape, child, &segments, walked),
                    (_, None) => {}
                }
            }
        }
        Shape::Array {
            items, unique_key, ..
        } => {
            let Some(elements) = value.as_array() else {
                return;
            };
            for (index, element) in elements.iter().enumerate() {
                walk(items, element, &extend(at, PathSegment::Index(index)), walked);
            }
            if let Some(key) = unique_key {
                check_unique(elements, key, at, walked);
            }
        }
        _ => {}
    }
}

fn check_unique(elements: &[Value], key: &str, at: &[PathSegment], walked: &mut Walked) {
    let mut seen: Vec<(&str, usize)> = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        let Some(candidate) = element.get(key).and_then(Value::as_str) else {
            continue;
        };
        match seen.iter().find(|(k, _)| *k == candidate) {
            Some((_, first)) => {
                let mut segments = extend(at, PathSegment::Index(index));
                segments.push(PathSegment::Key(key.to_string()));
                walked.duplicates.push((
                    segments,
                    format!("duplicates the {key} of item {}", first + 1),
                    element.get(key).cloned(),
                ));
            }
            None => seen.push((candidate, index)),
        }
    }
}

/// Split a JSON pointer into segments. A numeric token is an index only
/// where the value it steps into is an array.
fn pointer_segments(fleet: &Value, pointer: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current = Some(fleet);
    for token in pointer.split('/').skip(1) {
        let token = token.replace("~1", "/").replace("~0", "~");
        let segment = match (current, token.parse::<usize>()) {
            (Some(Value::Array(_)), Ok(index)) => PathSegment::Index(index),
            _ => PathSegment::Key(token),
        };
        current = current.and_then(|v| child(v, &segment));
        segments.push(segment);
    }
    segments
}

fn child<'v>(value: &'v Value, segment: &PathSegment) -> Option<&'v Value> {
    match segment {
        PathSegment::Key(key) => value.as_object()?.get(key),
        PathSegment::Index(index) => value.as_array()?.get(*index),
    }
}

fn extend(at: &[PathSegment], segment: PathSegment) -> Vec<PathSegment> {
    let mut segments = at.to_vec();
    segments.push(segment);
    segments
}

fn to_path(base: &LogicalPath, segments: &[PathSegment]) -> LogicalPath {
    segments.iter().fold(base.clone(), |path, segment| match segment {
        PathSegment::Key(key) => path.key(key),
        PathSegment::Index(index) => path.index(*index),
    })
}

fn plural(n: u64) -> &'static str {
    if n == 1 {
        "item"
    } else {
        "items"
    }
}
