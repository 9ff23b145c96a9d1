//! # Rule Sets
//!
//! The structural rules of a fleet are data, not code: a [`RuleSet`] is a
//! tree of [`Field`]s and [`Shape`]s. The exporter translates it into JSON
//! Schema, and the structural checker uses it again to word the schema
//! errors.
//!
//! Rules that depend on a sibling value (priority is required only under
//! the prioritized strategy) are resolved up front: [`build_rules`] takes
//! the sibling values as an explicit [`RuleContext`] and returns a rule set
//! with the conditional already decided. Nothing is cached between calls.

use sfmt_core::catalog::{
    AllocationStrategy, FleetType, IAM_FLEET_ROLE_PATTERN, INSTANCE_TYPES,
    LAUNCH_TEMPLATE_ID_PATTERN, MAX_TAG_KEY_LENGTH, MAX_TAG_SPECIFICATIONS,
    MAX_TAG_VALUE_LENGTH, SUBNET_ID_PATTERN, TAG_RESOURCE_TYPE, TAG_TEXT_PATTERN,
};
use serde_json::Value;

/// Sibling values the rules of one fleet depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleContext {
    /// The fleet's allocation strategy, if it names a known one.
    pub allocation_strategy: Option<AllocationStrategy>,
    /// The host opted into removing priorities from non-prioritized fleets.
    pub strip_priorities: bool,
}

impl RuleContext {
    /// Read the context from a raw fleet value. Unknown or missing
    /// strategies yield `None`.
    pub fn from_fleet(fleet: &Value) -> Self {
        let allocation_strategy = fleet
            .get("AllocationStrategy")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok());
        Self {
            allocation_strategy,
            strip_priorities: false,
        }
    }

    /// Enable priority stripping for non-prioritized fleets.
    pub fn with_strip_priorities(mut self, strip: bool) -> Self {
        self.strip_priorities = strip;
        self
    }

    /// How `Priority` is constrained on every override of the fleet.
    pub fn priority_rule(&self) -> PriorityRule {
        match self.allocation_strategy {
            Some(strategy) if strategy.is_prioritized() => PriorityRule::Required,
            Some(_) if self.strip_priorities => PriorityRule::Unconstrained,
            Some(_) => PriorityRule::Forbidden,
            None => PriorityRule::Unconstrained,
        }
    }
}

/// Constraint on the presence of `Priority`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityRule {
    /// Every override must carry a priority.
    Required,
    /// No override may carry a priority.
    Forbidden,
    /// Presence is not constrained (strategy unknown, or priorities are
    /// stripped before normalization).
    Unconstrained,
}

/// Whether a field must, may or must not be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    /// Must be present. An empty string counts as missing.
    Required,
    /// May be absent.
    Optional,
    /// May be absent or null, with an advisory carrying this message.
    Advisory(&'static str),
    /// Required because of a sibling value, described by the condition.
    RequiredWhen(String),
    /// Must be absent because of a sibling value, described by the condition.
    ForbiddenWhen(String),
}

/// Constraint on a string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringRule {
    /// One of a short list of values, enumerated in the message.
    OneOf(Vec<&'static str>),
    /// Member of a long catalog list.
    Member {
        /// Human name of the catalog, e.g. `instance type`.
        label: &'static str,
        /// Permitted values.
        values: &'static [&'static str],
    },
    /// Matches an identifier pattern.
    Pattern {
        /// Human name of the identifier.
        label: &'static str,
        /// Regular expression, evaluated by the JSON Schema `pattern` keyword.
        pattern: &'static str,
        /// Maximum length in characters.
        max_length: Option<usize>,
    },
    /// Exactly this literal.
    Const(&'static str),
    /// Any non-empty string.
    NonEmpty,
}

/// Expected shape of a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// An object with a closed set of fields, checked in order.
    Object(Vec<Field>),
    /// An array of homogeneous items.
    Array {
        /// Shape of each item.
        items: Box<Shape>,
        /// Minimum number of items.
        min_items: usize,
        /// Maximum number of items.
        max_items: Option<usize>,
        /// Items are objects whose value under this key must be unique.
        unique_key: Option<&'static str>,
    },
    /// A string.
    String(StringRule),
    /// A number greater than or equal to 0. Strings are never coerced.
    Number,
    /// An integer greater than or equal to 0.
    Integer,
    /// A boolean.
    Boolean,
    /// Either shape, chosen by the JSON type of the value. The two shapes
    /// must have different JSON types.
    Either(Box<Shape>, Box<Shape>),
    /// A legacy array that must stay empty.
    Unsupported,
}

impl Shape {
    /// Article and JSON type name, for type-mismatch messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Object(_) => "an object",
            Self::Array { .. } | Self::Unsupported => "an array",
            Self::String(_) => "a string",
            Self::Number => "a number",
            Self::Integer => "an integer",
            Self::Boolean => "a boolean",
            Self::Either(..) => "a value",
        }
    }

    /// Returns true if `value` has this shape's JSON type.
    pub fn accepts_type(&self, value: &Value) -> bool {
        match self {
            Self::Object(_) => value.is_object(),
            Self::Array { .. } | Self::Unsupported => value.is_array(),
            Self::String(_) => value.is_string(),
            Self::Number | Self::Integer => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Either(a, b) => a.accepts_type(value) || b.accepts_type(value),
        }
    }
}

/// A named field of an object shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Wire name.
    pub name: &'static str,
    /// Presence constraint.
    pub presence: Presence,
    /// Expected shape when present.
    pub shape: Shape,
}

impl Field {
    fn new(name: &'static str, presence: Presence, shape: Shape) -> Self {
        Self {
            name,
            presence,
            shape,
        }
    }
}

/// The structural rules of one fleet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    /// Fleet-level fields in evaluation order.
    pub fields: Vec<Field>,
    /// The resolved priority constraint.
    pub priority: PriorityRule,
}

/// Build the structural rules for a fleet with the given context.
///
/// Fields are listed in evaluation order: strategy, role, capacity, the
/// flags and mode, launch template groups, legacy specifications, tags.
pub fn build_rules(context: &RuleContext) -> RuleSet {
    let priority = context.priority_rule();
    let fields = vec![
        Field::new(
            "AllocationStrategy",
            Presence::Required,
            Shape::String(StringRule::OneOf(
                AllocationStrategy::all().iter().map(|s| s.as_str()).collect(),
            )),
        ),
        Field::new(
            "IamFleetRole",
            Presence::Required,
            Shape::String(StringRule::Pattern {
                label: "IAM role ARN (arn:aws:iam::<account-id>:role/<role-name>)",
                pattern: IAM_FLEET_ROLE_PATTERN,
                max_length: None,
            }),
        ),
        Field::new("TargetCapacity", Presence::Required, Shape::Number),
        Field::new("ReplaceUnhealthyInstances", Presence::Optional, Shape::Boolean),
        Field::new(
            "TerminateInstancesWithExpiration",
            Presence::Optional,
            Shape::Boolean,
        ),
        Field::new(
            "Type",
            Presence::Optional,
            Shape::String(StringRule::OneOf(
                FleetType::all().iter().map(|t| t.as_str()).collect(),
            )),
        ),
        Field::new(
            "LaunchTemplateConfigs",
            Presence::Required,
            Shape::Array {
                items: Box::new(launch_template_config_shape(context, priority)),
                min_items: 1,
                max_items: None,
                unique_key: None,
            },
        ),
        Field::new("LaunchSpecifications", Presence::Optional, Shape::Unsupported),
        Field::new(
            "TagSpecifications",
            Presence::Optional,
            Shape::Array {
                items: Box::new(tag_specification_shape()),
                min_items: 0,
                max_items: Some(MAX_TAG_SPECIFICATIONS),
                unique_key: None,
            },
        ),
    ];
    RuleSet { fields, priority }
}

fn launch_template_config_shape(context: &RuleContext, priority: PriorityRule) -> Shape {
    Shape::Object(vec![
        Field::new(
            "LaunchTemplateSpecification",
            Presence::Required,
            Shape::Object(vec![
                Field::new(
                    "LaunchTemplateId",
                    Presence::Required,
                    Shape::String(StringRule::Pattern {
                        label: "launch template id (lt- followed by 17 characters)",
                        pattern: LAUNCH_TEMPLATE_ID_PATTERN,
                        max_length: None,
                    }),
                ),
                Field::new(
                    "Version",
                    Presence::Required,
                    Shape::String(StringRule::NonEmpty),
                ),
            ]),
        ),
        Field::new(
            "Overrides",
            Presence::Required,
            Shape::Array {
                items: Box::new(override_shape(context, priority)),
                min_items: 1,
                max_items: None,
                unique_key: None,
            },
        ),
    ])
}

fn override_shape(context: &RuleContext, priority: PriorityRule) -> Shape {
    let subnet_id = || {
        Shape::String(StringRule::Pattern {
            label: "subnet id (subnet- followed by 17 characters)",
            pattern: SUBNET_ID_PATTERN,
            max_length: None,
        })
    };
    let strategy = context
        .allocation_strategy
        .map(|s| s.as_str())
        .unwrap_or_default();
    let priority_presence = match priority {
        PriorityRule::Required => {
            Presence::RequiredWhen(format!("AllocationStrategy is {strategy}"))
        }
        PriorityRule::Forbidden => {
            Presence::ForbiddenWhen(format!("AllocationStrategy is {strategy}"))
        }
        PriorityRule::Unconstrained => Presence::Optional,
    };
    Shape::Object(vec![
        Field::new(
            "InstanceType",
            Presence::Required,
            Shape::String(StringRule::Member {
                label: "instance type",
                values: INSTANCE_TYPES,
            }),
        ),
        Field::new(
            "SubnetId",
            Presence::Required,
            Shape::Either(
                Box::new(subnet_id()),
                Box::new(Shape::Array {
                    items: Box::new(subnet_id()),
                    min_items: 1,
                    max_items: None,
                    unique_key: None,
                }),
            ),
        ),
        Field::new("Priority", priority_presence, Shape::Integer),
        Field::new(
            "WeightedCapacity",
            Presence::Advisory("is not set; the weight will not be populated"),
            Shape::Number,
        ),
    ])
}

fn tag_specification_shape() -> Shape {
    Shape::Object(vec![
        Field::new(
            "ResourceType",
            Presence::Required,
            Shape::String(StringRule::Const(TAG_RESOURCE_TYPE)),
        ),
        Field::new(
            "Tags",
            Presence::Optional,
            Shape::Array {
                items: Box::new(Shape::Object(vec![
                    Field::new(
                        "Key",
                        Presence::Required,
                        Shape::String(StringRule::Pattern {
                            label: "tag key",
                            pattern: TAG_TEXT_PATTERN,
                            max_length: Some(MAX_TAG_KEY_LENGTH),
                        }),
                    ),
                    Field::new(
                        "Value",
                        Presence::Required,
                        Shape::String(StringRule::Pattern {
                            label: "tag value",
                            pattern: TAG_TEXT_PATTERN,
                            max_length: Some(MAX_TAG_VALUE_LENGTH),
                        }),
                    ),
                ])),
                min_items: 0,
                max_items: None,
                unique_key: Some("Key"),
            },
        ),
    ])
}
