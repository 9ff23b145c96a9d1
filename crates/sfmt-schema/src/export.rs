//! # JSON Schema Export
//!
//! Translates the structural rule set into Draft 2020-12 JSON Schema.
//!
//! - [`fleet_schema`] is the schema of one fleet under a resolved
//!   [`RuleSet`]: a priority that is required sits in `required`, a
//!   forbidden one is the `false` schema. The structural stage compiles it.
//! - [`fleet_document_schema`] is the whole document for other tools
//!   (editors, CI linters). It cannot see each fleet's context up front, so
//!   the priority conditional is an `if`/`then`/`else` on the fleet's
//!   `AllocationStrategy`.
//!
//! Relational rules (priority and weight consistency, duplicates, reserved
//! tags) and tag-key uniqueness have no JSON Schema equivalent and are
//! only enforced by the engine.

use serde_json::{json, Map, Value};
use sfmt_core::catalog::{AllocationStrategy, FLEET_NAME_PATTERN};

use crate::rules::{build_rules, Field, Presence, RuleContext, RuleSet, Shape, StringRule};

/// `$id` of the exported schema.
pub const FLEET_DOCUMENT_SCHEMA_ID: &str = "https://schemas.trackit.io/sfmt/fleet-document.schema.json";

/// The schema of one fleet under `rules`.
pub fn fleet_schema(rules: &RuleSet) -> Value {
    object_schema(&rules.fields)
}

/// The fleet document schema.
pub fn fleet_document_schema() -> Value {
    let mut fleet = fleet_schema(&build_rules(&RuleContext::default()));
    if let Value::Object(map) = &mut fleet {
        map.insert("allOf".to_string(), json!([priority_conditional()]));
    }
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": FLEET_DOCUMENT_SCHEMA_ID,
        "title": "Spot fleet configuration document",
        "description": "Mapping from fleet name to spot-fleet request configuration.",
        "type": "object",
        "propertyNames": { "pattern": FLEET_NAME_PATTERN },
        "additionalProperties": { "$ref": "#/$defs/fleet" },
        "$defs": { "fleet": fleet }
    })
}

fn priority_conditional() -> Value {
    let on_overrides = |constraint: Value| {
        json!({
            "properties": {
                "LaunchTemplateConfigs": {
                    "items": {
                        "properties": {
                            "Overrides": { "items": constraint }
                        }
                    }
                }
            }
        })
    };
    json!({
        "if": {
            "properties": {
                "AllocationStrategy": {
                    "const": AllocationStrategy::CapacityOptimizedPrioritized.as_str()
                }
            },
            "required": ["AllocationStrategy"]
        },
        "then": on_overrides(json!({ "required": ["Priority"] })),
        "else": on_overrides(json!({ "not": { "required": ["Priority"] } }))
    })
}

fn object_schema(fields: &[Field]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in fields {
        let mut schema = shape_schema(&field.shape);
        match field.presence {
            Presence::Required | Presence::RequiredWhen(_) => required.push(Value::from(field.name)),
            Presence::Advisory(_) => allow_null(&mut schema),
            Presence::ForbiddenWhen(_) => schema = Value::Bool(false),
            Presence::Optional => {}
        }
        properties.insert(field.name.to_string(), schema);
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

fn shape_schema(shape: &Shape) -> Value {
    match shape {
        Shape::Object(fields) => object_schema(fields),
        Shape::Array {
            items,
            min_items,
            max_items,
            unique_key: _,
        } => {
            let mut schema = json!({
                "type": "array",
                "items": shape_schema(items),
            });
            if *min_items > 0 {
                schema["minItems"] = json!(min_items);
            }
            if let Some(max) = max_items {
                schema["maxItems"] = json!(max);
            }
            schema
        }
        Shape::String(rule) => string_schema(rule),
        Shape::Number => json!({ "type": "number", "minimum": 0 }),
        Shape::Integer => json!({ "type": "integer", "minimum": 0 }),
        Shape::Boolean => json!({ "type": "boolean" }),
        Shape::Either(first, second) => either_schema(first, second),
        Shape::Unsupported => json!({ "type": "array", "maxItems": 0 }),
    }
}

/// Both shapes in one schema: `type` lists both JSON types, and every other
/// keyword only applies to values of its own type.
fn either_schema(first: &Shape, second: &Shape) -> Value {
    let mut types = Vec::new();
    let mut keywords = Map::new();
    for part in [shape_schema(first), shape_schema(second)] {
        let Value::Object(map) = part else {
            continue;
        };
        for (keyword, value) in map {
            if keyword == "type" {
                types.push(value);
            } else {
                keywords.insert(keyword, value);
            }
        }
    }
    let mut schema = Map::new();
    schema.insert("type".to_string(), Value::Array(types));
    schema.extend(keywords);
    Value::Object(schema)
}

fn string_schema(rule: &StringRule) -> Value {
    match rule {
        StringRule::OneOf(values) => json!({ "type": "string", "enum": values }),
        StringRule::Member { values, .. } => json!({ "type": "string", "enum": values }),
        StringRule::Pattern {
            pattern,
            max_length,
            ..
        } => {
            let mut schema = json!({ "type": "string", "pattern": pattern });
            if let Some(max) = max_length {
                schema["maxLength"] = json!(max);
            }
            schema
        }
        StringRule::Const(value) => json!({ "type": "string", "const": value }),
        StringRule::NonEmpty => json!({ "type": "string", "minLength": 1 }),
    }
}

fn allow_null(schema: &mut Value) {
    if let Some(Value::String(kind)) = schema.get("type").cloned() {
        schema["type"] = json!([kind, "null"]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfmt_core::catalog::SUBNET_ID_PATTERN;

    #[test]
    fn test_schema_header() {
        let schema = fleet_document_schema();
        assert_eq!(schema["$schema"], "https://json-schema.org/draft/2020-12/schema");
        assert_eq!(schema["$id"], FLEET_DOCUMENT_SCHEMA_ID);
        assert_eq!(schema["propertyNames"]["pattern"], FLEET_NAME_PATTERN);
    }

    #[test]
    fn test_fleet_definition_is_closed() {
        let schema = fleet_document_schema();
        let fleet = &schema["$defs"]["fleet"];
        assert_eq!(fleet["additionalProperties"], false);
        assert_eq!(
            fleet["required"],
            json!(["AllocationStrategy", "IamFleetRole", "TargetCapacity", "LaunchTemplateConfigs"])
        );
        assert_eq!(fleet["properties"]["LaunchSpecifications"]["maxItems"], 0);
        assert_eq!(fleet["properties"]["TagSpecifications"]["maxItems"], 1);
    }

    #[test]
    fn test_fleet_schema_resolves_priority() {
        let override_schema = |rules: &RuleSet| {
            fleet_schema(rules)["properties"]["LaunchTemplateConfigs"]["items"]["properties"]
                ["Overrides"]["items"]
                .clone()
        };
        let prioritized = build_rules(&RuleContext::from_fleet(
            &json!({"AllocationStrategy": "capacityOptimizedPrioritized"}),
        ));
        let entry = override_schema(&prioritized);
        assert_eq!(entry["required"], json!(["InstanceType", "SubnetId", "Priority"]));

        let lowest = build_rules(&RuleContext::from_fleet(&json!({"AllocationStrategy": "lowestPrice"})));
        let entry = override_schema(&lowest);
        assert_eq!(entry["properties"]["Priority"], json!(false));
        assert_eq!(entry["required"], json!(["InstanceType", "SubnetId"]));
    }

    #[test]
    fn test_subnet_accepts_string_or_list_in_one_schema() {
        let schema = fleet_document_schema();
        let subnet = &schema["$defs"]["fleet"]["properties"]["LaunchTemplateConfigs"]["items"]
            ["properties"]["Overrides"]["items"]["properties"]["SubnetId"];
        assert_eq!(subnet["type"], json!(["string", "array"]));
        assert_eq!(subnet["pattern"], SUBNET_ID_PATTERN);
        assert_eq!(subnet["minItems"], 1);
        assert!(subnet.get("oneOf").is_none());
    }

    #[test]
    fn test_weight_allows_null() {
        let schema = fleet_document_schema();
        let entry = &schema["$defs"]["fleet"]["properties"]["LaunchTemplateConfigs"]["items"]
            ["properties"]["Overrides"]["items"];
        assert_eq!(
            entry["properties"]["WeightedCapacity"]["type"],
            json!(["number", "null"])
        );
        assert_eq!(entry["required"], json!(["InstanceType", "SubnetId"]));
    }
}
