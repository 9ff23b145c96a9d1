//! # Cross-Entity Consistency Checker
//!
//! Relational rules that span several entries of one fleet:
//!
//! - **Priority consistency.** All overrides of one instance type carry
//!   the same priority. One violation per conflicting instance type.
//! - **Weight consistency.** Within one launch template group, all
//!   overrides of one instance type carry the same weighted capacity (or
//!   all leave it unset). One violation per conflicting instance type and
//!   group. Grouping merges such overrides into one entry, so a conflict
//!   would be lost on the way back.
//! - **Duplicate pairs.** Each (instance type, subnet) pair appears once
//!   across the fleet's flattened overrides. One violation per duplicated
//!   pair, at its second occurrence.
//! - **Duplicate groups.** No two launch template groups have the same
//!   template reference and the same override sequence. One violation per
//!   later duplicate, wherever it sits in the group list. Pairs inside a
//!   duplicated group are not reported again.
//! - **Reserved tags.** Tag keys with the reserved prefix are rejected.
//!
//! The checker runs on typed [`FleetSpec`]s, so it only sees fleets that
//! already passed the structural stage.

use serde_json::{Number, Value};
use sfmt_core::catalog::{self, RESERVED_TAG_PREFIX};
use sfmt_core::{FleetSpec, LogicalPath, SubnetSelection};

use crate::violation::Violation;

/// Check the relational rules of one fleet, appending violations to `out`.
pub fn check_consistency(path: &LogicalPath, spec: &FleetSpec, out: &mut Vec<Violation>) {
    let duplicate_groups = duplicate_group_indices(spec);
    check_priority_consistency(path, spec, out);
    check_weight_consistency(path, spec, out);
    check_duplicate_pairs(path, spec, &duplicate_groups, out);
    for (index, first) in &duplicate_groups {
        out.push(Violation::relational(
            path.key("LaunchTemplateConfigs").index(*index),
            format!(
                "duplicates launch template group item {}: same template and overrides",
                first + 1
            ),
            None,
        ));
    }
    check_reserved_tags(path, spec, out);
}

/// `(index, first)` for every group equal to an earlier group `first`.
fn duplicate_group_indices(spec: &FleetSpec) -> Vec<(usize, usize)> {
    let configs = &spec.launch_template_configs;
    configs
        .iter()
        .enumerate()
        .filter_map(|(index, config)| {
            configs[..index]
                .iter()
                .position(|earlier| earlier == config)
                .map(|first| (index, first))
        })
        .collect()
}

fn check_priority_consistency(path: &LogicalPath, spec: &FleetSpec, out: &mut Vec<Violation>) {
    struct Seen<'a> {
        instance_type: &'a str,
        priorities: Vec<u64>,
        conflict_at: Option<LogicalPath>,
    }

    let mut seen: Vec<Seen<'_>> = Vec::new();
    for (group, config) in spec.launch_template_configs.iter().enumerate() {
        for (index, entry) in config.overrides.iter().enumerate() {
            let Some(priority) = entry.priority else {
                continue;
            };
            let slot = match seen.iter().position(|s| s.instance_type == entry.instance_type) {
                Some(slot) => slot,
                None => {
                    seen.push(Seen {
                        instance_type: &entry.instance_type,
                        priorities: Vec::new(),
                        conflict_at: None,
                    });
                    seen.len() - 1
                }
            };
            let record = &mut seen[slot];
            if record.priorities.contains(&priority) {
                continue;
            }
            if !record.priorities.is_empty() && record.conflict_at.is_none() {
                record.conflict_at = Some(
                    path.key("LaunchTemplateConfigs")
                        .index(group)
                        .key("Overrides")
                        .index(index)
                        .key("Priority"),
                );
            }
            record.priorities.push(priority);
        }
    }

    for record in seen {
        let Some(conflict_at) = record.conflict_at else {
            continue;
        };
        let listed: Vec<String> = record.priorities.iter().map(u64::to_string).collect();
        out.push(Violation::relational(
            conflict_at,
            format!(
                "instance type {:?} has conflicting priorities {}: every override of one instance type must share its priority",
                record.instance_type,
                listed.join(", ")
            ),
            Some(Value::from(record.priorities)),
        ));
    }
}

fn check_weight_consistency(path: &LogicalPath, spec: &FleetSpec, out: &mut Vec<Violation>) {
    for (group, config) in spec.launch_template_configs.iter().enumerate() {
        let mut seen: Vec<(&str, Vec<Option<&Number>>, Option<usize>)> = Vec::new();
        for (index, entry) in config.overrides.iter().enumerate() {
            let weight = entry.weighted_capacity.as_ref();
            let slot = match seen.iter().position(|(t, _, _)| *t == entry.instance_type) {
                Some(slot) => slot,
                None => {
                    seen.push((&entry.instance_type, Vec::new(), None));
                    seen.len() - 1
                }
            };
            let (_, weights, conflict_at) = &mut seen[slot];
            if weights.contains(&weight) {
                continue;
            }
            if !weights.is_empty() && conflict_at.is_none() {
                *conflict_at = Some(index);
            }
            weights.push(weight);
        }

        for (instance_type, weights, conflict_at) in seen {
            let Some(index) = conflict_at else {
                continue;
            };
            let listed: Vec<String> = weights
                .iter()
                .map(|w| w.map_or_else(|| "unset".to_string(), Number::to_string))
                .collect();
            let values: Vec<Value> = weights
                .iter()
                .map(|w| w.map_or(Value::Null, |n| Value::Number(n.clone())))
                .collect();
            out.push(Violation::relational(
                path.key("LaunchTemplateConfigs")
                    .index(group)
                    .key("Overrides")
                    .index(index)
                    .key("WeightedCapacity"),
                format!(
                    "instance type {instance_type:?} has conflicting weights {} in this group: every override of one instance type must share its weight",
                    listed.join(", ")
                ),
                Some(Value::Array(values)),
            ));
        }
    }
}

fn check_duplicate_pairs(
    path: &LogicalPath,
    spec: &FleetSpec,
    duplicate_groups: &[(usize, usize)],
    out: &mut Vec<Violation>,
) {
    let mut seen: Vec<(&str, &str)> = Vec::new();
    let mut reported: Vec<(&str, &str)> = Vec::new();
    for (group, config) in spec.launch_template_configs.iter().enumerate() {
        if duplicate_groups.iter().any(|(index, _)| *index == group) {
            continue;
        }
        for (index, entry) in config.overrides.iter().enumerate() {
            let subnet_path = path
                .key("LaunchTemplateConfigs")
                .index(group)
                .key("Overrides")
                .index(index)
                .key("SubnetId");
            for (position, subnet) in entry.subnet_id.ids().iter().enumerate() {
                let pair = (entry.instance_type.as_str(), subnet.as_str());
                if !seen.contains(&pair) {
                    seen.push(pair);
                    continue;
                }
                if reported.contains(&pair) {
                    continue;
                }
                reported.push(pair);
                let at = match &entry.subnet_id {
                    SubnetSelection::One(_) => subnet_path.clone(),
                    SubnetSelection::Many(_) => subnet_path.index(position),
                };
                out.push(Violation::relational(
                    at,
                    format!(
                        "duplicates instance type {:?} in subnet {:?}: each pair may appear only once",
                        pair.0, pair.1
                    ),
                    Some(Value::String(subnet.clone())),
                ));
            }
        }
    }
}

fn check_reserved_tags(path: &LogicalPath, spec: &FleetSpec, out: &mut Vec<Violation>) {
    for (spec_index, tag_spec) in spec.tag_specifications.iter().enumerate() {
        for (index, tag) in tag_spec.tags.iter().enumerate() {
            if catalog::has_reserved_prefix(&tag.key) {
                out.push(Violation::relational(
                    path.key("TagSpecifications")
                        .index(spec_index)
                        .key("Tags")
                        .index(index)
                        .key("Key"),
                    format!(
                        "uses the reserved {RESERVED_TAG_PREFIX:?} prefix: system tags cannot be added or modified"
                    ),
                    Some(Value::String(tag.key.clone())),
                ));
            }
        }
    }
}
