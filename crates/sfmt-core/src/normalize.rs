//! # Normalizer
//!
//! Two independent, idempotent transforms:
//!
//! 1. **Grouped ⇄ flattened overrides.** The guided form shows one entry per
//!    instance type with a list of subnets sharing one priority and weight
//!    ([`OverrideGroup`]). The canonical document stores one [`Override`]
//!    per (instance type, subnet) pair. [`flatten_overrides`] and
//!    [`flatten_groups`] go from grouped to flat; [`group_overrides`] goes
//!    back, merging subnets by instance type and keeping the first-seen
//!    priority and weight.
//!
//! 2. **Mandatory tag injection.** [`inject_mandatory_tag`] guarantees the
//!    fixed tag is present exactly once without reordering existing tags.
//!
//! ## Round-trip Law
//!
//! For any overrides `x` that pass the consistency checker,
//! `flatten(group(flatten(x)))` and `flatten(x)` contain the same
//! (instance type, subnet) pairs with the same priorities and weights.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::catalog::{MANDATORY_TAG_KEY, MANDATORY_TAG_VALUE, TAG_RESOURCE_TYPE};
use crate::model::{
    FleetSpec, LaunchTemplateSpecification, Override, SubnetSelection, Tag, TagSpecification,
};

/// Overrides of one instance type merged across subnets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OverrideGroup {
    /// Instance type shared by every subnet in the group.
    pub instance_type: String,
    /// Subnets, first-seen order, without repeats.
    #[serde(rename = "SubnetId")]
    pub subnet_ids: Vec<String>,
    /// Priority shared by the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u64>,
    /// Weighted capacity shared by the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_capacity: Option<Number>,
}

impl OverrideGroup {
    /// The grouped wire form: one override whose `SubnetId` is a list.
    pub fn to_override(&self) -> Override {
        Override {
            instance_type: self.instance_type.clone(),
            subnet_id: SubnetSelection::Many(self.subnet_ids.clone()),
            priority: self.priority,
            weighted_capacity: self.weighted_capacity.clone(),
        }
    }

    /// One flattened override per subnet.
    pub fn flatten(&self) -> Vec<Override> {
        self.subnet_ids
            .iter()
            .map(|id| Override {
                instance_type: self.instance_type.clone(),
                subnet_id: SubnetSelection::One(id.clone()),
                priority: self.priority,
                weighted_capacity: self.weighted_capacity.clone(),
            })
            .collect()
    }
}

/// A launch template group as the guided form presents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupedLaunchTemplateConfig {
    /// The group's launch template.
    pub launch_template_specification: LaunchTemplateSpecification,
    /// Overrides merged by instance type.
    pub overrides: Vec<OverrideGroup>,
}

/// Grouped → flattened: one override per (instance type, subnet).
pub fn flatten_groups(groups: &[OverrideGroup]) -> Vec<Override> {
    groups.iter().flat_map(OverrideGroup::flatten).collect()
}

/// Flatten overrides that may use the grouped `SubnetId` list form.
/// Already-flat overrides pass through unchanged.
pub fn flatten_overrides(overrides: &[Override]) -> Vec<Override> {
    overrides
        .iter()
        .flat_map(|entry| {
            entry.subnet_id.ids().iter().map(move |id| Override {
                instance_type: entry.instance_type.clone(),
                subnet_id: SubnetSelection::One(id.clone()),
                priority: entry.priority,
                weighted_capacity: entry.weighted_capacity.clone(),
            })
        })
        .collect()
}

/// Flattened → grouped: merge subnets by instance type, in first-seen
/// order. Priority and weight come from the first override seen for each
/// instance type.
pub fn group_overrides(overrides: &[Override]) -> Vec<OverrideGroup> {
    let mut groups: Vec<OverrideGroup> = Vec::new();
    for entry in overrides {
        let index = match groups
            .iter()
            .position(|group| group.instance_type == entry.instance_type)
        {
            Some(index) => index,
            None => {
                groups.push(OverrideGroup {
                    instance_type: entry.instance_type.clone(),
                    subnet_ids: Vec::new(),
                    priority: entry.priority,
                    weighted_capacity: entry.weighted_capacity.clone(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        for id in entry.subnet_id.ids() {
            if !group.subnet_ids.contains(id) {
                group.subnet_ids.push(id.clone());
            }
        }
    }
    groups
}

/// The guided-form view of a fleet: each launch template group with its
/// overrides grouped by instance type.
pub fn group_fleet(spec: &FleetSpec) -> Vec<GroupedLaunchTemplateConfig> {
    spec.launch_template_configs
        .iter()
        .map(|config| GroupedLaunchTemplateConfig {
            launch_template_specification: config.launch_template_specification.clone(),
            overrides: group_overrides(&config.overrides),
        })
        .collect()
}

/// Return a copy of `spec` carrying the mandatory tag.
pub fn inject_mandatory_tag(spec: &FleetSpec) -> FleetSpec {
    let mut out = spec.clone();
    inject_mandatory_tag_in_place(&mut out);
    out
}

/// In-place variant of [`inject_mandatory_tag`] for hosts that opt into
/// mutating their working copy.
///
/// - No tag specification: one is created holding only the mandatory tag.
/// - Mandatory key present with another value: the value is repaired where
///   it stands.
/// - Mandatory key absent: the tag is appended after the existing tags.
pub fn inject_mandatory_tag_in_place(spec: &mut FleetSpec) {
    if spec.tag_specifications.is_empty() {
        spec.tag_specifications.push(TagSpecification {
            resource_type: TAG_RESOURCE_TYPE.to_string(),
            tags: vec![Tag::new(MANDATORY_TAG_KEY, MANDATORY_TAG_VALUE)],
        });
        return;
    }
    let tag_spec = &mut spec.tag_specifications[0];
    match tag_spec.tags.iter_mut().find(|tag| tag.key == MANDATORY_TAG_KEY) {
        Some(tag) => {
            if tag.value != MANDATORY_TAG_VALUE {
                tag.value = MANDATORY_TAG_VALUE.to_string();
            }
        }
        None => tag_spec
            .tags
            .push(Tag::new(MANDATORY_TAG_KEY, MANDATORY_TAG_VALUE)),
    }
}

/// Return a copy of `spec` with every override priority removed when the
/// fleet's strategy does not use priorities. Prioritized fleets are
/// returned unchanged.
pub fn strip_priorities(spec: &FleetSpec) -> FleetSpec {
    let mut out = spec.clone();
    if out.is_prioritized() {
        return out;
    }
    for config in &mut out.launch_template_configs {
        for entry in &mut config.overrides {
            entry.priority = None;
        }
    }
    out
}

/// The canonical form of an accepted fleet: mandatory tag injected and
/// every group's overrides flattened.
pub fn normalize_fleet(spec: &FleetSpec) -> FleetSpec {
    let mut out = inject_mandatory_tag(spec);
    for config in &mut out.launch_template_configs {
        config.overrides = flatten_overrides(&config.overrides);
    }
    out
}
