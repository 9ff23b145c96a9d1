//! # Fleet Document Model
//!
//! Typed representation of a fleet configuration document. Field names on
//! the wire are PascalCase, matching the spot-fleet request format the
//! documents are exchanged in.
//!
//! A [`FleetDocument`] is an ordered mapping from fleet name to
//! [`FleetSpec`]. Fleet names are unique by construction; renaming checks
//! for collisions explicitly because it is a remove-then-insert on the
//! underlying mapping.
//!
//! The typed model is permissive about *values* (an empty role string, an
//! unselected strategy) so that a half-edited fleet from the guided form
//! can be represented. Whether a document is acceptable is decided by the
//! schema crate, never by deserialization.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::catalog::{
    self, AllocationStrategy, FleetType, DEFAULT_FLEET_NAME_PREFIX,
};
use crate::error::SfmtError;

/// Ordered mapping from fleet name to fleet specification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetDocument {
    fleets: Vec<(String, FleetSpec)>,
}

impl FleetDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from a JSON value.
    pub fn from_value(value: Value) -> Result<Self, SfmtError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize the document to a JSON value, preserving fleet order.
    pub fn to_value(&self) -> Result<Value, SfmtError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Number of fleets.
    pub fn len(&self) -> usize {
        self.fleets.len()
    }

    /// Returns true if the document has no fleets.
    pub fn is_empty(&self) -> bool {
        self.fleets.is_empty()
    }

    /// Returns true if a fleet with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Look up a fleet by name.
    pub fn get(&self, name: &str) -> Option<&FleetSpec> {
        self.fleets
            .iter()
            .find(|(fleet, _)| fleet == name)
            .map(|(_, spec)| spec)
    }

    /// Look up a fleet by name for editing.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FleetSpec> {
        self.fleets
            .iter_mut()
            .find(|(fleet, _)| fleet == name)
            .map(|(_, spec)| spec)
    }

    /// Iterate fleets in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FleetSpec)> {
        self.fleets.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Fleet names in document order.
    pub fn names(&self) -> Vec<&str> {
        self.fleets.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Insert or replace a fleet. A replaced fleet keeps its position and
    /// the previous specification is returned.
    pub fn insert(&mut self, name: impl Into<String>, spec: FleetSpec) -> Option<FleetSpec> {
        let name = name.into();
        match self.position(&name) {
            Some(index) => Some(std::mem::replace(&mut self.fleets[index].1, spec)),
            None => {
                self.fleets.push((name, spec));
                None
            }
        }
    }

    /// Remove a fleet, returning its specification.
    pub fn remove_fleet(&mut self, name: &str) -> Option<FleetSpec> {
        let index = self.position(name)?;
        Some(self.fleets.remove(index).1)
    }

    /// Append a default fleet under the first free `fleet_<n>` name and
    /// return that name.
    pub fn add_fleet(&mut self) -> String {
        let mut index = 0usize;
        let name = loop {
            let candidate = format!("{DEFAULT_FLEET_NAME_PREFIX}{index}");
            if !self.contains(&candidate) {
                break candidate;
            }
            index += 1;
        };
        self.fleets.push((name.clone(), FleetSpec::default()));
        name
    }

    /// Rename a fleet in place, keeping its position in the document.
    ///
    /// # Errors
    ///
    /// - [`SfmtError::InvalidFleetName`] if `new_name` does not match the
    ///   fleet-name pattern.
    /// - [`SfmtError::FleetNotFound`] if `old_name` does not exist.
    /// - [`SfmtError::FleetNameTaken`] if `new_name` belongs to a different fleet.
    pub fn rename_fleet(&mut self, old_name: &str, new_name: &str) -> Result<(), SfmtError> {
        if !catalog::is_fleet_name(new_name) {
            return Err(SfmtError::InvalidFleetName(new_name.to_string()));
        }
        let index = self
            .position(old_name)
            .ok_or_else(|| SfmtError::FleetNotFound(old_name.to_string()))?;
        if old_name != new_name && self.contains(new_name) {
            return Err(SfmtError::FleetNameTaken(new_name.to_string()));
        }
        self.fleets[index].0 = new_name.to_string();
        Ok(())
    }

    /// Every subnet id referenced anywhere in the document, first-seen order.
    pub fn network_segments(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = Vec::new();
        for (_, spec) in &self.fleets {
            for config in &spec.launch_template_configs {
                for entry in &config.overrides {
                    for id in entry.subnet_id.ids() {
                        if !segments.contains(&id.as_str()) {
                            segments.push(id);
                        }
                    }
                }
            }
        }
        segments
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fleets.iter().position(|(fleet, _)| fleet == name)
    }
}

/// Rename a fleet in a raw document, keeping its position. Every fleet is
/// carried over as written, including fields the typed model does not
/// represent.
///
/// # Errors
///
/// The same as [`FleetDocument::rename_fleet`].
pub fn rename_fleet_entry(
    document: &mut Map<String, Value>,
    old_name: &str,
    new_name: &str,
) -> Result<(), SfmtError> {
    if !catalog::is_fleet_name(new_name) {
        return Err(SfmtError::InvalidFleetName(new_name.to_string()));
    }
    if !document.contains_key(old_name) {
        return Err(SfmtError::FleetNotFound(old_name.to_string()));
    }
    if old_name == new_name {
        return Ok(());
    }
    if document.contains_key(new_name) {
        return Err(SfmtError::FleetNameTaken(new_name.to_string()));
    }
    *document = std::mem::take(document)
        .into_iter()
        .map(|(name, fleet)| {
            if name == old_name {
                (new_name.to_string(), fleet)
            } else {
                (name, fleet)
            }
        })
        .collect();
    Ok(())
}

impl Serialize for FleetDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fleets.iter().map(|(name, spec)| (name, spec)))
    }
}

impl<'de> Deserialize<'de> for FleetDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = FleetDocument;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by fleet name")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FleetDocument, A::Error> {
                let mut document = FleetDocument::new();
                while let Some((name, spec)) = map.next_entry::<String, FleetSpec>()? {
                    document.insert(name, spec);
                }
                Ok(document)
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

/// One named compute-capacity request.
///
/// Fields serialize in alphabetical order, which is the canonical field
/// order of normalized documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FleetSpec {
    /// Capacity allocation policy. `None` while the operator has not chosen one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_strategy: Option<AllocationStrategy>,
    /// ARN of the service role the fleet runs under.
    #[serde(default)]
    pub iam_fleet_role: String,
    /// Legacy launch specifications. Must stay empty.
    #[serde(default)]
    pub launch_specifications: Vec<Value>,
    /// Launch template groups, in authored order.
    #[serde(default)]
    pub launch_template_configs: Vec<LaunchTemplateConfig>,
    /// Replace instances that fail health checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_unhealthy_instances: Option<bool>,
    /// At most one tag specification.
    #[serde(default)]
    pub tag_specifications: Vec<TagSpecification>,
    /// Requested capacity. Kept as a JSON number so integers stay integers.
    pub target_capacity: Number,
    /// Terminate running instances when the request expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminate_instances_with_expiration: Option<bool>,
    /// Request mode.
    #[serde(default, rename = "Type", skip_serializing_if = "Option::is_none")]
    pub fleet_type: Option<FleetType>,
}

impl Default for FleetSpec {
    /// The fleet the guided form starts from when a fleet is added.
    fn default() -> Self {
        Self {
            allocation_strategy: None,
            iam_fleet_role: String::new(),
            launch_specifications: Vec::new(),
            launch_template_configs: Vec::new(),
            replace_unhealthy_instances: Some(true),
            tag_specifications: Vec::new(),
            target_capacity: Number::from(1u64),
            terminate_instances_with_expiration: Some(true),
            fleet_type: Some(FleetType::Maintain),
        }
    }
}

impl FleetSpec {
    /// Returns true if the fleet uses the priority-ordered strategy.
    pub fn is_prioritized(&self) -> bool {
        self.allocation_strategy
            .is_some_and(|strategy| strategy.is_prioritized())
    }

    /// Iterate every override of every launch template group.
    pub fn overrides(&self) -> impl Iterator<Item = &Override> {
        self.launch_template_configs
            .iter()
            .flat_map(|config| config.overrides.iter())
    }
}

/// A launch template reference with the placement overrides it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchTemplateConfig {
    /// The launch template used by every override in this group.
    pub launch_template_specification: LaunchTemplateSpecification,
    /// Placement options, in authored order.
    #[serde(default)]
    pub overrides: Vec<Override>,
}

/// Reference to a launch template and version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchTemplateSpecification {
    /// Launch template id (`lt-` followed by 17 alphanumerics).
    pub launch_template_id: String,
    /// Template version, e.g. `"1"` or `"$Latest"`.
    pub version: String,
}

/// One placement option: an instance type in one or more subnets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Override {
    /// Instance type (resource class).
    pub instance_type: String,
    /// Subnet(s). A single id in flattened form, a list in grouped form.
    pub subnet_id: SubnetSelection,
    /// Launch priority. Present only under the prioritized strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u64>,
    /// Capacity units contributed by one instance of this override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_capacity: Option<Number>,
}

impl Override {
    /// A flattened override without priority or weight.
    pub fn new(instance_type: impl Into<String>, subnet_id: impl Into<String>) -> Self {
        Self {
            instance_type: instance_type.into(),
            subnet_id: SubnetSelection::One(subnet_id.into()),
            priority: None,
            weighted_capacity: None,
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: u64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the weighted capacity.
    pub fn with_weight(mut self, weight: impl Into<Number>) -> Self {
        self.weighted_capacity = Some(weight.into());
        self
    }
}

/// The `SubnetId` of an override: one id (flattened) or several (grouped).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubnetSelection {
    /// A single subnet id.
    One(String),
    /// Several subnet ids sharing the same instance type, priority and weight.
    Many(Vec<String>),
}

impl SubnetSelection {
    /// The selected subnet ids, in order.
    pub fn ids(&self) -> &[String] {
        match self {
            Self::One(id) => std::slice::from_ref(id),
            Self::Many(ids) => ids,
        }
    }

    /// Returns true if this is the grouped (list) form.
    pub fn is_grouped(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

/// Tags applied to the fleet request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagSpecification {
    /// Always `spot-fleet-request`.
    pub resource_type: String,
    /// Tags with unique keys, in authored order.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// A key/value tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

impl Tag {
    /// Construct a tag.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
