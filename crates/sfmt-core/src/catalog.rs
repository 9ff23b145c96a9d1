//! # Rule Catalog: Permitted Values and Identifier Patterns
//!
//! Static enumerations of every value the engine permits: allocation
//! strategies, fleet types, instance types, and the patterns that fleet
//! names, service roles, launch template ids, subnet ids and tags must
//! match. Nothing in this module is mutable; it is shared freely across
//! concurrent validations.
//!
//! ## Invariant
//!
//! Each enum's `as_str()` output is exactly its wire representation, and
//! `FromStr` accepts exactly the strings `as_str()` produces (case-sensitive).

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Fixed resource type of the single permitted tag specification.
pub const TAG_RESOURCE_TYPE: &str = "spot-fleet-request";

/// Tag keys starting with this prefix are system-managed and not editable.
pub const RESERVED_TAG_PREFIX: &str = "aws:";

/// Key of the tag the engine guarantees on every fleet after normalization.
pub const MANDATORY_TAG_KEY: &str = "DeadlineTrackedAWSResource";

/// Value of the mandatory tag.
pub const MANDATORY_TAG_VALUE: &str = "SpotEventPlugin";

/// Maximum length of a tag key, in characters.
pub const MAX_TAG_KEY_LENGTH: usize = 128;

/// Maximum length of a tag value, in characters.
pub const MAX_TAG_VALUE_LENGTH: usize = 256;

/// Maximum number of tag specifications on a fleet.
pub const MAX_TAG_SPECIFICATIONS: usize = 1;

/// Prefix used when generating names for new fleets (`fleet_0`, `fleet_1`, ...).
pub const DEFAULT_FLEET_NAME_PREFIX: &str = "fleet_";

/// Launch template version assumed by the guided form.
pub const DEFAULT_LAUNCH_TEMPLATE_VERSION: &str = "$Latest";

/// Pattern a fleet name (document key) must match.
pub const FLEET_NAME_PATTERN: &str = r"^[A-Za-z0-9_-]+$";

/// Pattern the `IamFleetRole` ARN must match. The account id is twelve
/// ASCII digits.
pub const IAM_FLEET_ROLE_PATTERN: &str = r"^arn:aws:iam::[0-9]{12}:role/[a-zA-Z0-9_-]+$";

/// Pattern a launch template id must match.
pub const LAUNCH_TEMPLATE_ID_PATTERN: &str = r"^lt-[a-zA-Z0-9]{17}$";

/// Pattern a subnet id must match.
pub const SUBNET_ID_PATTERN: &str = r"^subnet-[a-zA-Z0-9]{17}$";

/// Pattern tag keys and values must match. Word characters are ASCII only.
pub const TAG_TEXT_PATTERN: &str = r"^[A-Za-z0-9_\s+=:.@/-]+$";

static FLEET_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FLEET_NAME_PATTERN).expect("fleet name pattern compiles"));
static IAM_FLEET_ROLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(IAM_FLEET_ROLE_PATTERN).expect("role pattern compiles"));
static LAUNCH_TEMPLATE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(LAUNCH_TEMPLATE_ID_PATTERN).expect("launch template pattern compiles")
});
static SUBNET_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SUBNET_ID_PATTERN).expect("subnet pattern compiles"));
static TAG_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TAG_TEXT_PATTERN).expect("tag pattern compiles"));

/// Returns true if `name` is a valid fleet name.
pub fn is_fleet_name(name: &str) -> bool {
    FLEET_NAME_RE.is_match(name)
}

/// Returns true if `role` is a well-formed IAM fleet role ARN.
pub fn is_iam_fleet_role(role: &str) -> bool {
    IAM_FLEET_ROLE_RE.is_match(role)
}

/// Returns true if `id` is a well-formed launch template id.
pub fn is_launch_template_id(id: &str) -> bool {
    LAUNCH_TEMPLATE_ID_RE.is_match(id)
}

/// Returns true if `id` is a well-formed subnet id.
pub fn is_subnet_id(id: &str) -> bool {
    SUBNET_ID_RE.is_match(id)
}

/// Returns true if `text` only uses characters permitted in tag keys and values.
pub fn is_tag_text(text: &str) -> bool {
    TAG_TEXT_RE.is_match(text)
}

/// Returns true if `key` starts with the reserved system prefix.
pub fn has_reserved_prefix(key: &str) -> bool {
    key.starts_with(RESERVED_TAG_PREFIX)
}

/// Returns true if `instance_type` is in the supported instance type list.
pub fn is_instance_type(instance_type: &str) -> bool {
    INSTANCE_TYPES.iter().any(|known| *known == instance_type)
}

/// Policy governing how capacity is chosen among a fleet's overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AllocationStrategy {
    /// Launch from the pools with optimal capacity for the instance count.
    CapacityOptimized,
    /// Capacity-optimized, honoring each override's priority as a hint.
    CapacityOptimizedPrioritized,
    /// Spread capacity across all pools.
    Diversified,
    /// Launch from the lowest-priced pools.
    LowestPrice,
}

impl AllocationStrategy {
    /// Returns every allocation strategy in catalog order.
    pub fn all() -> &'static [AllocationStrategy] {
        &[
            Self::CapacityOptimized,
            Self::CapacityOptimizedPrioritized,
            Self::Diversified,
            Self::LowestPrice,
        ]
    }

    /// Returns the wire identifier for this strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CapacityOptimized => "capacityOptimized",
            Self::CapacityOptimizedPrioritized => "capacityOptimizedPrioritized",
            Self::Diversified => "diversified",
            Self::LowestPrice => "lowestPrice",
        }
    }

    /// Returns true for the priority-ordered strategy, the only one under
    /// which overrides carry a `Priority`.
    pub fn is_prioritized(&self) -> bool {
        matches!(self, Self::CapacityOptimizedPrioritized)
    }
}

impl std::fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocationStrategy {
    type Err = UnknownCatalogValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| UnknownCatalogValue::new("allocation strategy", s))
    }
}

/// Fleet request mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FleetType {
    /// Keep the target capacity, replacing interrupted instances.
    Maintain,
    /// Place a one-time request for the target capacity.
    Request,
}

impl FleetType {
    /// Returns every fleet type in catalog order.
    pub fn all() -> &'static [FleetType] {
        &[Self::Maintain, Self::Request]
    }

    /// Returns the wire identifier for this fleet type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maintain => "maintain",
            Self::Request => "request",
        }
    }
}

impl std::fmt::Display for FleetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FleetType {
    type Err = UnknownCatalogValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownCatalogValue::new("fleet type", s))
    }
}

/// A string that is not part of a catalog enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {catalog}: {value:?}")]
pub struct UnknownCatalogValue {
    /// Which enumeration was consulted.
    pub catalog: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownCatalogValue {
    fn new(catalog: &'static str, value: &str) -> Self {
        Self {
            catalog,
            value: value.to_string(),
        }
    }
}

/// Instance types an override may select.
pub const INSTANCE_TYPES: &[&str] = &[
    // General purpose
    "m5.large",
    "m5.xlarge",
    "m5.2xlarge",
    "m5.4xlarge",
    "m5.8xlarge",
    "m5.12xlarge",
    "m5.16xlarge",
    "m5.24xlarge",
    "m5.metal",
    "m5a.large",
    "m5a.xlarge",
    "m5a.2xlarge",
    "m5a.4xlarge",
    "m5a.8xlarge",
    "m5a.12xlarge",
    "m5a.16xlarge",
    "m5a.24xlarge",
    "m6i.large",
    "m6i.xlarge",
    "m6i.2xlarge",
    "m6i.4xlarge",
    "m6i.8xlarge",
    "m6i.12xlarge",
    "m6i.16xlarge",
    "m6i.24xlarge",
    "m6i.32xlarge",
    "m6a.large",
    "m6a.xlarge",
    "m6a.2xlarge",
    "m6a.4xlarge",
    "m6a.8xlarge",
    "m6a.12xlarge",
    "m6a.16xlarge",
    "m6a.24xlarge",
    "m6a.32xlarge",
    "m6a.48xlarge",
    "m7i.large",
    "m7i.xlarge",
    "m7i.2xlarge",
    "m7i.4xlarge",
    "m7i.8xlarge",
    "m7i.12xlarge",
    "m7i.16xlarge",
    "m7i.24xlarge",
    "m7i.48xlarge",
    "t3.medium",
    "t3.large",
    "t3.xlarge",
    "t3.2xlarge",
    // Compute optimized
    "c5.large",
    "c5.xlarge",
    "c5.2xlarge",
    "c5.4xlarge",
    "c5.9xlarge",
    "c5.12xlarge",
    "c5.18xlarge",
    "c5.24xlarge",
    "c5.metal",
    "c5a.large",
    "c5a.xlarge",
    "c5a.2xlarge",
    "c5a.4xlarge",
    "c5a.8xlarge",
    "c5a.12xlarge",
    "c5a.16xlarge",
    "c5a.24xlarge",
    "c5n.large",
    "c5n.xlarge",
    "c5n.2xlarge",
    "c5n.4xlarge",
    "c5n.9xlarge",
    "c5n.18xlarge",
    "c6i.large",
    "c6i.xlarge",
    "c6i.2xlarge",
    "c6i.4xlarge",
    "c6i.8xlarge",
    "c6i.12xlarge",
    "c6i.16xlarge",
    "c6i.24xlarge",
    "c6i.32xlarge",
    "c6a.large",
    "c6a.xlarge",
    "c6a.2xlarge",
    "c6a.4xlarge",
    "c6a.8xlarge",
    "c6a.12xlarge",
    "c6a.16xlarge",
    "c6a.24xlarge",
    "c6a.32xlarge",
    "c6a.48xlarge",
    "c7i.large",
    "c7i.xlarge",
    "c7i.2xlarge",
    "c7i.4xlarge",
    "c7i.8xlarge",
    "c7i.12xlarge",
    "c7i.16xlarge",
    "c7i.24xlarge",
    "c7i.48xlarge",
    // Memory optimized
    "r5.large",
    "r5.xlarge",
    "r5.2xlarge",
    "r5.4xlarge",
    "r5.8xlarge",
    "r5.12xlarge",
    "r5.16xlarge",
    "r5.24xlarge",
    "r5.metal",
    "r5a.large",
    "r5a.xlarge",
    "r5a.2xlarge",
    "r5a.4xlarge",
    "r5a.8xlarge",
    "r5a.12xlarge",
    "r5a.16xlarge",
    "r5a.24xlarge",
    "r6i.large",
    "r6i.xlarge",
    "r6i.2xlarge",
    "r6i.4xlarge",
    "r6i.8xlarge",
    "r6i.12xlarge",
    "r6i.16xlarge",
    "r6i.24xlarge",
    "r6i.32xlarge",
    "r7i.large",
    "r7i.xlarge",
    "r7i.2xlarge",
    "r7i.4xlarge",
    "r7i.8xlarge",
    "r7i.12xlarge",
    "r7i.16xlarge",
    "r7i.24xlarge",
    "r7i.48xlarge",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_strategy_roundtrip() {
        for strategy in AllocationStrategy::all() {
            let parsed: AllocationStrategy = strategy.as_str().parse().unwrap();
            assert_eq!(*strategy, parsed);
            let json = serde_json::to_string(strategy).unwrap();
            assert_eq!(json, format!("\"{}\"", strategy.as_str()));
        }
    }

    #[test]
    fn test_allocation_strategy_rejects_empty_and_case() {
        assert!("".parse::<AllocationStrategy>().is_err());
        assert!("LowestPrice".parse::<AllocationStrategy>().is_err());
    }

    #[test]
    fn test_only_prioritized_strategy_is_prioritized() {
        let prioritized: Vec<_> = AllocationStrategy::all()
            .iter()
            .filter(|s| s.is_prioritized())
            .collect();
        assert_eq!(prioritized, vec![&AllocationStrategy::CapacityOptimizedPrioritized]);
    }

    #[test]
    fn test_fleet_type_roundtrip() {
        for kind in FleetType::all() {
            assert_eq!(kind.as_str().parse::<FleetType>().unwrap(), *kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
        let err = "Maintain".parse::<FleetType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown fleet type: \"Maintain\"");
    }

    #[test]
    fn test_fleet_name_pattern() {
        assert!(is_fleet_name("fleet_1"));
        assert!(is_fleet_name("Render-Farm-02"));
        assert!(!is_fleet_name(""));
        assert!(!is_fleet_name("fleet 1"));
        assert!(!is_fleet_name("fleet.1"));
    }

    #[test]
    fn test_iam_fleet_role_pattern() {
        assert!(is_iam_fleet_role("arn:aws:iam::123456789012:role/x"));
        assert!(is_iam_fleet_role(
            "arn:aws:iam::450006745611:role/aws-ec2-spot-fleet-tagging-role"
        ));
        assert!(!is_iam_fleet_role("arn:aws:iam::12345:role/x"));
        assert!(!is_iam_fleet_role("arn:aws:iam::123456789012:user/x"));
        assert!(!is_iam_fleet_role("arn:aws:iam::123456789012:role/"));
    }

    #[test]
    fn test_iam_fleet_role_account_id_is_ascii() {
        assert!(!is_iam_fleet_role("arn:aws:iam::١٢٣٤٥٦٧٨٩٠١٢:role/x"));
        assert!(!is_iam_fleet_role("arn:aws:iam::１２３４５６７８９０１２:role/x"));
        let ascii_only = Regex::new(IAM_FLEET_ROLE_PATTERN).unwrap();
        assert!(!ascii_only.is_match("arn:aws:iam::۱۲۳۴۵۶۷۸۹۰۱۲:role/x"));
    }

    #[test]
    fn test_identifier_patterns() {
        assert!(is_launch_template_id("lt-00000000000000000"));
        assert!(!is_launch_template_id("lt-0000000000000000"));
        assert!(is_subnet_id("subnet-9knxxx5fjlh73esrg"));
        assert!(!is_subnet_id("subnet-9knxxx5fjlh73esrg0"));
        assert!(!is_subnet_id("sub-9knxxx5fjlh73esrg"));
    }

    #[test]
    fn test_tag_text_pattern() {
        assert!(is_tag_text("DeadlineTrackedAWSResource"));
        assert!(is_tag_text("0.42.0:SpotEventPluginFleet"));
        assert!(is_tag_text("aws:createdBy"));
        assert!(is_tag_text("team name = render@studio/main"));
        assert!(!is_tag_text("bad*key"));
        assert!(!is_tag_text("équipe"));
        assert!(!is_tag_text(""));
    }

    #[test]
    fn test_reserved_prefix() {
        assert!(has_reserved_prefix("aws:createdBy"));
        assert!(!has_reserved_prefix("aws-rfdk"));
    }

    #[test]
    fn test_instance_types_unique_and_known() {
        let mut seen = std::collections::HashSet::new();
        for t in INSTANCE_TYPES {
            assert!(seen.insert(t), "Duplicate instance type: {t}");
        }
        assert!(is_instance_type("c5.large"));
        assert!(is_instance_type("m5.4xlarge"));
        assert!(!is_instance_type("c5.huge"));
        assert!(!is_instance_type(""));
    }

    #[test]
    fn test_mandatory_tag_satisfies_tag_rules() {
        assert!(is_tag_text(MANDATORY_TAG_KEY));
        assert!(is_tag_text(MANDATORY_TAG_VALUE));
        assert!(!has_reserved_prefix(MANDATORY_TAG_KEY));
    }
}
