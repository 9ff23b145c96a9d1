//! # sfmt-core: Foundational Types for the Fleet Configuration Engine
//!
//! This crate is the leaf of the workspace. It defines the static rule
//! catalog, the typed fleet document model, the logical paths that locate
//! a value inside a document, and the normalizer that converts between the
//! grouped (guided form) and flattened (canonical document) representations
//! of launch template overrides.
//!
//! ## Key Design Principles
//!
//! 1. **One catalog.** Allocation strategies, fleet types, instance types and
//!    every identifier pattern are defined once in [`catalog`]. The schema,
//!    the consistency checker and the normalizer all read from it.
//!
//! 2. **Pure transforms.** Every normalizer operation takes its input by
//!    reference and returns a new value. In-place variants exist only where
//!    the host explicitly opts in.
//!
//! 3. **Order preservation.** A [`FleetDocument`] keeps fleets in the order
//!    they were authored; renaming a fleet keeps its position.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sfmt-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod catalog;
pub mod error;
pub mod model;
pub mod normalize;
pub mod path;

// Re-export primary types for ergonomic imports.
pub use catalog::{AllocationStrategy, FleetType};
pub use error::SfmtError;
pub use model::{
    rename_fleet_entry, FleetDocument, FleetSpec, LaunchTemplateConfig,
    LaunchTemplateSpecification, Override, SubnetSelection, Tag, TagSpecification,
};
pub use normalize::{
    flatten_groups, flatten_overrides, group_fleet, group_overrides, inject_mandatory_tag,
    inject_mandatory_tag_in_place, normalize_fleet, strip_priorities, GroupedLaunchTemplateConfig,
    OverrideGroup,
};
pub use path::{LogicalPath, PathSegment};
