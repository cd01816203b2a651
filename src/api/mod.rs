//! # Image Service API Objects
//!
//! Typed representations of the logical image service ([`Glance`]), its
//! per-instance deployments ([`GlanceAPI`]) and the value objects nested in
//! them.
//!
//! ## Copy semantics
//!
//! Every type here owns all of its data, so `Clone` is a deep copy: maps,
//! lists and nested objects are duplicated and a clone can be mutated
//! without affecting its source. Optional collections are `Option<_>`:
//! `None` ("never set") and `Some(empty)` ("explicitly set to nothing") are
//! different values and survive cloning and serialization unchanged.
//!
//! A reconciliation worker that needs to change an object works on its own
//! clone; the canonical object is replaced wholesale, never patched in
//! place.

pub mod condition;
pub mod glance;
pub mod glance_api;
pub mod hash;
pub mod meta;
pub mod override_spec;
pub mod resources;
pub mod storage;
pub mod validation;

use std::collections::HashMap;

pub use condition::{
    Condition, ConditionSeverity, ConditionStatus, Conditions, DEPLOYMENT_READY_CONDITION,
    EXPOSE_SERVICE_READY_CONDITION, NETWORK_ATTACHMENTS_READY_CONDITION, READY_CONDITION,
};
pub use glance::{Glance, GlanceDebug, GlanceSpec, GlanceStatus, PasswordSelector, QuotaLimits};
pub use glance_api::{
    ApiType, GlanceAPI, GlanceAPIDebug, GlanceAPISpec, GlanceAPIStatus, GlanceAPITemplate,
};
pub use hash::object_hash;
pub use meta::{deep_copy, deep_copy_into, Object, ObjectMeta, ResourceRequirements, API_VERSION};
pub use override_spec::{
    APIOverrideSpec, EmbeddedLabelsAnnotations, OverrideServiceSpec, RoutedOverrideSpec,
    ServiceType,
};
pub use resources::{
    Affinity, LabelSelector, LabelSelectorOperator, LabelSelectorRequirement, PodAffinity,
    PodAffinityTerm, ResourceList, TopologySpreadConstraint, UnsatisfiableConstraintAction,
};
pub use storage::{GlanceExtraVolMounts, VolMounts, Volume, VolumeMount, VolumeSource};
pub use validation::ValidationError;

/// List of Glance resources
pub type GlanceList = ResourceList<Glance>;

/// List of GlanceAPI resources
pub type GlanceAPIList = ResourceList<GlanceAPI>;

/// Insert into an optional map, creating it on first write.
/// Returns whether the stored value changed.
pub(crate) fn upsert_entry(
    map: &mut Option<HashMap<String, String>>,
    key: String,
    value: String,
) -> bool {
    let map = map.get_or_insert_with(HashMap::new);
    match map.get(&key) {
        Some(existing) if *existing == value => false,
        _ => {
            map.insert(key, value);
            true
        }
    }
}
