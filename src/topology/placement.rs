//! Placement derivation
//!
//! Every workload of an instance carries the component label
//! `<service>-<instance-name>-<api-type>`. The affinity, label selector and
//! spread constraint built here all select on that one label, so they
//! always describe the same set of pods.
//!
//! The affinity exists so that an instance's maintenance jobs (image cache
//! pruner and cleaner) land on the node that already mounts the instance's
//! read-write-once volume.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{COMPONENT_LABEL, HOSTNAME_TOPOLOGY_KEY, MATCH_LABEL_KEY, SERVICE_LABEL, SERVICE_NAME};
use crate::api::{
    Affinity, GlanceAPI, LabelSelector, LabelSelectorRequirement, PodAffinity, PodAffinityTerm,
    TopologySpreadConstraint, UnsatisfiableConstraintAction,
};

/// Label keys used to place and group instance workloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementLabels {
    /// Key of the per-instance component label
    #[serde(default = "default_component_label")]
    pub component_label: String,

    /// Pod label that identifies a workload revision
    #[serde(default = "default_match_label_key")]
    pub match_label_key: String,

    /// Node label defining the co-location domain
    #[serde(default = "default_topology_key")]
    pub topology_key: String,
}

fn default_component_label() -> String {
    COMPONENT_LABEL.to_string()
}

fn default_match_label_key() -> String {
    MATCH_LABEL_KEY.to_string()
}

fn default_topology_key() -> String {
    HOSTNAME_TOPOLOGY_KEY.to_string()
}

impl Default for PlacementLabels {
    fn default() -> Self {
        Self {
            component_label: default_component_label(),
            match_label_key: default_match_label_key(),
            topology_key: default_topology_key(),
        }
    }
}

/// Derives placement predicates for instances of one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementDeriver {
    service_name: String,
    labels: PlacementLabels,
}

impl Default for PlacementDeriver {
    fn default() -> Self {
        Self::new(SERVICE_NAME, PlacementLabels::default())
    }
}

impl PlacementDeriver {
    pub fn new(service_name: impl Into<String>, labels: PlacementLabels) -> Self {
        Self {
            service_name: service_name.into(),
            labels,
        }
    }

    pub fn labels(&self) -> &PlacementLabels {
        &self.labels
    }

    /// Component label value, `<service>-<instance-name>-<api-type>`
    pub fn component_value(&self, instance: &GlanceAPI) -> String {
        format!(
            "{}-{}-{}",
            self.service_name,
            instance.api_name(),
            instance.api_type()
        )
    }

    fn component_requirement(&self, instance: &GlanceAPI) -> LabelSelectorRequirement {
        LabelSelectorRequirement::key_in(
            self.labels.component_label.clone(),
            vec![self.component_value(instance)],
        )
    }

    /// Require co-scheduling on the node of any pod of this instance
    pub fn affinity_for(&self, instance: &GlanceAPI) -> Affinity {
        Affinity {
            pod_affinity: Some(PodAffinity {
                required_during_scheduling_ignored_during_execution: vec![PodAffinityTerm {
                    label_selector: Some(self.label_selector_for(instance)),
                    topology_key: self.labels.topology_key.clone(),
                }],
            }),
            pod_anti_affinity: None,
        }
    }

    /// Select every pod of this instance
    pub fn label_selector_for(&self, instance: &GlanceAPI) -> LabelSelector {
        LabelSelector::from_expressions(vec![self.component_requirement(instance)])
    }

    /// Pod label keys grouping pods by revision; independent of the instance
    pub fn match_label_keys(&self) -> Vec<String> {
        vec![self.labels.match_label_key.clone()]
    }

    /// Spread this instance's pods evenly over `topology_key` domains
    pub fn spread_constraint_for(
        &self,
        instance: &GlanceAPI,
        max_skew: i32,
        topology_key: impl Into<String>,
        when_unsatisfiable: UnsatisfiableConstraintAction,
    ) -> TopologySpreadConstraint {
        TopologySpreadConstraint {
            max_skew,
            topology_key: topology_key.into(),
            when_unsatisfiable,
            label_selector: Some(self.label_selector_for(instance)),
            match_label_keys: self.match_label_keys(),
        }
    }

    /// Labels to stamp on every workload of the instance
    pub fn instance_labels(&self, instance: &GlanceAPI) -> HashMap<String, String> {
        HashMap::from([
            (SERVICE_LABEL.to_string(), self.service_name.clone()),
            (
                self.labels.component_label.clone(),
                self.component_value(instance),
            ),
        ])
    }
}

/// Affinity with the built-in label keys
pub fn affinity_for(instance: &GlanceAPI) -> Affinity {
    PlacementDeriver::default().affinity_for(instance)
}

/// Label selector with the built-in label keys
pub fn label_selector_for(instance: &GlanceAPI) -> LabelSelector {
    PlacementDeriver::default().label_selector_for(instance)
}

/// `["controller-revision-hash"]`
pub fn match_label_keys() -> Vec<String> {
    vec![MATCH_LABEL_KEY.to_string()]
}
