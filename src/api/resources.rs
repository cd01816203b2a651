//! Shared scheduling and selection types
//!
//! These mirror the orchestration platform's selector, affinity and spread
//! objects closely enough to be serialized straight into workload manifests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::meta::API_VERSION;

/// Response for listing resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceList<T> {
    /// API version
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Kind (e.g., "GlanceList", "GlanceAPIList")
    pub kind: String,

    /// List of items
    #[serde(default)]
    pub items: Vec<T>,
}

impl<T> ResourceList<T> {
    /// Create a new resource list
    pub fn new(kind: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: kind.into(),
            items,
        }
    }
}

/// Relationship between a label key and a set of values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelSelectorOperator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

/// A single set-based requirement of a [`LabelSelector`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelectorRequirement {
    /// The label key the requirement applies to
    pub key: String,

    pub operator: LabelSelectorOperator,

    /// Must be non-empty for `In`/`NotIn`, empty for `Exists`/`DoesNotExist`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl LabelSelectorRequirement {
    /// `key In (values...)`
    pub fn key_in(key: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            key: key.into(),
            operator: LabelSelectorOperator::In,
            values,
        }
    }

    /// Check a label set against this requirement
    pub fn matches(&self, labels: &HashMap<String, String>) -> bool {
        let value = labels.get(&self.key);
        match self.operator {
            LabelSelectorOperator::In => value.is_some_and(|v| self.values.contains(v)),
            LabelSelectorOperator::NotIn => value.map_or(true, |v| !self.values.contains(v)),
            LabelSelectorOperator::Exists => value.is_some(),
            LabelSelectorOperator::DoesNotExist => value.is_none(),
        }
    }
}

/// Label selector for filtering resources
///
/// `matchLabels` and `matchExpressions` are ANDed. An empty selector
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelector {
    /// Match exact labels
    #[serde(rename = "matchLabels")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_labels: Option<HashMap<String, String>>,

    /// Set-based requirements
    #[serde(rename = "matchExpressions")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_expressions: Option<Vec<LabelSelectorRequirement>>,
}

impl LabelSelector {
    /// Create a selector that matches a specific label
    pub fn matching(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut labels = HashMap::new();
        labels.insert(key.into(), value.into());
        Self {
            match_labels: Some(labels),
            match_expressions: None,
        }
    }

    /// Create a selector from set-based requirements only
    pub fn from_expressions(expressions: Vec<LabelSelectorRequirement>) -> Self {
        Self {
            match_labels: None,
            match_expressions: Some(expressions),
        }
    }

    /// Check if labels match this selector
    pub fn matches(&self, labels: &HashMap<String, String>) -> bool {
        let labels_match = self
            .match_labels
            .iter()
            .flatten()
            .all(|(k, v)| labels.get(k) == Some(v));

        labels_match
            && self
                .match_expressions
                .iter()
                .flatten()
                .all(|req| req.matches(labels))
    }
}

/// Pod scheduling constraints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affinity {
    #[serde(rename = "podAffinity")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_affinity: Option<PodAffinity>,

    #[serde(rename = "podAntiAffinity")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_anti_affinity: Option<PodAffinity>,
}

/// Inter-pod (anti-)affinity rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodAffinity {
    /// Hard requirements evaluated at scheduling time only
    #[serde(rename = "requiredDuringSchedulingIgnoredDuringExecution")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_during_scheduling_ignored_during_execution: Vec<PodAffinityTerm>,
}

/// A set of pods, selected by label, that must share a topology domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodAffinityTerm {
    #[serde(rename = "labelSelector")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<LabelSelector>,

    /// Node label whose value defines the co-location domain
    #[serde(rename = "topologyKey")]
    pub topology_key: String,
}

/// What the scheduler does with a pod that cannot satisfy a spread constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnsatisfiableConstraintAction {
    #[default]
    DoNotSchedule,
    ScheduleAnyway,
}

/// Even spreading of matching pods across topology domains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologySpreadConstraint {
    /// Maximum permitted difference in matching pods between domains
    #[serde(rename = "maxSkew")]
    pub max_skew: i32,

    #[serde(rename = "topologyKey")]
    pub topology_key: String,

    #[serde(rename = "whenUnsatisfiable")]
    pub when_unsatisfiable: UnsatisfiableConstraintAction,

    #[serde(rename = "labelSelector")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<LabelSelector>,

    /// Pod label keys whose values further partition the selected pods
    #[serde(rename = "matchLabelKeys")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_label_keys: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resource_list() {
        let list: ResourceList<String> =
            ResourceList::new("StringList", vec!["a".into(), "b".into()]);
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.kind, "StringList");
        assert_eq!(list.api_version, API_VERSION);
    }

    #[test]
    fn test_label_selector_matches() {
        let selector = LabelSelector::matching("env", "prod");
        assert!(selector.matches(&labels(&[("env", "prod"), ("app", "web")])));
    }

    #[test]
    fn test_label_selector_no_match() {
        let selector = LabelSelector::matching("env", "prod");
        assert!(!selector.matches(&labels(&[("env", "dev")])));
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        assert!(LabelSelector::default().matches(&HashMap::new()));
    }

    #[test]
    fn test_expression_operators() {
        let set = labels(&[("tier", "api")]);

        let in_req = LabelSelectorRequirement::key_in("tier", vec!["api".into(), "db".into()]);
        assert!(in_req.matches(&set));

        let not_in = LabelSelectorRequirement {
            key: "tier".into(),
            operator: LabelSelectorOperator::NotIn,
            values: vec!["api".into()],
        };
        assert!(!not_in.matches(&set));
        assert!(not_in.matches(&HashMap::new()));

        let exists = LabelSelectorRequirement {
            key: "tier".into(),
            operator: LabelSelectorOperator::Exists,
            values: vec![],
        };
        assert!(exists.matches(&set));

        let absent = LabelSelectorRequirement {
            key: "tier".into(),
            operator: LabelSelectorOperator::DoesNotExist,
            values: vec![],
        };
        assert!(!absent.matches(&set));
    }

    #[test]
    fn test_labels_and_expressions_are_anded() {
        let selector = LabelSelector {
            match_labels: Some(labels(&[("service", "glance")])),
            match_expressions: Some(vec![LabelSelectorRequirement::key_in(
                "tier",
                vec!["api".into()],
            )]),
        };
        assert!(selector.matches(&labels(&[("service", "glance"), ("tier", "api")])));
        assert!(!selector.matches(&labels(&[("service", "glance")])));
    }

    #[test]
    fn test_serialize_affinity_field_names() {
        let affinity = Affinity {
            pod_affinity: Some(PodAffinity {
                required_during_scheduling_ignored_during_execution: vec![PodAffinityTerm {
                    label_selector: Some(LabelSelector::matching("a", "b")),
                    topology_key: "kubernetes.io/hostname".into(),
                }],
            }),
            pod_anti_affinity: None,
        };
        let yaml = serde_yaml::to_string(&affinity).unwrap();
        assert!(yaml.contains("podAffinity"));
        assert!(yaml.contains("requiredDuringSchedulingIgnoredDuringExecution"));
        assert!(yaml.contains("topologyKey: kubernetes.io/hostname"));
        assert!(!yaml.contains("podAntiAffinity"));
    }
}
