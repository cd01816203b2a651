//! Condition records reported in resource status
//!
//! A condition list holds at most one entry per condition type. Updates go
//! through [`Conditions::set`], which replaces an existing entry in place so
//! the list keeps the order in which each type was first observed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate readiness of a resource
pub const READY_CONDITION: &str = "Ready";

/// The instance workload has the desired number of ready replicas
pub const DEPLOYMENT_READY_CONDITION: &str = "DeploymentReady";

/// Endpoints were derived and exposed
pub const EXPOSE_SERVICE_READY_CONDITION: &str = "ExposeServiceReady";

/// Network attachments were found and addresses assigned
pub const NETWORK_ATTACHMENTS_READY_CONDITION: &str = "NetworkAttachmentsReady";

/// Status of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// How bad a `False` condition is; empty when the condition is `True`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConditionSeverity {
    #[default]
    #[serde(rename = "")]
    None,
    Error,
    Warning,
    Info,
}

/// A timestamped observation of one aspect of runtime status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Type of condition (Ready, DeploymentReady, ...)
    #[serde(rename = "type")]
    pub condition_type: String,

    pub status: ConditionStatus,

    #[serde(default)]
    pub severity: ConditionSeverity,

    /// Machine-readable reason for the condition
    #[serde(default)]
    pub reason: String,

    /// Human-readable message
    #[serde(default)]
    pub message: String,

    /// Last time the condition transitioned
    #[serde(rename = "lastTransitionTime")]
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    /// Create a new condition with the current timestamp
    pub fn new(
        condition_type: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            condition_type: condition_type.into(),
            status,
            severity: ConditionSeverity::None,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: Utc::now(),
        }
    }

    pub fn with_severity(mut self, severity: ConditionSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }
}

/// Ordered list of conditions, unique by type
///
/// Serialized as a plain list. A list carrying the same type more than
/// once keeps the last entry, at the position of the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Condition>", into = "Vec<Condition>")]
pub struct Conditions(Vec<Condition>);

impl From<Vec<Condition>> for Conditions {
    fn from(list: Vec<Condition>) -> Self {
        let mut conditions = Self::new();
        for condition in list {
            match conditions
                .0
                .iter_mut()
                .find(|c| c.condition_type == condition.condition_type)
            {
                Some(existing) => *existing = condition,
                None => conditions.0.push(condition),
            }
        }
        conditions
    }
}

impl From<Conditions> for Vec<Condition> {
    fn from(conditions: Conditions) -> Self {
        conditions.0
    }
}

impl Conditions {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Upsert a condition by type.
    ///
    /// An existing entry is replaced in place. Its transition time is kept
    /// when the status did not change, so the timestamp records the last
    /// actual transition rather than the last observation.
    pub fn set(&mut self, mut condition: Condition) {
        match self
            .0
            .iter_mut()
            .find(|c| c.condition_type == condition.condition_type)
        {
            Some(existing) => {
                if existing.status == condition.status {
                    condition.last_transition_time = existing.last_transition_time;
                }
                *existing = condition;
            }
            None => self.0.push(condition),
        }
    }

    pub fn get(&self, condition_type: &str) -> Option<&Condition> {
        self.0.iter().find(|c| c.condition_type == condition_type)
    }

    pub fn is_true(&self, condition_type: &str) -> bool {
        self.get(condition_type).is_some_and(Condition::is_true)
    }

    /// Set a condition to `True` with an empty severity
    pub fn mark_true(&mut self, condition_type: &str, message: impl Into<String>) {
        self.set(Condition::new(
            condition_type,
            ConditionStatus::True,
            "Ready",
            message,
        ));
    }

    /// Set a condition to `False`
    pub fn mark_false(
        &mut self,
        condition_type: &str,
        reason: impl Into<String>,
        severity: ConditionSeverity,
        message: impl Into<String>,
    ) {
        self.set(
            Condition::new(condition_type, ConditionStatus::False, reason, message)
                .with_severity(severity),
        );
    }

    /// Remove a condition type, returning it if present
    pub fn remove(&mut self, condition_type: &str) -> Option<Condition> {
        let idx = self
            .0
            .iter()
            .position(|c| c.condition_type == condition_type)?;
        Some(self.0.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_condition_new() {
        let condition = Condition::new(READY_CONDITION, ConditionStatus::True, "Ready", "");
        assert_eq!(condition.condition_type, "Ready");
        assert_eq!(condition.severity, ConditionSeverity::None);
        assert!(condition.is_true());
    }

    #[test]
    fn test_set_upserts_by_type() {
        let mut conditions = Conditions::new();
        conditions.mark_false(
            DEPLOYMENT_READY_CONDITION,
            "Requested",
            ConditionSeverity::Info,
            "waiting",
        );
        conditions.mark_true(READY_CONDITION, "");
        conditions.mark_true(DEPLOYMENT_READY_CONDITION, "done");

        assert_eq!(conditions.len(), 2);
        // First-observed order survives the update
        assert_eq!(
            conditions.iter().next().map(|c| c.condition_type.as_str()),
            Some(DEPLOYMENT_READY_CONDITION)
        );
        assert!(conditions.is_true(DEPLOYMENT_READY_CONDITION));
        assert_eq!(
            conditions.get(DEPLOYMENT_READY_CONDITION).unwrap().message,
            "done"
        );
    }

    #[test]
    fn test_transition_time_kept_when_status_unchanged() {
        let mut conditions = Conditions::new();
        let mut first = Condition::new(READY_CONDITION, ConditionStatus::False, "Init", "");
        first.last_transition_time = Utc::now() - Duration::minutes(5);
        let original_time = first.last_transition_time;
        conditions.set(first);

        conditions.set(Condition::new(
            READY_CONDITION,
            ConditionStatus::False,
            "StillInit",
            "",
        ));
        let current = conditions.get(READY_CONDITION).unwrap();
        assert_eq!(current.last_transition_time, original_time);
        assert_eq!(current.reason, "StillInit");

        conditions.mark_true(READY_CONDITION, "");
        assert!(conditions.get(READY_CONDITION).unwrap().last_transition_time > original_time);
    }

    #[test]
    fn test_remove() {
        let mut conditions = Conditions::new();
        conditions.mark_true(READY_CONDITION, "");
        assert!(conditions.remove(READY_CONDITION).is_some());
        assert!(conditions.remove(READY_CONDITION).is_none());
        assert!(conditions.is_empty());
    }

    #[test]
    fn test_serialize_as_list() {
        let mut conditions = Conditions::new();
        conditions.mark_true(READY_CONDITION, "all good");
        let json = serde_json::to_value(&conditions).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["type"], "Ready");
        assert_eq!(json[0]["severity"], "");
    }

    #[test]
    fn test_duplicate_types_collapse_on_read() {
        let json = r#"[
            {"type": "Ready", "status": "False", "reason": "Init", "lastTransitionTime": "2024-01-01T00:00:00Z"},
            {"type": "DeploymentReady", "status": "True", "lastTransitionTime": "2024-01-01T00:00:00Z"},
            {"type": "Ready", "status": "True", "reason": "Done", "lastTransitionTime": "2024-01-02T00:00:00Z"}
        ]"#;
        let conditions: Conditions = serde_json::from_str(json).unwrap();

        assert_eq!(conditions.len(), 2);
        let types: Vec<_> = conditions.iter().map(|c| c.condition_type.as_str()).collect();
        assert_eq!(types, vec![READY_CONDITION, DEPLOYMENT_READY_CONDITION]);
        assert!(conditions.is_true(READY_CONDITION));
        assert_eq!(conditions.get(READY_CONDITION).unwrap().reason, "Done");
    }

    #[test]
    fn test_from_list_keeps_one_per_type() {
        let conditions = Conditions::from(vec![
            Condition::new(READY_CONDITION, ConditionStatus::False, "Init", ""),
            Condition::new(READY_CONDITION, ConditionStatus::True, "Ready", ""),
        ]);
        assert_eq!(conditions.len(), 1);
        assert!(conditions.is_true(READY_CONDITION));
        assert_eq!(Vec::from(conditions).len(), 1);
    }
}
