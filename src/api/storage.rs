//! Extra volumes mounted into generated workloads

use serde::{Deserialize, Serialize};

/// Propagation target that matches every API instance
pub const PROPAGATE_GLANCE_API: &str = "GlanceAPI";

/// Source backing a volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VolumeSource {
    Secret {
        #[serde(rename = "secretName")]
        secret_name: String,
    },
    ConfigMap {
        name: String,
    },
    PersistentVolumeClaim {
        #[serde(rename = "claimName")]
        claim_name: String,
        #[serde(rename = "readOnly", default)]
        read_only: bool,
    },
    HostPath {
        path: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub name: String,

    #[serde(flatten)]
    pub source: VolumeSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    /// Must match a [`Volume`] name
    pub name: String,

    #[serde(rename = "mountPath")]
    pub mount_path: String,

    #[serde(rename = "readOnly", default)]
    pub read_only: bool,

    #[serde(rename = "subPath")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,
}

/// A group of volumes with their mounts and the services they propagate to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolMounts {
    /// Targets this group applies to: `GlanceAPI`, an instance name or an
    /// api type. Empty means every target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagation: Option<Vec<String>>,

    #[serde(rename = "extraVolType")]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extra_vol_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<Volume>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mounts: Option<Vec<VolumeMount>>,
}

impl VolMounts {
    /// Whether this group should be mounted into a workload identified by
    /// any of `targets`
    pub fn propagates_to(&self, targets: &[&str]) -> bool {
        match self.propagation.as_deref() {
            None | Some([]) => true,
            Some(propagation) => propagation
                .iter()
                .any(|p| p == PROPAGATE_GLANCE_API || targets.contains(&p.as_str())),
        }
    }
}

/// Named, optionally region-scoped set of extra volume groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlanceExtraVolMounts {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,

    #[serde(rename = "extraVol")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_vol: Option<Vec<VolMounts>>,
}

impl GlanceExtraVolMounts {
    /// Keep only the volume groups that propagate to `targets`.
    ///
    /// Returns `None` when nothing propagates, so callers can drop the whole
    /// entry.
    pub fn filtered_for(&self, targets: &[&str]) -> Option<Self> {
        let groups: Vec<VolMounts> = self
            .extra_vol
            .iter()
            .flatten()
            .filter(|group| group.propagates_to(targets))
            .cloned()
            .collect();

        if groups.is_empty() {
            return None;
        }

        Some(Self {
            name: self.name.clone(),
            region: self.region.clone(),
            extra_vol: Some(groups),
        })
    }
}
