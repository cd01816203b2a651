//! Glance resource - the logical image service
//!
//! A Glance declares the whole service once. Its `glanceAPIs` list is
//! expanded into [`GlanceAPI`](super::GlanceAPI) instances; values set at
//! this level are the defaults every instance inherits.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::condition::{Conditions, READY_CONDITION};
use super::glance_api::GlanceAPITemplate;
use super::meta::{impl_object, ObjectMeta, API_VERSION};
use super::storage::GlanceExtraVolMounts;
use super::upsert_entry;
use super::validation::ValidationError;

/// Which key of the service secret holds the password
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordSelector {
    #[serde(default = "default_password_key")]
    pub service: String,
}

fn default_password_key() -> String {
    "GlancePassword".to_string()
}

impl Default for PasswordSelector {
    fn default() -> Self {
        Self {
            service: default_password_key(),
        }
    }
}

/// Per-tenant image quotas; zero means unlimited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaLimits {
    /// Total image storage in MiB
    #[serde(default)]
    pub image_size_total: u32,

    /// Total staging storage in MiB
    #[serde(default)]
    pub image_stage_total: u32,

    #[serde(default)]
    pub image_count_total: u32,

    /// Concurrent uploads
    #[serde(default)]
    pub image_count_uploads: u32,
}

impl QuotaLimits {
    /// Quota enforcement is on when any limit is set
    pub fn is_enabled(&self) -> bool {
        self.image_size_total > 0
            || self.image_stage_total > 0
            || self.image_count_total > 0
            || self.image_count_uploads > 0
    }
}

/// Debug switches of the whole service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlanceDebug {
    /// Pause the database sync job
    #[serde(default)]
    pub db_sync: bool,

    /// Default for every instance's service debug switch
    #[serde(default)]
    pub service: bool,
}

/// Desired state of the image service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlanceSpec {
    /// Empty falls back to the environment default image
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub container_image: String,

    #[serde(default = "default_service_user")]
    pub service_user: String,

    #[serde(default)]
    pub database_instance: String,

    #[serde(default = "default_service_user")]
    pub database_account: String,

    #[serde(default)]
    pub secret: String,

    #[serde(default)]
    pub password_selectors: PasswordSelector,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<HashMap<String, String>>,

    #[serde(default)]
    pub debug: GlanceDebug,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_service_config: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_config_overwrite: Option<HashMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_service_config_secrets: Option<Vec<String>>,

    /// API deployments; order only matters for picking defaults
    #[serde(rename = "glanceAPIs", default)]
    pub glance_apis: Vec<GlanceAPITemplate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_mounts: Option<Vec<GlanceExtraVolMounts>>,

    #[serde(default)]
    pub quotas: QuotaLimits,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub storage_class: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub storage_request: String,

    /// Instance registered in the identity catalog; defaults to the first
    /// `glanceAPIs` entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keystone_endpoint: Option<String>,
}

fn default_service_user() -> String {
    "glance".to_string()
}

impl Default for GlanceSpec {
    fn default() -> Self {
        Self {
            container_image: String::new(),
            service_user: default_service_user(),
            database_instance: String::new(),
            database_account: default_service_user(),
            secret: String::new(),
            password_selectors: PasswordSelector::default(),
            node_selector: None,
            debug: GlanceDebug::default(),
            custom_service_config: String::new(),
            default_config_overwrite: None,
            custom_service_config_secrets: None,
            glance_apis: Vec::new(),
            extra_mounts: None,
            quotas: QuotaLimits::default(),
            storage_class: String::new(),
            storage_request: String::new(),
            keystone_endpoint: None,
        }
    }
}

/// Observed state of the image service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlanceStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<HashMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoints: Option<HashMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub database_hostname: String,

    /// Instance name -> ready replicas
    #[serde(rename = "glanceAPIReadyCounts")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glance_api_ready_counts: Option<HashMap<String, u32>>,

    #[serde(default)]
    pub observed_generation: i64,
}

impl GlanceStatus {
    /// Record a component hash, returning whether it changed
    pub fn set_hash(&mut self, component: impl Into<String>, hash: impl Into<String>) -> bool {
        upsert_entry(&mut self.hash, component.into(), hash.into())
    }

    pub fn hash(&self, component: &str) -> Option<&str> {
        self.hash.as_ref()?.get(component).map(String::as_str)
    }

    pub fn set_endpoint(&mut self, name: impl Into<String>, url: impl Into<String>) {
        upsert_entry(&mut self.api_endpoints, name.into(), url.into());
    }

    pub fn set_ready_count(&mut self, instance: impl Into<String>, count: u32) {
        self.glance_api_ready_counts
            .get_or_insert_with(HashMap::new)
            .insert(instance.into(), count);
    }

    pub fn conditions_mut(&mut self) -> &mut Conditions {
        self.conditions.get_or_insert_with(Conditions::new)
    }

    pub fn is_ready(&self) -> bool {
        self.conditions
            .as_ref()
            .is_some_and(|c| c.is_true(READY_CONDITION))
    }
}

/// The logical image service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glance {
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Kind is always "Glance"
    pub kind: String,

    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: GlanceSpec,

    #[serde(default)]
    pub status: GlanceStatus,
}

impl_object!(Glance, "Glance");

impl Glance {
    pub fn new(metadata: ObjectMeta, spec: GlanceSpec) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: "Glance".to_string(),
            metadata,
            spec,
            status: GlanceStatus::default(),
        }
    }

    /// Add an API template to the end of `glanceAPIs`
    pub fn with_api(mut self, template: GlanceAPITemplate) -> Self {
        self.spec.glance_apis.push(template);
        self
    }

    /// Name of the instance registered in the identity catalog
    pub fn keystone_endpoint(&self) -> Option<&str> {
        self.spec
            .keystone_endpoint
            .as_deref()
            .or_else(|| self.spec.glance_apis.first().map(|t| t.name.as_str()))
    }

    /// Check the `glanceAPIs` list: known template types, each type and
    /// each name used once, non-empty names and a keystone endpoint that
    /// exists
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        let mut names = HashSet::new();
        for template in &self.spec.glance_apis {
            if template.name.is_empty() {
                return Err(ValidationError::EmptyApiName);
            }
            if !names.insert(template.name.as_str()) {
                return Err(ValidationError::DuplicateApiName(template.name.clone()));
            }
            if !template.api_type.is_template_type() {
                return Err(ValidationError::InvalidTemplateApiType {
                    name: template.name.clone(),
                    api_type: template.api_type.to_string(),
                });
            }
            if !seen.insert(&template.api_type) {
                return Err(ValidationError::DuplicateApiType(
                    template.api_type.to_string(),
                ));
            }
        }

        if let Some(endpoint) = &self.spec.keystone_endpoint {
            if !self.spec.glance_apis.iter().any(|t| &t.name == endpoint) {
                return Err(ValidationError::UnknownKeystoneEndpoint(endpoint.clone()));
            }
        }

        Ok(())
    }
}
