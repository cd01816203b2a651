//! GlanceAPI resource - one deployable API instance
//!
//! A GlanceAPI is derived from one entry of a Glance's `glanceAPIs` list.
//! A `Split` entry yields two instances (`Internal` and `External`), every
//! other entry yields one.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::condition::{Conditions, READY_CONDITION};
use super::glance::{PasswordSelector, QuotaLimits};
use super::meta::{impl_object, ObjectMeta, ResourceRequirements, API_VERSION};
use super::override_spec::APIOverrideSpec;
use super::storage::GlanceExtraVolMounts;
use super::validation::ValidationError;
use super::upsert_entry;

/// Deployment topology tag of an API template or instance.
///
/// Parsing never fails: a string that is not one of the known tags is kept
/// verbatim in [`ApiType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApiType {
    /// One instance serving both internal and public traffic
    Single,
    /// Template-only: expands into an `Internal` and an `External` instance
    #[default]
    Split,
    /// Internal half of a split deployment
    Internal,
    /// Public half of a split deployment
    External,
    /// Edge site instance, internal traffic only
    Edge,
    Other(String),
}

impl ApiType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Single => "Single",
            Self::Split => "Split",
            Self::Internal => "Internal",
            Self::External => "External",
            Self::Edge => "Edge",
            Self::Other(s) => s,
        }
    }

    /// Whether the tag is one of the known variants
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Valid on a `glanceAPIs` template entry
    pub fn is_template_type(&self) -> bool {
        matches!(self, Self::Single | Self::Split | Self::Edge)
    }

    /// Valid on a derived instance
    pub fn is_instance_type(&self) -> bool {
        matches!(
            self,
            Self::Single | Self::Internal | Self::External | Self::Edge
        )
    }

    /// Instance types a template of this type expands into
    pub fn instance_types(&self) -> Vec<ApiType> {
        match self {
            Self::Split => vec![Self::Internal, Self::External],
            other => vec![other.clone()],
        }
    }
}

impl From<String> for ApiType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Single" => Self::Single,
            "Split" => Self::Split,
            "Internal" => Self::Internal,
            "External" => Self::External,
            "Edge" => Self::Edge,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for ApiType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<ApiType> for String {
    fn from(api_type: ApiType) -> Self {
        match api_type {
            ApiType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for ApiType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debug switches of an API instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlanceAPIDebug {
    /// Start the service container in debug mode
    #[serde(default)]
    pub service: bool,
}

/// Template of one API deployment, as written in `glanceAPIs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlanceAPITemplate {
    /// Instance name, part of every derived object name
    #[serde(default = "default_api_name")]
    pub name: String,

    #[serde(rename = "type", default)]
    pub api_type: ApiType,

    /// `None` inherits the default of one replica
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,

    /// Empty inherits the service image
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub container_image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<HashMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<GlanceAPIDebug>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_service_config: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_config_overwrite: Option<HashMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_service_config_secrets: Option<Vec<String>>,

    #[serde(default)]
    pub resources: ResourceRequirements,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_attachments: Option<Vec<String>>,

    #[serde(rename = "override", default)]
    pub override_spec: APIOverrideSpec,
}

pub(crate) fn default_api_name() -> String {
    "default".to_string()
}

impl GlanceAPITemplate {
    /// Create a template with every optional field unset
    pub fn new(name: impl Into<String>, api_type: ApiType) -> Self {
        Self {
            name: name.into(),
            api_type,
            replicas: None,
            container_image: String::new(),
            node_selector: None,
            debug: None,
            custom_service_config: String::new(),
            default_config_overwrite: None,
            custom_service_config_secrets: None,
            resources: ResourceRequirements::default(),
            network_attachments: None,
            override_spec: APIOverrideSpec::default(),
        }
    }

    pub fn with_replicas(mut self, replicas: u32) -> Self {
        self.replicas = Some(replicas);
        self
    }

    pub fn with_node_selector(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.node_selector
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_network_attachment(mut self, name: impl Into<String>) -> Self {
        self.network_attachments
            .get_or_insert_with(Vec::new)
            .push(name.into());
        self
    }
}

/// Desired state of one API instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlanceAPISpec {
    #[serde(flatten)]
    pub template: GlanceAPITemplate,

    #[serde(default)]
    pub service_user: String,

    #[serde(default)]
    pub database_hostname: String,

    #[serde(default)]
    pub database_account: String,

    /// Secret holding the service password
    #[serde(default)]
    pub secret: String,

    #[serde(default)]
    pub password_selectors: PasswordSelector,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_mounts: Option<Vec<GlanceExtraVolMounts>>,

    #[serde(default)]
    pub quotas: QuotaLimits,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub storage_class: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub storage_request: String,
}

impl GlanceAPISpec {
    pub fn new(template: GlanceAPITemplate) -> Self {
        Self {
            template,
            service_user: String::new(),
            database_hostname: String::new(),
            database_account: String::new(),
            secret: String::new(),
            password_selectors: PasswordSelector::default(),
            extra_mounts: None,
            quotas: QuotaLimits::default(),
            storage_class: String::new(),
            storage_request: String::new(),
        }
    }
}

/// Observed state of one API instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlanceAPIStatus {
    /// Replicas reporting ready
    #[serde(default)]
    pub ready_count: u32,

    /// Component name -> content hash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<HashMap<String, String>>,

    /// Endpoint name (`internal`, `public`) -> URL
    #[serde(rename = "apiEndpoint")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoints: Option<HashMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,

    /// Network attachment -> addresses assigned on it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_attachments: Option<HashMap<String, Option<Vec<String>>>>,

    #[serde(default)]
    pub observed_generation: i64,
}

impl GlanceAPIStatus {
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

    /// Record the addresses of one network attachment; `None` means the
    /// attachment exists but has no addresses yet
    pub fn set_network_attachment(
        &mut self,
        network: impl Into<String>,
        addresses: Option<Vec<String>>,
    ) {
        self.network_attachments
            .get_or_insert_with(HashMap::new)
            .insert(network.into(), addresses);
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

/// A deployable API instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlanceAPI {
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Kind is always "GlanceAPI"
    pub kind: String,

    pub metadata: ObjectMeta,

    pub spec: GlanceAPISpec,

    #[serde(default)]
    pub status: GlanceAPIStatus,
}

impl_object!(GlanceAPI, "GlanceAPI");

impl GlanceAPI {
    pub fn new(metadata: ObjectMeta, spec: GlanceAPISpec) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: "GlanceAPI".to_string(),
            metadata,
            spec,
            status: GlanceAPIStatus::default(),
        }
    }

    /// Instance name from the template (e.g. "default")
    pub fn api_name(&self) -> &str {
        &self.spec.template.name
    }

    pub fn api_type(&self) -> &ApiType {
        &self.spec.template.api_type
    }

    /// Desired replicas with the default applied
    pub fn replicas(&self) -> u32 {
        self.spec.template.replicas.unwrap_or(1)
    }

    /// Ready condition set and every desired replica ready
    pub fn is_ready(&self) -> bool {
        self.status.is_ready() && self.status.ready_count >= self.replicas()
    }

    /// Reject instance types that only make sense on templates or that are
    /// not known at all
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.api_type().is_instance_type() {
            return Err(ValidationError::InvalidInstanceApiType {
                name: self.metadata.name.clone(),
                api_type: self.api_type().to_string(),
            });
        }
        Ok(())
    }
}
