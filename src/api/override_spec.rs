//! Customisation of the generated service objects
//!
//! An absent override (`None`) means "generate the default service"; it is
//! never equivalent to an override with every field empty.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Exposure type of a generated service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    ClusterIP,
    NodePort,
    LoadBalancer,
}

/// Labels and annotations merged into the generated object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedLabelsAnnotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<HashMap<String, String>>,
}

/// Service spec fields that may be overridden
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideServiceSpec {
    #[serde(rename = "type")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,

    #[serde(rename = "loadBalancerIP")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer_ip: Option<String>,

    #[serde(rename = "externalTrafficPolicy")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_traffic_policy: Option<String>,
}

/// Override of a service object that may also be exposed through a route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedOverrideSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EmbeddedLabelsAnnotations>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<OverrideServiceSpec>,

    /// Externally reachable URL; replaces the derived public URL
    #[serde(rename = "endpointURL")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

/// Per-instance overrides of generated objects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct APIOverrideSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<RoutedOverrideSpec>,
}

impl APIOverrideSpec {
    /// Externally reachable URL requested by the override, if any
    pub fn endpoint_url(&self) -> Option<&str> {
        self.service.as_ref()?.endpoint_url.as_deref()
    }
}
