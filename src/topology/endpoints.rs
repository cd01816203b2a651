//! Endpoint resolution
//!
//! Maps an instance's API type to the endpoints it exposes:
//!
//! | API type   | endpoints          |
//! |------------|--------------------|
//! | `Edge`     | internal           |
//! | `Internal` | internal           |
//! | `Single`   | internal + public  |
//! | other      | public             |
//!
//! "Other" covers `External`, `Split` and any unrecognized string. Unknown
//! types resolving to public-only is long-standing behaviour that callers
//! may rely on; validate the type first if that is not wanted.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{GLANCE_INTERNAL_PORT, GLANCE_PUBLIC_PORT, SERVICE_NAME};
use crate::api::{ApiType, GlanceAPI};

/// Logical endpoint of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Internal,
    Public,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::Public => "public",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a resolved endpoint listens on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointData {
    pub port: u16,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

impl EndpointData {
    pub fn on_port(port: u16) -> Self {
        Self {
            port,
            path: String::new(),
        }
    }
}

/// Resolved endpoints, ordered internal before public
pub type EndpointMap = BTreeMap<Endpoint, EndpointData>;

/// Ports the API listens on per endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortTable {
    #[serde(default = "default_internal_port")]
    pub internal: u16,

    #[serde(default = "default_public_port")]
    pub public: u16,
}

fn default_internal_port() -> u16 {
    GLANCE_INTERNAL_PORT
}

fn default_public_port() -> u16 {
    GLANCE_PUBLIC_PORT
}

impl Default for PortTable {
    fn default() -> Self {
        Self {
            internal: GLANCE_INTERNAL_PORT,
            public: GLANCE_PUBLIC_PORT,
        }
    }
}

/// A resolved endpoint with the service object that exposes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    pub endpoint: Endpoint,

    /// Name of the generated service, `<service>-<instance>-<endpoint>`
    pub service_name: String,

    pub port: u16,

    pub url: String,
}

/// Resolves endpoints against an injected port table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResolver {
    service_name: String,
    ports: PortTable,
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self::new(SERVICE_NAME, PortTable::default())
    }
}

impl EndpointResolver {
    pub fn new(service_name: impl Into<String>, ports: PortTable) -> Self {
        Self {
            service_name: service_name.into(),
            ports,
        }
    }

    pub fn ports(&self) -> PortTable {
        self.ports
    }

    /// Endpoints exposed by an instance of `api_type`; always one or two
    /// entries, never fails.
    pub fn resolve(&self, api_type: &ApiType) -> EndpointMap {
        let internal = || (Endpoint::Internal, EndpointData::on_port(self.ports.internal));
        let public = || (Endpoint::Public, EndpointData::on_port(self.ports.public));

        match api_type {
            // Edge sites never take public traffic
            ApiType::Edge => EndpointMap::from([internal()]),
            ApiType::Internal => EndpointMap::from([internal()]),
            // No companion instance exists to serve the other half
            ApiType::Single => EndpointMap::from([internal(), public()]),
            ApiType::External | ApiType::Split | ApiType::Other(_) => EndpointMap::from([public()]),
        }
    }

    /// Service name exposing `endpoint` of `instance`
    pub fn service_name_for(&self, instance: &GlanceAPI, endpoint: Endpoint) -> String {
        format!("{}-{}-{}", self.service_name, instance.api_name(), endpoint)
    }

    /// Resolve the instance's endpoints together with the generated service
    /// names and URLs inside `namespace`.
    ///
    /// A public endpoint uses the override's `endpointURL` when one is set.
    pub fn service_endpoints(&self, instance: &GlanceAPI, namespace: &str) -> Vec<ServiceEndpoint> {
        self.resolve(instance.api_type())
            .into_iter()
            .map(|(endpoint, data)| {
                let service_name = self.service_name_for(instance, endpoint);
                let override_url = match endpoint {
                    Endpoint::Public => instance.spec.template.override_spec.endpoint_url(),
                    Endpoint::Internal => None,
                };
                let url = match override_url {
                    Some(url) => url.to_string(),
                    None => format!(
                        "http://{}.{}.svc:{}{}",
                        service_name, namespace, data.port, data.path
                    ),
                };
                ServiceEndpoint {
                    endpoint,
                    service_name,
                    port: data.port,
                    url,
                }
            })
            .collect()
    }

    /// Endpoint name -> URL, as recorded in instance status
    pub fn api_endpoint_map(&self, instance: &GlanceAPI, namespace: &str) -> HashMap<String, String> {
        self.service_endpoints(instance, namespace)
            .into_iter()
            .map(|se| (se.endpoint.as_str().to_string(), se.url))
            .collect()
    }
}

/// Resolve endpoints with the built-in port table
pub fn resolve_endpoints(api_type: &ApiType) -> EndpointMap {
    EndpointResolver::default().resolve(api_type)
}
