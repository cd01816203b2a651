//! # Topology Resolution
//!
//! Pure derivations from an instance specification to the artifacts an
//! orchestration layer needs to run it:
//!
//! - [`endpoints`]: which endpoints an API type exposes, and on which ports
//! - [`placement`]: affinity, label selector and spread constraints that
//!   find and co-locate an instance's pods
//! - [`expand`]: the instances a service declares
//!
//! Nothing here performs I/O or keeps state; every function may be called
//! from any number of threads at once.

pub mod endpoints;
pub mod expand;
pub mod placement;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use endpoints::{
    resolve_endpoints, Endpoint, EndpointData, EndpointMap, EndpointResolver, PortTable,
    ServiceEndpoint,
};
pub use expand::{expand_instances, instance_object_name};
pub use placement::{
    affinity_for, label_selector_for, match_label_keys, PlacementDeriver, PlacementLabels,
};

use crate::api::{Affinity, GlanceAPI, LabelSelector};
use crate::config::TopologyConfig;

/// Service name, prefix of every derived name and label value
pub const SERVICE_NAME: &str = "glance";

/// Port of the internal endpoint
pub const GLANCE_INTERNAL_PORT: u16 = 9292;

/// Port of the public endpoint
pub const GLANCE_PUBLIC_PORT: u16 = 9293;

/// Label key carrying `<service>-<instance>-<api type>`
pub const COMPONENT_LABEL: &str = "component-name";

/// Label key carrying the service name
pub const SERVICE_LABEL: &str = "service";

/// Pod label that identifies a workload revision
pub const MATCH_LABEL_KEY: &str = "controller-revision-hash";

/// Node label used as the co-location domain
pub const HOSTNAME_TOPOLOGY_KEY: &str = "kubernetes.io/hostname";

/// Set to "true" on the instance registered in the identity catalog
pub const KEYSTONE_ENDPOINT_ANNOTATION: &str = "keystoneEndpoint";

/// Everything derived for one instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceTopology {
    pub endpoints: EndpointMap,
    pub service_endpoints: Vec<ServiceEndpoint>,
    pub affinity: Affinity,
    pub label_selector: LabelSelector,
    pub match_label_keys: Vec<String>,
    pub labels: HashMap<String, String>,
}

/// Derive endpoints and placement for `instance` in its own namespace
pub fn derive_topology(config: &TopologyConfig, instance: &GlanceAPI) -> InstanceTopology {
    let resolver = config.endpoint_resolver();
    let deriver = config.placement_deriver();

    InstanceTopology {
        endpoints: resolver.resolve(instance.api_type()),
        service_endpoints: resolver.service_endpoints(instance, &instance.metadata.namespace),
        affinity: deriver.affinity_for(instance),
        label_selector: deriver.label_selector_for(instance),
        match_label_keys: deriver.match_label_keys(),
        labels: deriver.instance_labels(instance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiType, GlanceAPISpec, GlanceAPITemplate, ObjectMeta};

    #[test]
    fn test_derive_topology_internal() {
        let api = GlanceAPI::new(
            ObjectMeta::new("glance-default-internal", "openstack"),
            GlanceAPISpec::new(GlanceAPITemplate::new("default", ApiType::Internal)),
        );
        let topology = derive_topology(&TopologyConfig::default(), &api);

        assert_eq!(topology.endpoints.len(), 1);
        assert_eq!(topology.endpoints[&Endpoint::Internal].port, GLANCE_INTERNAL_PORT);
        assert_eq!(
            topology.service_endpoints[0].url,
            "http://glance-default-internal.openstack.svc:9292"
        );
        assert_eq!(
            topology.labels.get(COMPONENT_LABEL).map(String::as_str),
            Some("glance-default-Internal")
        );
        assert!(topology.label_selector.matches(&topology.labels));
        assert_eq!(topology.match_label_keys, vec![MATCH_LABEL_KEY.to_string()]);
    }

    #[test]
    fn test_topology_serializes() {
        let api = GlanceAPI::new(
            ObjectMeta::new("glance-default-single", "openstack"),
            GlanceAPISpec::new(GlanceAPITemplate::new("default", ApiType::Single)),
        );
        let json = serde_json::to_value(derive_topology(&TopologyConfig::default(), &api)).unwrap();
        assert_eq!(json["endpoints"]["internal"]["port"], 9292);
        assert_eq!(json["endpoints"]["public"]["port"], 9293);
        assert_eq!(json["matchLabelKeys"][0], "controller-revision-hash");
    }
}
