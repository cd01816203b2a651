//! Topology settings injected into the resolver and deriver
//!
//! Defaults are the built-in constants; a settings file only needs the
//! fields it changes.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::topology::{EndpointResolver, PlacementDeriver, PlacementLabels, PortTable, SERVICE_NAME};

/// Ports, label keys and service name used for every derivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,

    #[serde(default)]
    pub ports: PortTable,

    #[serde(default)]
    pub placement: PlacementLabels,
}

fn default_service_name() -> String {
    SERVICE_NAME.to_string()
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            ports: PortTable::default(),
            placement: PlacementLabels::default(),
        }
    }
}

// ============================================================================
// SBIO: Pure business logic (no I/O)
// ============================================================================

impl TopologyConfig {
    pub fn endpoint_resolver(&self) -> EndpointResolver {
        EndpointResolver::new(self.service_name.clone(), self.ports)
    }

    pub fn placement_deriver(&self) -> PlacementDeriver {
        PlacementDeriver::new(self.service_name.clone(), self.placement.clone())
    }

    /// Reject settings that would derive unusable objects
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::Invalid("serviceName must not be empty".into()));
        }
        if self.ports.internal == 0 || self.ports.public == 0 {
            return Err(ConfigError::Invalid("ports must be non-zero".into()));
        }
        if self.ports.internal == self.ports.public {
            return Err(ConfigError::Invalid(format!(
                "internal and public ports must differ, both are {}",
                self.ports.internal
            )));
        }
        if self.placement.component_label.is_empty()
            || self.placement.match_label_key.is_empty()
            || self.placement.topology_key.is_empty()
        {
            return Err(ConfigError::Invalid(
                "placement label keys must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Parse and validate settings from a YAML (or JSON) string
pub fn parse_config(content: &str) -> Result<TopologyConfig, ConfigError> {
    let config: TopologyConfig =
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Serialize settings to a YAML string
pub fn serialize_config(config: &TopologyConfig) -> Result<String, ConfigError> {
    serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TopologyConfig::default();
        assert_eq!(config.service_name, "glance");
        assert_eq!(config.ports.internal, 9292);
        assert_eq!(config.ports.public, 9293);
        assert_eq!(config.placement.component_label, "component-name");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config("ports:\n  public: 443\n").unwrap();
        assert_eq!(config.ports.internal, 9292);
        assert_eq!(config.ports.public, 443);
        assert_eq!(config.placement.topology_key, "kubernetes.io/hostname");
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(parse_config("{}").unwrap(), TopologyConfig::default());
    }

    #[test]
    fn test_zero_port_rejected() {
        let result = parse_config("ports:\n  internal: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_equal_ports_rejected() {
        let result = parse_config("ports:\n  internal: 9292\n  public: 9292\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_error() {
        let result = parse_config("ports: [");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = TopologyConfig::default();
        let yaml = serialize_config(&config).unwrap();
        assert!(yaml.contains("serviceName: glance"));
        assert!(yaml.contains("componentLabel: component-name"));
    }

    #[test]
    fn test_injected_into_resolver() {
        let config = parse_config("serviceName: image\nports:\n  internal: 8000\n").unwrap();
        let resolver = config.endpoint_resolver();
        assert_eq!(resolver.ports().internal, 8000);
    }
}
