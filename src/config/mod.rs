pub mod defaults;
pub mod settings;

pub use defaults::{GlanceDefaults, API_IMAGE_ENV, API_IMAGE_FALLBACK};
pub use settings::{parse_config, serialize_config, TopologyConfig};

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::api::{Glance, ValidationError};

/// Errors for configuration and manifest loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid manifest: {0}")]
    Validation(#[from] ValidationError),
}

// ============================================================================
// SBIO: Pure parsing functions (no I/O)
// ============================================================================

/// Parse and validate a Glance manifest from YAML or JSON
pub fn parse_manifest(content: &str) -> Result<Glance, ConfigError> {
    let glance: Glance =
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    glance.validate()?;
    Ok(glance)
}

// ============================================================================
// SBIO: I/O wrapper - thin layer over pure functions
// ============================================================================

/// Load and parse a Glance manifest from disk.
pub fn load_manifest_file(path: &Path) -> Result<Glance, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let glance = parse_manifest(&content)?;
    info!(
        "Loaded Glance {} from {}",
        glance.metadata.qualified_name(),
        path.display()
    );
    Ok(glance)
}

/// Load topology settings from disk.
pub fn load_config_file(path: &Path) -> Result<TopologyConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    info!("Loaded topology settings from {}", path.display());
    Ok(config)
}
