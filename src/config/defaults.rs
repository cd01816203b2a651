//! Image defaults taken from the environment

use std::env;

use tracing::debug;

/// Environment variable overriding the default API image
pub const API_IMAGE_ENV: &str = "RELATED_IMAGE_GLANCE_API_IMAGE_URL_DEFAULT";

/// Image used when neither the manifest nor the environment names one
pub const API_IMAGE_FALLBACK: &str =
    "quay.io/podified-antelope-centos9/openstack-glance-api:current-podified";

/// Values applied when a manifest leaves them empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlanceDefaults {
    pub container_image: String,
}

impl Default for GlanceDefaults {
    fn default() -> Self {
        Self {
            container_image: API_IMAGE_FALLBACK.to_string(),
        }
    }
}

impl GlanceDefaults {
    /// Read defaults from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read defaults through `lookup`; an unset or empty value falls back
    /// to the built-in image
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(API_IMAGE_ENV).filter(|v| !v.is_empty()) {
            Some(image) => {
                debug!("Using API image {} from {}", image, API_IMAGE_ENV);
                Self {
                    container_image: image,
                }
            }
            None => Self::default(),
        }
    }
}
