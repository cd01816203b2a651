//! Instance expansion
//!
//! Turns one [`Glance`] into the [`GlanceAPI`] instances it declares.
//! Service-level values are defaults: a template field that was never set
//! inherits them, a field set to an empty value does not.

use tracing::{debug, info, warn};

use super::KEYSTONE_ENDPOINT_ANNOTATION;
use crate::api::{
    ApiType, Glance, GlanceAPI, GlanceAPIDebug, GlanceAPISpec, GlanceAPITemplate, ObjectMeta,
    ValidationError,
};
use crate::config::{GlanceDefaults, TopologyConfig};

/// Object name of an instance: `<glance>-<instance>-<api type, lowercase>`
pub fn instance_object_name(glance_name: &str, api_name: &str, api_type: &ApiType) -> String {
    format!(
        "{}-{}-{}",
        glance_name,
        api_name,
        api_type.as_str().to_lowercase()
    )
}

/// Expand every `glanceAPIs` entry into its instances, in list order.
///
/// `Split` entries produce an `Internal` instance followed by an `External`
/// one. The source is only read; every returned instance owns its data.
pub fn expand_instances(
    glance: &Glance,
    config: &TopologyConfig,
    defaults: &GlanceDefaults,
) -> Result<Vec<GlanceAPI>, ValidationError> {
    glance.validate()?;

    if glance.spec.glance_apis.is_empty() {
        warn!(
            "Glance {} declares no glanceAPIs; nothing to deploy",
            glance.metadata.qualified_name()
        );
        return Ok(Vec::new());
    }

    let deriver = config.placement_deriver();
    let keystone_endpoint = glance.keystone_endpoint();
    let mut instances = Vec::new();

    for template in &glance.spec.glance_apis {
        for api_type in template.api_type.instance_types() {
            let mut instance = build_instance(glance, template, api_type, defaults);

            for (key, value) in deriver.instance_labels(&instance) {
                instance.metadata.set_label(key, value);
            }
            if keystone_endpoint == Some(template.name.as_str()) {
                instance
                    .metadata
                    .set_annotation(KEYSTONE_ENDPOINT_ANNOTATION, "true");
            }

            debug!(
                "Derived instance {} ({}) from Glance {}",
                instance.metadata.name,
                instance.api_type(),
                glance.metadata.name
            );
            instances.push(instance);
        }
    }

    info!(
        "Expanded Glance {} into {} instance(s)",
        glance.metadata.qualified_name(),
        instances.len()
    );
    Ok(instances)
}

fn build_instance(
    glance: &Glance,
    template: &GlanceAPITemplate,
    api_type: ApiType,
    defaults: &GlanceDefaults,
) -> GlanceAPI {
    let spec = &glance.spec;
    let mut instance_template = template.clone();
    instance_template.api_type = api_type;

    if instance_template.replicas.is_none() {
        instance_template.replicas = Some(1);
    }
    if instance_template.container_image.is_empty() {
        instance_template.container_image = if spec.container_image.is_empty() {
            defaults.container_image.clone()
        } else {
            spec.container_image.clone()
        };
    }
    if instance_template.node_selector.is_none() {
        instance_template.node_selector = spec.node_selector.clone();
    }
    if instance_template.debug.is_none() {
        instance_template.debug = Some(GlanceAPIDebug {
            service: spec.debug.service,
        });
    }
    if instance_template.custom_service_config.is_empty() {
        instance_template.custom_service_config = spec.custom_service_config.clone();
    }
    if instance_template.default_config_overwrite.is_none() {
        instance_template.default_config_overwrite = spec.default_config_overwrite.clone();
    }
    if instance_template.custom_service_config_secrets.is_none() {
        instance_template.custom_service_config_secrets =
            spec.custom_service_config_secrets.clone();
    }

    let targets = [template.name.as_str(), instance_template.api_type.as_str()];
    let extra_mounts: Option<Vec<_>> = spec.extra_mounts.as_ref().map(|mounts| {
        mounts
            .iter()
            .filter_map(|m| m.filtered_for(&targets))
            .collect()
    });

    let name = instance_object_name(
        &glance.metadata.name,
        &template.name,
        &instance_template.api_type,
    );
    let mut metadata = ObjectMeta::derived(name, glance.metadata.namespace.clone());
    metadata.labels = glance.metadata.labels.clone();

    let api_spec = GlanceAPISpec {
        template: instance_template,
        service_user: spec.service_user.clone(),
        database_hostname: glance.status.database_hostname.clone(),
        database_account: spec.database_account.clone(),
        secret: spec.secret.clone(),
        password_selectors: spec.password_selectors.clone(),
        extra_mounts,
        quotas: spec.quotas,
        storage_class: spec.storage_class.clone(),
        storage_request: spec.storage_request.clone(),
    };

    GlanceAPI::new(metadata, api_spec)
}
