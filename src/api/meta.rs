//! Object metadata and the type-erased object capability
//!
//! Every top-level resource (`Glance`, `GlanceAPI` and their lists) carries
//! the same metadata block and can be duplicated behind a `dyn Object`
//! without knowing its concrete type.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API group/version served by every resource in this crate
pub const API_VERSION: &str = "glance.openstack.org/v1beta1";

/// Metadata shared by all top-level resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Name, unique within a namespace
    pub name: String,

    /// Namespace (defaults to "default")
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Unique identifier
    #[serde(default = "Uuid::new_v4")]
    pub uid: Uuid,

    /// Labels for organization and selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,

    /// Annotations for metadata storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<HashMap<String, String>>,

    /// Incremented by the declarative store on every spec change
    #[serde(default)]
    pub generation: i64,

    #[serde(rename = "creationTimestamp")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

fn default_namespace() -> String {
    "default".to_string()
}

impl ObjectMeta {
    /// Metadata for a freshly created object
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            uid: Uuid::new_v4(),
            labels: None,
            annotations: None,
            generation: 1,
            creation_timestamp: Some(Utc::now()),
        }
    }

    /// Metadata for an object derived from another one.
    ///
    /// Identity fields (`uid`, `creationTimestamp`, `generation`) are left
    /// for the declarative store to assign, so deriving the same object
    /// twice yields equal metadata.
    pub fn derived(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            uid: Uuid::nil(),
            labels: None,
            annotations: None,
            generation: 0,
            creation_timestamp: None,
        }
    }

    /// Get the full qualified name (namespace/name)
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    /// Set a label, creating the label map on first use
    pub fn set_label(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.labels
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
    }

    /// Set an annotation, creating the annotation map on first use
    pub fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.annotations
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.as_ref()?.get(key).map(String::as_str)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.as_ref()?.get(key).map(String::as_str)
    }
}

/// Compute resource requirements of a container
///
/// Both maps keep the "never set" / "set empty" distinction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    /// Maximum amount of compute resources allowed (e.g. `cpu: "2"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<HashMap<String, String>>,

    /// Minimum amount of compute resources required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<HashMap<String, String>>,
}

/// A top-level resource that can be duplicated without knowing its type.
///
/// `deep_copy_object` returns a copy that shares no collection or nested
/// value with `self`.
pub trait Object: Debug + Send + Sync {
    fn kind(&self) -> &'static str;

    fn api_version(&self) -> &'static str {
        API_VERSION
    }

    fn metadata(&self) -> &ObjectMeta;

    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    fn deep_copy_object(&self) -> Box<dyn Object>;

    fn as_any(&self) -> &dyn Any;
}

impl dyn Object {
    /// Downcast a type-erased object back to its concrete type
    pub fn downcast_ref<T: Object + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl Clone for Box<dyn Object> {
    fn clone(&self) -> Self {
        self.deep_copy_object()
    }
}

/// Implements [`Object`] for a resource with `metadata` field.
macro_rules! impl_object {
    ($ty:ty, $kind:literal) => {
        impl $crate::api::meta::Object for $ty {
            fn kind(&self) -> &'static str {
                $kind
            }

            fn metadata(&self) -> &$crate::api::meta::ObjectMeta {
                &self.metadata
            }

            fn metadata_mut(&mut self) -> &mut $crate::api::meta::ObjectMeta {
                &mut self.metadata
            }

            fn deep_copy_object(&self) -> Box<dyn $crate::api::meta::Object> {
                Box::new(self.clone())
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
    };
}

pub(crate) use impl_object;

/// Copy an optional value, mapping `None` to `None`.
///
/// The copy never aliases `src`; an absent source never turns into a
/// default-constructed value.
pub fn deep_copy<T: Clone>(src: Option<&T>) -> Option<T> {
    src.cloned()
}

/// Overwrite `dst` with a copy of `src`, reusing the allocations `dst`
/// already owns where the type allows it.
pub fn deep_copy_into<T: Clone>(src: &T, dst: &mut T) {
    dst.clone_from(src);
}
