//! Property tests for endpoint resolution, placement, expansion, hashing
//! and deep copies.

use std::collections::HashMap;

use proptest::prelude::*;

use glance_topology::api::{
    object_hash, ApiType, Glance, GlanceAPI, GlanceAPISpec, GlanceAPITemplate, GlanceSpec,
    ObjectMeta, QuotaLimits,
};
use glance_topology::topology::{
    affinity_for, derive_topology, expand_instances, label_selector_for, resolve_endpoints,
    Endpoint, EndpointResolver, PlacementDeriver, PortTable,
};
use glance_topology::{GlanceDefaults, TopologyConfig};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Known classifiers plus arbitrary unrecognized strings.
fn arb_api_type() -> impl Strategy<Value = ApiType> {
    prop_oneof![
        Just(ApiType::Single),
        Just(ApiType::Split),
        Just(ApiType::Internal),
        Just(ApiType::External),
        Just(ApiType::Edge),
        ".{0,12}".prop_map(ApiType::from),
    ]
}

fn arb_labels() -> impl Strategy<Value = Option<HashMap<String, String>>> {
    proptest::option::of(prop::collection::hash_map("[a-z]{1,8}", "[a-z0-9]{0,8}", 0..4))
}

fn arb_instance() -> impl Strategy<Value = GlanceAPI> {
    (
        "[a-z][a-z0-9]{0,10}",
        arb_api_type(),
        proptest::option::of(0u32..10),
        arb_labels(),
        proptest::option::of(prop::collection::vec("[a-z]{1,6}", 0..3)),
        any::<u32>(),
    )
        .prop_map(|(name, api_type, replicas, labels, networks, quota)| {
            let mut template = GlanceAPITemplate::new(name.clone(), api_type);
            template.replicas = replicas;
            template.node_selector = labels.clone();
            template.network_attachments = networks;

            let mut spec = GlanceAPISpec::new(template);
            spec.quotas = QuotaLimits {
                image_count_total: quota,
                ..Default::default()
            };

            let mut metadata = ObjectMeta::new(format!("glance-{}", name), "openstack");
            metadata.labels = labels;
            GlanceAPI::new(metadata, spec)
        })
}

/// A valid service: each template type at most once, unique names.
fn arb_glance() -> impl Strategy<Value = Glance> {
    (
        prop::sample::subsequence(vec![ApiType::Single, ApiType::Split, ApiType::Edge], 0..=3),
        arb_labels(),
        proptest::option::of(0u32..5),
    )
        .prop_map(|(types, node_selector, replicas)| {
            let glance_apis = types
                .into_iter()
                .enumerate()
                .map(|(i, api_type)| {
                    let mut template = GlanceAPITemplate::new(format!("api{}", i), api_type);
                    template.replicas = replicas;
                    template
                })
                .collect();
            let spec = GlanceSpec {
                node_selector,
                glance_apis,
                ..Default::default()
            };
            Glance::new(ObjectMeta::new("glance", "openstack"), spec)
        })
}

/// Selector entries, unique by key.
fn arb_selector_entries() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::btree_map("[a-z]{1,8}", "[a-z0-9]{0,8}", 0..24)
        .prop_map(|map| map.into_iter().collect())
}

fn spec_from_entries<'a>(entries: impl Iterator<Item = &'a (String, String)>) -> GlanceAPISpec {
    let mut template = GlanceAPITemplate::new("default", ApiType::Single);
    template.node_selector = Some(entries.cloned().collect::<HashMap<_, _>>());
    GlanceAPISpec::new(template)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    /// Every classifier, recognized or not, yields one or two endpoints.
    #[test]
    fn endpoints_are_total(api_type in arb_api_type()) {
        let endpoints = resolve_endpoints(&api_type);
        prop_assert!(!endpoints.is_empty());
        prop_assert!(endpoints.len() <= 2);

        let expected_internal = matches!(
            api_type,
            ApiType::Edge | ApiType::Internal | ApiType::Single
        );
        let expected_public = !matches!(api_type, ApiType::Edge | ApiType::Internal);
        prop_assert_eq!(endpoints.contains_key(&Endpoint::Internal), expected_internal);
        prop_assert_eq!(endpoints.contains_key(&Endpoint::Public), expected_public);
    }

    /// Ports come only from the injected table.
    #[test]
    fn endpoint_ports_follow_table(
        api_type in arb_api_type(),
        internal in 1u16..=u16::MAX,
        public in 1u16..=u16::MAX,
    ) {
        let resolver = EndpointResolver::new("glance", PortTable { internal, public });
        for (endpoint, data) in resolver.resolve(&api_type) {
            let expected = match endpoint {
                Endpoint::Internal => internal,
                Endpoint::Public => public,
            };
            prop_assert_eq!(data.port, expected);
        }
    }

    /// The affinity term embeds exactly the instance's label selector, and
    /// that selector matches the labels stamped on the instance.
    #[test]
    fn affinity_and_selector_agree(instance in arb_instance()) {
        let selector = label_selector_for(&instance);
        let affinity = affinity_for(&instance);
        let terms = &affinity
            .pod_affinity
            .as_ref()
            .expect("pod affinity")
            .required_during_scheduling_ignored_during_execution;

        prop_assert_eq!(terms.len(), 1);
        prop_assert_eq!(terms[0].label_selector.as_ref(), Some(&selector));
        prop_assert!(affinity.pod_anti_affinity.is_none());

        let labels = PlacementDeriver::default().instance_labels(&instance);
        prop_assert!(selector.matches(&labels));
    }

    /// A clone equals its source, and mutating it leaves the source as it was.
    #[test]
    fn clone_is_equal_and_independent(instance in arb_instance()) {
        let snapshot = instance.clone();
        let mut copy = instance.clone();
        prop_assert_eq!(&copy, &instance);

        copy.metadata.set_label("mutated", "yes");
        copy.spec.template.replicas = Some(99);
        copy.spec
            .template
            .node_selector
            .get_or_insert_with(HashMap::new)
            .insert("zone".into(), "b".into());
        copy.status.set_network_attachment("storage", Some(vec!["10.0.0.1".into()]));
        copy.status.conditions_mut().mark_true("Ready", "ok");

        prop_assert_eq!(&instance, &snapshot);
        prop_assert_ne!(&copy, &instance);
    }

    /// Optional collections keep their None/empty distinction across clone
    /// and serialization.
    #[test]
    fn clone_keeps_optional_shape(instance in arb_instance()) {
        let copy = instance.clone();
        prop_assert_eq!(copy.metadata.labels.is_none(), instance.metadata.labels.is_none());
        prop_assert_eq!(
            copy.spec.template.network_attachments.is_none(),
            instance.spec.template.network_attachments.is_none()
        );

        let json = serde_json::to_string(&instance).unwrap();
        let parsed: GlanceAPI = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed, instance);
    }

    /// Equal values hash equally, whatever order their maps were filled in.
    #[test]
    fn hash_of_equal_values_is_equal(entries in arb_selector_entries()) {
        let forward = spec_from_entries(entries.iter());
        let backward = spec_from_entries(entries.iter().rev());
        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(object_hash(&forward).unwrap(), object_hash(&backward).unwrap());
    }

    /// Expanding the same service twice yields equal instances and equal
    /// topologies.
    #[test]
    fn expansion_is_idempotent(glance in arb_glance()) {
        let config = TopologyConfig::default();
        let defaults = GlanceDefaults::default();
        let first = expand_instances(&glance, &config, &defaults).unwrap();
        let second = expand_instances(&glance, &config, &defaults).unwrap();
        prop_assert_eq!(&first, &second);

        for (a, b) in first.iter().zip(&second) {
            prop_assert_eq!(derive_topology(&config, a), derive_topology(&config, b));
            prop_assert_eq!(object_hash(&a.spec).unwrap(), object_hash(&b.spec).unwrap());
        }
    }
}
