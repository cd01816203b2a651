//! # glance-topology
//!
//! Typed objects for an image service deployment and the pure derivations
//! a reconciler needs from them: deep copies, per-instance endpoints and
//! pod placement.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use glance_topology::config::{load_manifest_file, GlanceDefaults, TopologyConfig};
//! use glance_topology::topology::{derive_topology, expand_instances};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let glance = load_manifest_file(Path::new("glance.yaml"))?;
//! let config = TopologyConfig::default();
//! for instance in expand_instances(&glance, &config, &GlanceDefaults::from_env())? {
//!     let topology = derive_topology(&config, &instance);
//!     println!("{}: {:?}", instance.metadata.name, topology.endpoints);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod topology;

pub use api::{ApiType, Glance, GlanceAPI, Object, ObjectMeta};
pub use config::{ConfigError, GlanceDefaults, TopologyConfig};
pub use topology::{derive_topology, expand_instances, Endpoint, InstanceTopology};
