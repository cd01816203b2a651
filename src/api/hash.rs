//! Content hashes for change detection
//!
//! Status hash maps record one hash per generated component (config
//! secret, input environment, ...). A component is re-rolled when its hash
//! changes.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 of the value's canonical JSON encoding, as lowercase hex.
///
/// The value goes through [`serde_json::Value`] first so object keys are
/// emitted in sorted order; equal values hash equally regardless of
/// `HashMap` iteration order.
///
/// Returns the serialization error unchanged; plain data types in this
/// crate never fail to serialize.
pub fn object_hash<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_value(value)?;
    let bytes = serde_json::to_vec(&canonical)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}
