//! Content-addressed cache keys.
//!
//! A fingerprint is a SHA-256 digest over a canonical serialization of the
//! request: `serde_json` maps are key-sorted, so logically identical
//! requests hash identically regardless of property insertion order, and
//! string values are whitespace-normalized before hashing.

use facture_types::DocumentRequest;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Stable hash of a canonicalized [`DocumentRequest`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Computes the fingerprint for a request.
    pub fn of_request(request: &DocumentRequest) -> Result<Self, serde_json::Error> {
        let mut value = serde_json::to_value(request)?;
        normalize(&mut value);
        let canonical = serde_json::to_string(&value)?;

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Ok(Self(hasher.finalize().into()))
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Trims strings and collapses internal whitespace runs to a single space.
fn normalize(value: &mut Value) {
    match value {
        Value::String(s) => {
            let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
            *s = collapsed;
        }
        Value::Array(items) => {
            for item in items {
                normalize(item);
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                normalize(item);
            }
        }
        _ => {}
    }
}
