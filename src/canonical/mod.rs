//! Canonical Turtle output: deterministic prefixes, triple order and
//! blank-node labels.

pub mod namespaces;
pub mod ordering;
pub mod serializer;

pub use namespaces::NamespaceBindings;
pub use ordering::{TermKey, canonical_order, sort_triples};
pub use serializer::CanonicalSerializer;

use serde::{Deserialize, Serialize};

pub const DEFAULT_RESERVED_PREFIX: &str = "schema";
pub const DEFAULT_RESERVED_NAMESPACE: &str = "http://schema.org/";

/// Reserved prefix contract honored by every canonical write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalConfig {
    pub reserved_prefix: String,
    pub reserved_namespace: String,
}

impl Default for CanonicalConfig {
    fn default() -> Self {
        Self {
            reserved_prefix: DEFAULT_RESERVED_PREFIX.to_string(),
            reserved_namespace: DEFAULT_RESERVED_NAMESPACE.to_string(),
        }
    }
}
