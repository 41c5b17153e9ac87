use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration for a zero Merkle tree instance.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TreeConfig {
    /// Tree height; the tree has `2^height` leaf slots.
    pub height: u8,
    /// Hash primitive used to combine child nodes.
    #[serde(default)]
    pub hash: HashAlgorithm,
}

/// Hash primitive selection.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256.
    #[default]
    Sha256,
    /// `BLAKE2b` truncated to 32 bytes.
    Blake2b,
}

impl TreeConfig {
    /// Create a new tree configuration.
    #[must_use]
    pub const fn new(height: u8, hash: HashAlgorithm) -> Self {
        Self { height, hash }
    }
}
