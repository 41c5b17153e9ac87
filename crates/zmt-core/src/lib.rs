//! Zero Merkle tree base primitives and schemas.

/// Foundational primitive types and the injected hash function.
pub mod base;
/// Serialized configuration models.
pub mod schema;
