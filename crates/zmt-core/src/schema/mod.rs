//! Serialized schema/data contracts.

/// Tree configuration schema types.
pub mod config;
