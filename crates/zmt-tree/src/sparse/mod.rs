//! Zero-aware trees that only store what they touch.

mod append_only;
mod node_store;
mod zero;

pub use append_only::{AppendOnlyMerkleTree, Frontier};
pub use node_store::{NodeAddress, NodeStore};
pub use zero::ZeroMerkleTree;
