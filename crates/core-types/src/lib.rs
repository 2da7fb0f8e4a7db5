// In crates/core-types/src/lib.rs

pub mod channels;
pub mod error;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use channels::Channel;
pub use error::{Error, Result};
pub use types::{HierarchyNode, HprResult, NodeKind, TwrSnapshot};
