// In crates/events/src/lib.rs

pub mod dispatch;
pub mod types;

pub use dispatch::{LEGACY_HIERARCHY_MARKER, dispatch, dispatch_value};
pub use types::{InboundMessage, StateUpdate};
