// --- Push Message Structures ---

use core_types::{HierarchyNode, TwrSnapshot};
use serde::Deserialize;
use serde_json::Value;

/// One inbound frame from the push-update channel.
///
/// Every field is optional on the wire; routing decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// A routed update, naming the state slice it targets.
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    /// Replaces the TWR slice wholesale.
    Twr(TwrSnapshot),
    /// Replaces the hierarchy slice wholesale.
    Hierarchy(HierarchyNode),
    /// A `System.Error` notice from the hub.
    ServiceError(String),
}

impl StateUpdate {
    /// The slice name, for logging.
    pub fn target(&self) -> &'static str {
        match self {
            StateUpdate::Twr(_) => "twr",
            StateUpdate::Hierarchy(_) => "hierarchy",
            StateUpdate::ServiceError(_) => "notice",
        }
    }
}
