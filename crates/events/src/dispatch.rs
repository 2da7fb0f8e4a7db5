// In crates/events/src/dispatch.rs

use crate::{InboundMessage, StateUpdate};
use core_types::Channel;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// The `type` value older hub builds use for hierarchy updates.
pub const LEGACY_HIERARCHY_MARKER: &str = "tag_hierarchy_update";

/// Routes a parsed push payload. See [`dispatch`].
pub fn dispatch_value(payload: &Value) -> Option<StateUpdate> {
    match InboundMessage::deserialize(payload) {
        Ok(message) => dispatch(&message),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring push payload that is not a message object.");
            None
        }
    }
}

/// Maps an inbound message to the state slice it updates.
///
/// Routing is by exact channel match; the legacy `type` marker is only
/// consulted when no channel rule applies. Anything else, and any payload that
/// does not decode into the slice's type, yields `None`. The result depends on
/// the message alone.
pub fn dispatch(message: &InboundMessage) -> Option<StateUpdate> {
    let channel = message
        .channel
        .as_deref()
        .and_then(|name| name.parse::<Channel>().ok());

    match channel {
        Some(Channel::TwrUpdate) => {
            return decode(message.message.as_ref(), Channel::TwrUpdate.as_str()).map(StateUpdate::Twr);
        }
        Some(Channel::PortfolioUpdate) => {
            return decode(message.message.as_ref(), Channel::PortfolioUpdate.as_str())
                .map(StateUpdate::Hierarchy);
        }
        Some(Channel::SystemError) => {
            let notice = match &message.message {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => "unspecified service error".to_string(),
            };
            return Some(StateUpdate::ServiceError(notice));
        }
        _ => {}
    }

    if message.kind.as_deref() == Some(LEGACY_HIERARCHY_MARKER) {
        let payload = [message.data.as_ref(), message.message.as_ref()]
            .into_iter()
            .flatten()
            .find(|value| !is_empty(value));
        return decode(payload, LEGACY_HIERARCHY_MARKER).map(StateUpdate::Hierarchy);
    }

    tracing::debug!(channel = ?message.channel, kind = ?message.kind, "Ignoring push message on unhandled channel.");
    None
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn decode<T: DeserializeOwned>(payload: Option<&Value>, route: &str) -> Option<T> {
    let Some(payload) = payload else {
        tracing::warn!(route, "Push message has no payload; dropping.");
        return None;
    };
    match T::deserialize(payload) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!(route, error = %e, "Push payload does not match the expected shape; dropping.");
            None
        }
    }
}
