// In crates/api-client/src/subscription.rs

use crate::{Error, Result};
use core_types::Channel;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionAction {
    Subscribe,
    Unsubscribe,
}

/// A subscribe/unsubscribe request for a set of channels.
///
/// Serialized as `{"action": ..., "channels": [...]}` with fields in that
/// order. Channel order is preserved as given. No acknowledgement is expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionRequest {
    pub action: SubscriptionAction,
    pub channels: Vec<String>,
}

impl SubscriptionRequest {
    pub fn new<I, S>(action: SubscriptionAction, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            action,
            channels: channels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn subscribe<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SubscriptionAction::Subscribe, channels)
    }

    pub fn unsubscribe<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SubscriptionAction::Unsubscribe, channels)
    }

    /// Builds a request from the typed channel vocabulary.
    pub fn for_channels(action: SubscriptionAction, channels: &[Channel]) -> Self {
        Self::new(action, channels.iter().map(Channel::as_str))
    }

    /// The wire string sent as a single text frame.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_request_wire_format() {
        let request = SubscriptionRequest::for_channels(
            SubscriptionAction::Subscribe,
            &[Channel::TwrUpdate, Channel::PortfolioUpdate],
        );
        assert_eq!(
            request.encode().unwrap(),
            r#"{"action":"subscribe","channels":["Consumer.TwrUpdate","Consumer.PortfolioUpdate"]}"#
        );
    }

    #[test]
    fn test_unsubscribe_preserves_channel_order() {
        let request = SubscriptionRequest::unsubscribe(["b", "a", "c"]);
        assert_eq!(
            request.encode().unwrap(),
            r#"{"action":"unsubscribe","channels":["b","a","c"]}"#
        );
    }

    #[test]
    fn test_empty_channel_list() {
        let request = SubscriptionRequest::subscribe(Vec::<String>::new());
        assert_eq!(request.encode().unwrap(), r#"{"action":"subscribe","channels":[]}"#);
    }
}
