// In crates/core-types/src/channels.rs

use crate::Error;
use std::fmt;
use std::str::FromStr;

/// The fixed vocabulary of push-update topics shared with the hub.
///
/// Channels travel on the wire as namespaced strings (`"Consumer.TwrUpdate"`).
/// Matching is exact; there is no case folding or prefix matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    TwrUpdate,
    PortfolioUpdate,
    TickerUpdate,
    OrderUpdate,
    AccountUpdate,
    PositionUpdate,
    PriceNotification,
    OrderNotification,
    SystemError,
    SystemHealthCheck,
}

impl Channel {
    /// Every consumer-facing channel, in declaration order.
    pub const CONSUMER: [Channel; 8] = [
        Channel::TwrUpdate,
        Channel::PortfolioUpdate,
        Channel::TickerUpdate,
        Channel::OrderUpdate,
        Channel::AccountUpdate,
        Channel::PositionUpdate,
        Channel::PriceNotification,
        Channel::OrderNotification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::TwrUpdate => "Consumer.TwrUpdate",
            Channel::PortfolioUpdate => "Consumer.PortfolioUpdate",
            Channel::TickerUpdate => "Consumer.TickerUpdate",
            Channel::OrderUpdate => "Consumer.OrderUpdate",
            Channel::AccountUpdate => "Consumer.AccountUpdate",
            Channel::PositionUpdate => "Consumer.PositionUpdate",
            Channel::PriceNotification => "Consumer.PriceNotification",
            Channel::OrderNotification => "Consumer.OrderNotification",
            Channel::SystemError => "System.Error",
            Channel::SystemHealthCheck => "System.HealthCheck",
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Channel::SystemError | Channel::SystemHealthCheck)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::CONSUMER
            .iter()
            .chain([Channel::SystemError, Channel::SystemHealthCheck].iter())
            .find(|channel| channel.as_str() == s)
            .copied()
            .ok_or_else(|| Error::UnknownChannel(s.to_string()))
    }
}
