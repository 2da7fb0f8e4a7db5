// In crates/api-client/src/reconnect.rs

use app_config::{ReconnectSettings, ReconnectStrategy};
use rand::Rng;
use std::time::Duration;

/// Decides how long to wait before the next reconnect attempt.
///
/// `consecutive_failures` counts closes since the last successful open and
/// starts at 1. Returning `None` stops retrying until the next explicit
/// `connect`.
pub trait ReconnectPolicy: Send {
    fn next_delay(&mut self, consecutive_failures: u32) -> Option<Duration>;

    /// Called when a connection opens successfully.
    fn reset(&mut self) {}
}

/// One blind retry per interval. With no cap this retries forever.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedDelay {
    pub delay: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(5000),
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy for FixedDelay {
    fn next_delay(&mut self, consecutive_failures: u32) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if consecutive_failures > max => None,
            _ => Some(self.delay),
        }
    }
}

/// Exponential backoff with jitter, for deployments that want to back off a
/// struggling hub.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    pub base: Duration,
    pub max: Duration,
    pub jitter_factor: f64,
    pub max_attempts: Option<u32>,
}

impl ExponentialBackoff {
    /// Calculate delay with exponential backoff and jitter
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31) as i32;
        let base = self.base.as_millis() as f64 * 2.0_f64.powi(exponent);
        let clamped = base.min(self.max.as_millis() as f64);

        if self.jitter_factor <= 0.0 {
            return Duration::from_millis(clamped as u64);
        }

        // Add jitter: ±jitter_factor of the delay
        let jitter_range = clamped * self.jitter_factor;
        let jitter: f64 = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
        Duration::from_millis((clamped + jitter).max(0.0) as u64)
    }
}

impl ReconnectPolicy for ExponentialBackoff {
    fn next_delay(&mut self, consecutive_failures: u32) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if consecutive_failures > max => None,
            _ => Some(self.delay_for_attempt(consecutive_failures)),
        }
    }
}

/// Builds the configured policy.
pub fn from_settings(settings: &ReconnectSettings) -> Box<dyn ReconnectPolicy> {
    match settings.strategy {
        ReconnectStrategy::Fixed => Box::new(FixedDelay {
            delay: Duration::from_millis(settings.delay_ms),
            max_attempts: settings.max_attempts,
        }),
        ReconnectStrategy::Exponential => Box::new(ExponentialBackoff {
            base: Duration::from_millis(settings.delay_ms),
            max: Duration::from_millis(settings.max_delay_ms.max(settings.delay_ms)),
            jitter_factor: settings.jitter_factor,
            max_attempts: settings.max_attempts,
        }),
    }
}
