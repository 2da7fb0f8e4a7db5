// In crates/app-config/src/types.rs

use serde::Deserialize;

use crate::{Error, Result};

/// The top-level settings for the dashboard.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// The reporter service, which serves the hierarchy and TWR snapshots.
    pub reporter: ServiceEndpoint,
    /// The hub service, an alternative hierarchy source.
    pub hub: HubSettings,
    /// Where the initial hierarchy is fetched from.
    pub hierarchy_source: HierarchySource,
    /// The push-update connection.
    pub push: PushSettings,
    /// Channels subscribed to as soon as the push connection opens.
    pub subscriptions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings::default(),
            reporter: ServiceEndpoint::default(),
            hub: HubSettings::default(),
            hierarchy_source: HierarchySource::default(),
            push: PushSettings::default(),
            subscriptions: default_subscriptions(),
        }
    }
}

impl Settings {
    /// Rejects settings that would only fail later at connect time.
    pub fn validate(&self) -> Result<()> {
        for (name, port) in [
            ("reporter", self.reporter.port),
            ("hub", self.hub.port),
            ("push", self.push.port),
        ] {
            if port == 0 {
                return Err(Error::Invalid(format!("{} port must be non-zero", name)));
            }
        }
        if !self.push.path.starts_with('/') {
            return Err(Error::Invalid(format!(
                "push path must start with '/', got {:?}",
                self.push.path
            )));
        }
        if self.push.reconnect.delay_ms == 0 {
            return Err(Error::Invalid("reconnect delay must be greater than zero".into()));
        }
        if !(0.0..=1.0).contains(&self.push.reconnect.jitter_factor) {
            return Err(Error::Invalid("reconnect jitter_factor must be within 0..=1".into()));
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: "development".into(),
            log_level: "info".into(),
        }
    }
}

/// A plain host/port pair for an HTTP service.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServiceEndpoint {
    pub host: String,
    pub port: u16,
}

impl ServiceEndpoint {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for ServiceEndpoint {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8007,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HubSettings {
    pub host: String,
    pub port: u16,
    /// Bearer token presented on hub requests.
    pub auth_token: Option<String>,
}

impl HubSettings {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 3000,
            auth_token: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HierarchySource {
    /// `GET /get-portfolio-tag-hierarchy` on the reporter.
    #[default]
    Reporter,
    /// `GET /get-tag-hierarchy` on the hub, with bearer auth.
    Hub,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PushSettings {
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Use `wss://` instead of `ws://`.
    pub secure: bool,
    /// The credential appended as `?token=`. The client stays idle without one.
    pub token: Option<String>,
    pub reconnect: ReconnectSettings,
}

impl PushSettings {
    /// The endpoint without the credential, e.g. `ws://localhost:8765/ws`.
    pub fn endpoint(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{}://{}:{}{}", scheme, self.host, self.port, self.path)
    }
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8765,
            path: "/ws".into(),
            secure: false,
            token: None,
            reconnect: ReconnectSettings::default(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReconnectStrategy {
    #[default]
    Fixed,
    Exponential,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ReconnectSettings {
    pub strategy: ReconnectStrategy,
    /// Fixed delay, or the base delay for exponential backoff.
    pub delay_ms: u64,
    /// Ceiling for exponential backoff. Ignored by the fixed strategy.
    pub max_delay_ms: u64,
    /// Relative jitter for exponential backoff. Ignored by the fixed strategy.
    pub jitter_factor: f64,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            strategy: ReconnectStrategy::Fixed,
            delay_ms: 5000,
            max_delay_ms: 60_000,
            jitter_factor: 0.0,
            max_attempts: None,
        }
    }
}

fn default_subscriptions() -> Vec<String> {
    vec![
        "Consumer.TwrUpdate".to_string(),
        "Consumer.PortfolioUpdate".to_string(),
    ]
}
