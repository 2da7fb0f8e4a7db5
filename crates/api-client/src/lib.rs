// In crates/api-client/src/lib.rs

use app_config::{HierarchySource, ServiceEndpoint, Settings};
use core_types::{HierarchyNode, TwrSnapshot};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

pub mod error;
pub mod hub;
pub mod live_connector;
pub mod push_client;
pub mod reconnect;
pub mod subscription;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use live_connector::{AttemptId, Connector, LiveConnector, TransportEvent};
pub use push_client::{CloseInfo, ConnectionState, PushClient};
pub use reconnect::{ExponentialBackoff, FixedDelay, ReconnectPolicy};
pub use subscription::{SubscriptionAction, SubscriptionRequest};
pub use types::*;

impl ReporterClient {
    /// Constructs a new ReporterClient from its configured endpoint.
    pub fn new(settings: &ServiceEndpoint) -> Self {
        Self::with_base_url(settings.base_url())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        ReporterClient {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetches the portfolio's tag hierarchy.
    ///
    /// This corresponds to the `GET /get-portfolio-tag-hierarchy` endpoint.
    pub async fn get_tag_hierarchy(&self) -> Result<HierarchyNode> {
        let url = format!("{}/get-portfolio-tag-hierarchy", self.base_url);
        fetch_json(self.http_client.get(&url)).await
    }

    /// Fetches the latest TWR snapshot.
    ///
    /// This corresponds to the `GET /get-twr` endpoint.
    pub async fn get_twr(&self) -> Result<TwrSnapshot> {
        let url = format!("{}/get-twr", self.base_url);
        fetch_json(self.http_client.get(&url)).await
    }
}

/// Sends a request and decodes a 2xx JSON body.
///
/// A non-2xx status becomes `Error::HttpStatus` without reading the body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await.map_err(Error::RequestFailed)?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), url = %response.url(), "Request returned a non-success status.");
        return Err(Error::HttpStatus(status.as_u16()));
    }

    let text = response.text().await.map_err(Error::RequestFailed)?;
    serde_json::from_str(&text).map_err(Error::DeserializationFailed)
}

/// The request/response boundary the dashboard reads its snapshots from.
///
/// The TWR snapshot always comes from the reporter; the hierarchy comes from
/// whichever service `hierarchy_source` names.
#[derive(Debug, Clone)]
pub struct PortfolioApi {
    pub reporter: ReporterClient,
    pub hub: HubClient,
    pub hierarchy_source: HierarchySource,
}

impl PortfolioApi {
    pub fn new(settings: &Settings) -> Self {
        Self {
            reporter: ReporterClient::new(&settings.reporter),
            hub: HubClient::new(&settings.hub),
            hierarchy_source: settings.hierarchy_source,
        }
    }

    pub async fn get_tag_hierarchy(&self) -> Result<HierarchyNode> {
        match self.hierarchy_source {
            HierarchySource::Reporter => self.reporter.get_tag_hierarchy().await,
            HierarchySource::Hub => self.hub.get_tag_hierarchy().await,
        }
    }

    pub async fn get_twr(&self) -> Result<TwrSnapshot> {
        self.reporter.get_twr().await
    }
}
