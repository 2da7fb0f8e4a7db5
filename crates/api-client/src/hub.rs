// In crates/api-client/src/hub.rs

use crate::{HubClient, Result, fetch_json};
use app_config::HubSettings;
use core_types::HierarchyNode;

impl HubClient {
    pub fn new(settings: &HubSettings) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: settings.base_url(),
            auth_token: settings.auth_token.clone(),
        }
    }

    /// Fetches the tag hierarchy from the hub.
    ///
    /// This corresponds to the `GET /get-tag-hierarchy` endpoint. The bearer
    /// header is only attached when a token is configured.
    pub async fn get_tag_hierarchy(&self) -> Result<HierarchyNode> {
        let url = format!("{}/get-tag-hierarchy", self.base_url);
        let mut request = self
            .http_client
            .get(&url)
            .header("Content-Type", "application/json");
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        fetch_json(request).await.inspect_err(|e| {
            tracing::error!(error = %e, "Error fetching tag hierarchy from hub.");
        })
    }
}
