// In crates/api-client/src/types.rs

use reqwest::Client;

/// The client for the reporter service's request/response endpoints.
#[derive(Debug, Clone)]
pub struct ReporterClient {
    /// The persistent HTTP client.
    pub http_client: Client,
    /// e.g. `http://localhost:8007`
    pub base_url: String,
}

/// The client for the hub service, which requires a bearer token.
#[derive(Debug, Clone)]
pub struct HubClient {
    pub http_client: Client,
    pub base_url: String,
    pub auth_token: Option<String>,
}
