// In crates/api-client/tests/reporter_http.rs

use api_client::{Error, HubClient, ReporterClient};
use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::get};
use serde_json::{Value, json};
use tokio::net::TcpListener;

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn sample_hierarchy() -> Value {
    json!({
        "name": "Portfolio",
        "value": 100.0,
        "node_type": "root",
        "tag_id": null,
        "symbol": null,
        "weight": null,
        "children": [
            {"name": "Tech", "value": 70.0, "node_type": "tag", "tag_id": "1", "symbol": null, "weight": null, "children": []},
            {"name": "Energy", "value": 30.0, "node_type": "tag", "tag_id": "2", "symbol": null, "weight": null, "children": []}
        ]
    })
}

#[tokio::test]
async fn test_reporter_serves_hierarchy_and_twr() {
    let router = Router::new()
        .route("/get-portfolio-tag-hierarchy", get(|| async { Json(sample_hierarchy()) }))
        .route(
            "/get-twr",
            get(|| async { Json(json!({"hpr_results": [], "twr": 0.015, "twr_contribution_by_symbol": {"AAPL": 0.01}})) }),
        );
    let client = ReporterClient::with_base_url(serve(router).await);

    let hierarchy = client.get_tag_hierarchy().await.unwrap();
    assert_eq!(hierarchy.name, "Portfolio");
    assert_eq!(hierarchy.children.len(), 2);

    let twr = client.get_twr().await.unwrap();
    assert_eq!(twr.twr, 0.015);
    assert_eq!(twr.twr_contribution_by_symbol["AAPL"], 0.01);
}

#[tokio::test]
async fn test_non_success_status_reports_the_code() {
    let router = Router::new().route(
        "/get-portfolio-tag-hierarchy",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = ReporterClient::with_base_url(serve(router).await);

    let err = client.get_tag_hierarchy().await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus(500)));
    assert_eq!(err.to_string(), "HTTP error! status: 500");
}

#[tokio::test]
async fn test_missing_route_is_a_404() {
    let client = ReporterClient::with_base_url(serve(Router::new()).await);
    assert!(matches!(client.get_twr().await, Err(Error::HttpStatus(404))));
}

#[tokio::test]
async fn test_unparseable_body_is_a_deserialization_error() {
    let router = Router::new().route("/get-twr", get(|| async { "not json" }));
    let client = ReporterClient::with_base_url(serve(router).await);
    assert!(matches!(client.get_twr().await, Err(Error::DeserializationFailed(_))));
}

#[tokio::test]
async fn test_unreachable_service_is_a_request_failure() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ReporterClient::with_base_url(format!("http://{}", addr));
    assert!(matches!(client.get_twr().await, Err(Error::RequestFailed(_))));
}

#[tokio::test]
async fn test_hub_sends_bearer_token() {
    let router = Router::new().route(
        "/get-tag-hierarchy",
        get(|headers: HeaderMap| async move {
            match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                Some("Bearer secret") => Ok(Json(sample_hierarchy())),
                _ => Err(StatusCode::UNAUTHORIZED),
            }
        }),
    );
    let base_url = serve(router).await;

    let authorized = HubClient {
        http_client: reqwest::Client::new(),
        base_url: base_url.clone(),
        auth_token: Some("secret".into()),
    };
    assert_eq!(authorized.get_tag_hierarchy().await.unwrap().name, "Portfolio");

    let anonymous = HubClient {
        http_client: reqwest::Client::new(),
        base_url,
        auth_token: None,
    };
    assert!(matches!(anonymous.get_tag_hierarchy().await, Err(Error::HttpStatus(401))));
}
