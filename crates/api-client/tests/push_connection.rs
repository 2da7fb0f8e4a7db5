// In crates/api-client/tests/push_connection.rs

use api_client::{
    CloseInfo, ConnectionState, FixedDelay, LiveConnector, PushClient, SubscriptionRequest,
};
use axum::{
    Router,
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

type Received = mpsc::UnboundedSender<String>;

async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HashMap<String, String>>,
    State(received): State<Received>,
) -> impl IntoResponse {
    let token = params.get("token").cloned().unwrap_or_default();
    ws.on_upgrade(move |socket| handle_socket(socket, token, received))
}

/// Rejects any token but "good"; otherwise waits for the subscription, pushes
/// a malformed frame and a TWR update, then closes with a restart code.
async fn handle_socket(mut socket: WebSocket, token: String, received: Received) {
    if token != "good" {
        let _ = socket
            .send(Message::Close(Some(CloseFrame { code: 4001, reason: "Invalid JWT".into() })))
            .await;
        return;
    }

    if let Some(Ok(Message::Text(text))) = socket.recv().await {
        let _ = received.send(text.as_str().to_owned());
    }
    let _ = socket.send(Message::Text("{broken".into())).await;
    let _ = socket
        .send(Message::Text(
            r#"{"channel":"Consumer.TwrUpdate","message":{"hpr_results":[],"twr":0.015,"twr_contribution_by_symbol":{}}}"#.into(),
        ))
        .await;
    let _ = socket
        .send(Message::Close(Some(CloseFrame { code: 1012, reason: "service restart".into() })))
        .await;
}

async fn serve() -> (String, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let router = Router::new().route("/ws", get(ws_handler)).with_state(tx);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("ws://{}/ws", addr), rx)
}

struct Recorded {
    messages: Arc<Mutex<Vec<Value>>>,
    closes: Arc<Mutex<Vec<CloseInfo>>>,
}

fn instrumented_client(endpoint: &str) -> (PushClient, Recorded) {
    let mut client = PushClient::new(
        endpoint,
        Box::new(LiveConnector::new()),
        Box::new(FixedDelay { delay: Duration::from_secs(60), max_attempts: None }),
    )
    .unwrap();

    client.on_open(|client| {
        let request = SubscriptionRequest::subscribe(["Consumer.TwrUpdate", "Consumer.PortfolioUpdate"]);
        let _ = client.send_subscription(&request);
    });

    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = messages.clone();
    client.on_message(move |_, payload| sink.lock().unwrap().push(payload.clone()));

    let closes = Arc::new(Mutex::new(Vec::new()));
    let sink = closes.clone();
    client.on_close(move |_, info| sink.lock().unwrap().push(info.clone()));

    (client, Recorded { messages, closes })
}

async fn drive_until_closed(client: &mut PushClient, recorded: &Recorded) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while recorded.closes.lock().unwrap().is_empty() {
            client.process_next().await;
        }
    })
    .await
    .expect("push connection did not close in time");
}

#[tokio::test]
async fn test_subscribes_on_open_and_delivers_parsed_frames() {
    let (endpoint, mut received) = serve().await;
    let (mut client, recorded) = instrumented_client(&endpoint);

    assert!(client.connect("good"));
    drive_until_closed(&mut client, &recorded).await;

    assert_eq!(
        received.recv().await.unwrap(),
        r#"{"action":"subscribe","channels":["Consumer.TwrUpdate","Consumer.PortfolioUpdate"]}"#
    );

    let messages = recorded.messages.lock().unwrap();
    assert_eq!(messages.len(), 1, "the malformed frame must be dropped");
    assert_eq!(messages[0]["channel"], "Consumer.TwrUpdate");
    assert_eq!(messages[0]["message"]["twr"], 0.015);

    let closes = recorded.closes.lock().unwrap();
    assert_eq!(closes[0].code, Some(1012));
    assert!(!closes[0].credential_rejected);
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert_eq!(client.token(), Some("good"));
    assert!(client.reconnect_due().is_some());
}

#[tokio::test]
async fn test_rejected_credential_is_terminal() {
    let (endpoint, _received) = serve().await;
    let (mut client, recorded) = instrumented_client(&endpoint);

    client.connect("expired");
    drive_until_closed(&mut client, &recorded).await;

    let closes = recorded.closes.lock().unwrap();
    assert_eq!(closes[0].code, Some(4001));
    assert!(closes[0].credential_rejected);
    assert_eq!(client.token(), None);
    assert_eq!(client.reconnect_due(), None);
    assert!(recorded.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_refused_connection_schedules_retry() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (mut client, recorded) = instrumented_client(&format!("ws://{}/ws", addr));
    client.connect("good");
    drive_until_closed(&mut client, &recorded).await;

    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert_eq!(client.token(), Some("good"));
    assert!(client.reconnect_due().is_some());
}
