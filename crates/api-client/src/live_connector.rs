// In crates/api-client/src/live_connector.rs

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Identifies one connection attempt. Events from older attempts are stale.
pub type AttemptId = u64;

/// Close code reported when the transport dies without a close handshake.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// What a connection attempt reports back to the push client.
#[derive(Debug)]
pub enum TransportEvent {
    /// The handshake completed. Frames pushed into `outbound` are written
    /// as text frames; dropping it closes the connection.
    Opened {
        attempt: AttemptId,
        outbound: mpsc::UnboundedSender<String>,
    },
    /// One inbound text frame, unparsed.
    Message { attempt: AttemptId, text: String },
    /// The connection is gone. Always the last event of an attempt.
    Closed {
        attempt: AttemptId,
        code: Option<u16>,
        reason: String,
    },
    /// A transport-level error. A `Closed` event follows.
    Error { attempt: AttemptId, error: String },
}

impl TransportEvent {
    pub fn attempt(&self) -> AttemptId {
        match self {
            TransportEvent::Opened { attempt, .. }
            | TransportEvent::Message { attempt, .. }
            | TransportEvent::Closed { attempt, .. }
            | TransportEvent::Error { attempt, .. } => *attempt,
        }
    }
}

/// Starts connection attempts on behalf of the push client.
///
/// Implementations must not block: the attempt runs elsewhere and reports its
/// lifecycle through `events`.
pub trait Connector: Send {
    fn connect(&mut self, attempt: AttemptId, url: Url, events: mpsc::UnboundedSender<TransportEvent>);
}

/// A connector that opens real WebSocket connections with tokio-tungstenite.
#[derive(Clone, Debug, Default)]
pub struct LiveConnector;

impl LiveConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for LiveConnector {
    fn connect(&mut self, attempt: AttemptId, url: Url, events: mpsc::UnboundedSender<TransportEvent>) {
        tokio::spawn(run_connection(attempt, url, events));
    }
}

/// The endpoint with the query string stripped, safe to log.
pub(crate) fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

async fn run_connection(attempt: AttemptId, url: Url, events: mpsc::UnboundedSender<TransportEvent>) {
    tracing::debug!(url = %redacted(&url), attempt, "Opening WebSocket connection...");
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            let _ = events.send(TransportEvent::Error { attempt, error: e.to_string() });
            let _ = events.send(TransportEvent::Closed {
                attempt,
                code: Some(ABNORMAL_CLOSURE),
                reason: String::new(),
            });
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    if events.send(TransportEvent::Opened { attempt, outbound: outbound_tx }).is_err() {
        // The client is gone; nobody is listening.
        return;
    }

    let (code, reason) = loop {
        tokio::select! {
            outgoing = outbound_rx.recv() => match outgoing {
                Some(text) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        let _ = events.send(TransportEvent::Error { attempt, error: e.to_string() });
                        break (Some(ABNORMAL_CLOSURE), String::new());
                    }
                }
                None => {
                    // The client dropped its sender: explicit teardown.
                    let _ = write.send(Message::Close(None)).await;
                    break (Some(1000), "client closed".to_string());
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(TransportEvent::Message { attempt, text: text.as_str().to_owned() });
                }
                Some(Ok(Message::Close(frame))) => {
                    break match frame {
                        Some(frame) => (Some(u16::from(frame.code)), frame.reason.as_str().to_owned()),
                        None => (None, String::new()),
                    };
                }
                Some(Ok(Message::Binary(bytes))) => {
                    tracing::debug!(len = bytes.len(), "Ignoring binary push frame.");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    let _ = events.send(TransportEvent::Error { attempt, error: e.to_string() });
                    break (Some(ABNORMAL_CLOSURE), String::new());
                }
                None => break (Some(ABNORMAL_CLOSURE), String::new()),
            }
        }
    };

    let _ = events.send(TransportEvent::Closed { attempt, code, reason });
}
