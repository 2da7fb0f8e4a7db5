// In crates/api-client/src/push_client.rs

use crate::live_connector::{AttemptId, Connector, LiveConnector, TransportEvent, redacted};
use crate::reconnect::{self, ReconnectPolicy};
use crate::subscription::SubscriptionRequest;
use crate::{Error, Result};
use app_config::PushSettings;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use url::Url;

/// Close code the hub uses to reject a credential.
pub const CREDENTIAL_REJECTED_CODE: u16 = 4001;
/// Close reason fragment that also marks a rejected credential.
pub const INVALID_CREDENTIAL_MARKER: &str = "Invalid JWT";

pub type OpenHandler = Box<dyn FnMut(&mut PushClient) + Send>;
pub type MessageHandler = Box<dyn FnMut(&mut PushClient, &Value) + Send>;
pub type CloseHandler = Box<dyn FnMut(&mut PushClient, &CloseInfo) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// What close handlers are told about a closed connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: Option<u16>,
    pub reason: String,
    pub credential_rejected: bool,
}

impl CloseInfo {
    fn new(code: Option<u16>, reason: String) -> Self {
        let credential_rejected =
            code == Some(CREDENTIAL_REJECTED_CODE) || reason.contains(INVALID_CREDENTIAL_MARKER);
        Self { code, reason, credential_rejected }
    }
}

#[derive(Debug, Clone)]
struct ScheduledReconnect {
    due: Instant,
    token: String,
}

enum Wakeup {
    Transport(Option<TransportEvent>),
    ReconnectDue,
}

/// Owns the single long-lived push-update connection.
///
/// The client is a single-writer state machine: every transition happens on
/// whichever task drives [`PushClient::process_next`]. Handlers run inline, in
/// registration order, with mutable access to the client so they can `send`.
pub struct PushClient {
    endpoint: Url,
    state: ConnectionState,
    connecting: bool,
    token: Option<String>,
    attempt: AttemptId,
    outbound: Option<mpsc::UnboundedSender<String>>,
    connector: Box<dyn Connector>,
    policy: Box<dyn ReconnectPolicy>,
    consecutive_failures: u32,
    reconnect: Option<ScheduledReconnect>,
    events_tx: mpsc::UnboundedSender<TransportEvent>,
    events_rx: mpsc::UnboundedReceiver<TransportEvent>,
    open_handlers: Vec<OpenHandler>,
    message_handlers: Vec<MessageHandler>,
    close_handlers: Vec<CloseHandler>,
}

impl PushClient {
    /// Creates a disconnected client for `endpoint` (e.g. `ws://localhost:8765/ws`).
    pub fn new(
        endpoint: &str,
        connector: Box<dyn Connector>,
        policy: Box<dyn ReconnectPolicy>,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(Self {
            endpoint,
            state: ConnectionState::Disconnected,
            connecting: false,
            token: None,
            attempt: 0,
            outbound: None,
            connector,
            policy,
            consecutive_failures: 0,
            reconnect: None,
            events_tx,
            events_rx,
            open_handlers: Vec::new(),
            message_handlers: Vec::new(),
            close_handlers: Vec::new(),
        })
    }

    /// A client backed by real WebSocket connections and the configured policy.
    pub fn from_settings(settings: &PushSettings) -> Result<Self> {
        Self::new(
            &settings.endpoint(),
            Box::new(LiveConnector::new()),
            reconnect::from_settings(&settings.reconnect),
        )
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// The credential in use, cleared when the hub rejects it.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// When the next automatic reconnect fires, if one is scheduled.
    pub fn reconnect_due(&self) -> Option<Instant> {
        self.reconnect.as_ref().map(|r| r.due)
    }

    pub fn on_open<F>(&mut self, handler: F)
    where
        F: FnMut(&mut PushClient) + Send + 'static,
    {
        self.open_handlers.push(Box::new(handler));
    }

    pub fn on_message<F>(&mut self, handler: F)
    where
        F: FnMut(&mut PushClient, &Value) + Send + 'static,
    {
        self.message_handlers.push(Box::new(handler));
    }

    pub fn on_close<F>(&mut self, handler: F)
    where
        F: FnMut(&mut PushClient, &CloseInfo) + Send + 'static,
    {
        self.close_handlers.push(Box::new(handler));
    }

    /// Starts a connection attempt with `token`.
    ///
    /// Returns `false` without doing anything unless the client is
    /// `Disconnected` with no attempt in flight.
    pub fn connect(&mut self, token: &str) -> bool {
        if self.state != ConnectionState::Disconnected || self.connecting {
            tracing::debug!(state = ?self.state, "Connect ignored; a connection is already active or in flight.");
            return false;
        }

        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("token", token);

        self.connecting = true;
        self.state = ConnectionState::Connecting;
        self.token = Some(token.to_string());
        self.attempt += 1;

        tracing::info!(endpoint = %redacted(&url), attempt = self.attempt, "Connecting to push endpoint...");
        self.connector.connect(self.attempt, url, self.events_tx.clone());
        true
    }

    /// Transmits `payload` if connected. Nothing is queued: a payload sent
    /// while disconnected is dropped and reported as `NotConnected`.
    pub fn send(&self, payload: &str) -> Result<()> {
        let outbound = match (&self.state, &self.outbound) {
            (ConnectionState::Connected, Some(outbound)) => outbound,
            _ => {
                tracing::warn!(payload, "Push connection is not open. Message not sent.");
                return Err(Error::NotConnected);
            }
        };
        tracing::debug!(payload, "Sending push frame.");
        outbound.send(payload.to_string()).map_err(|_| {
            tracing::warn!(payload, "Push connection went away before the frame was written.");
            Error::NotConnected
        })
    }

    /// Encodes and sends a subscription request.
    pub fn send_subscription(&self, request: &SubscriptionRequest) -> Result<()> {
        let payload = request.encode()?;
        tracing::info!(channels = ?request.channels, action = ?request.action, "Sending subscription request.");
        self.send(&payload)
    }

    /// Tears the connection down without scheduling a reconnect.
    ///
    /// Late events from the closed connection are ignored, so close handlers
    /// do not fire for an explicit close.
    pub fn close(&mut self) {
        tracing::info!(state = ?self.state, "Closing push connection.");
        self.attempt += 1;
        self.state = ConnectionState::Disconnected;
        self.connecting = false;
        self.outbound = None;
        self.reconnect = None;
    }

    /// Waits for the next transport event or the reconnect timer and applies it.
    ///
    /// Cancel safe: dropping the future before it completes loses nothing.
    pub async fn process_next(&mut self) {
        let due = self.reconnect_due();
        let wakeup = tokio::select! {
            event = self.events_rx.recv() => Wakeup::Transport(event),
            _ = sleep_until_due(due) => Wakeup::ReconnectDue,
        };

        match wakeup {
            Wakeup::Transport(Some(event)) => self.handle_event(event),
            // The client holds a sender, so the channel never closes.
            Wakeup::Transport(None) => {}
            Wakeup::ReconnectDue => self.fire_reconnect(),
        }
    }

    /// Applies one transport event. Events from superseded attempts are ignored.
    pub fn handle_event(&mut self, event: TransportEvent) {
        if event.attempt() != self.attempt {
            tracing::trace!(attempt = event.attempt(), current = self.attempt, "Ignoring stale transport event.");
            return;
        }

        match event {
            TransportEvent::Opened { outbound, .. } => self.handle_open(outbound),
            TransportEvent::Message { text, .. } => self.handle_message(&text),
            TransportEvent::Closed { code, reason, .. } => self.handle_close(CloseInfo::new(code, reason)),
            TransportEvent::Error { error, .. } => {
                tracing::error!(error = %error, "Push connection error.");
                // The close event that follows is the authoritative transition.
                self.connecting = false;
            }
        }
    }

    fn handle_open(&mut self, outbound: mpsc::UnboundedSender<String>) {
        self.state = ConnectionState::Connected;
        self.connecting = false;
        self.outbound = Some(outbound);
        self.consecutive_failures = 0;
        self.policy.reset();
        self.reconnect = None;
        tracing::info!(endpoint = %self.endpoint, "Push connection established.");

        let mut handlers = std::mem::take(&mut self.open_handlers);
        for handler in handlers.iter_mut() {
            handler(self);
        }
        // Handlers registered during the fan-out go after the existing ones.
        handlers.append(&mut self.open_handlers);
        self.open_handlers = handlers;
    }

    fn handle_message(&mut self, text: &str) {
        let payload: Value = match serde_json::from_str(text) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed push frame.");
                return;
            }
        };
        tracing::trace!(%payload, "Push frame received.");

        let mut handlers = std::mem::take(&mut self.message_handlers);
        for handler in handlers.iter_mut() {
            handler(self, &payload);
        }
        handlers.append(&mut self.message_handlers);
        self.message_handlers = handlers;
    }

    fn handle_close(&mut self, info: CloseInfo) {
        self.state = ConnectionState::Disconnected;
        self.connecting = false;
        self.outbound = None;
        tracing::info!(code = ?info.code, reason = %info.reason, "Push connection closed.");

        if info.credential_rejected {
            tracing::warn!("Push credential is invalid or expired. Clearing it; no reconnect will be attempted.");
            self.token = None;
            self.reconnect = None;
        } else if let Some(token) = self.token.clone() {
            self.consecutive_failures += 1;
            match self.policy.next_delay(self.consecutive_failures) {
                Some(delay) => {
                    tracing::info!(delay_ms = delay.as_millis() as u64, "Scheduling push reconnect.");
                    self.reconnect = Some(ScheduledReconnect { due: Instant::now() + delay, token });
                }
                None => {
                    tracing::warn!(failures = self.consecutive_failures, "Reconnect policy exhausted; staying disconnected.");
                    self.reconnect = None;
                }
            }
        }

        let mut handlers = std::mem::take(&mut self.close_handlers);
        for handler in handlers.iter_mut() {
            handler(self, &info);
        }
        handlers.append(&mut self.close_handlers);
        self.close_handlers = handlers;
    }

    fn fire_reconnect(&mut self) {
        if let Some(scheduled) = self.reconnect.take() {
            tracing::info!("Reconnect timer fired.");
            self.connect(&scheduled.token);
        }
    }
}

async fn sleep_until_due(due: Option<Instant>) {
    match due {
        Some(due) => sleep_until(due).await,
        None => std::future::pending().await,
    }
}
