// In app/src/live.rs

use api_client::{CloseInfo, ConnectionState, PushClient, SubscriptionRequest};
use app_config::Settings;
use events::{StateUpdate, dispatch_value};
use tokio::sync::mpsc;

/// Push-connection status as the dashboard shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStatus {
    /// No credential configured; the client was never started.
    #[default]
    Offline,
    Connecting,
    Connected,
    Disconnected { retrying: bool },
    /// The hub refused the credential. Terminal until a new one is supplied.
    Rejected,
}

impl LinkStatus {
    pub fn label(self) -> &'static str {
        match self {
            LinkStatus::Offline => "offline (no token)",
            LinkStatus::Connecting => "connecting",
            LinkStatus::Connected => "live",
            LinkStatus::Disconnected { retrying: true } => "disconnected, retrying",
            LinkStatus::Disconnected { retrying: false } => "disconnected",
            LinkStatus::Rejected => "credential rejected",
        }
    }

    fn after_close(info: &CloseInfo, client: &PushClient) -> Self {
        if info.credential_rejected {
            LinkStatus::Rejected
        } else {
            LinkStatus::Disconnected {
                retrying: client.reconnect_due().is_some(),
            }
        }
    }
}

/// What the push task forwards to whoever owns the store.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    Update(StateUpdate),
    Link(LinkStatus),
}

/// Builds a push client whose handlers subscribe on open and forward routed
/// updates and status changes to `tx`.
pub fn build_client(settings: &Settings, tx: mpsc::UnboundedSender<LiveEvent>) -> anyhow::Result<PushClient> {
    let mut client = PushClient::from_settings(&settings.push)?;
    let subscription = SubscriptionRequest::subscribe(settings.subscriptions.clone());

    let open_tx = tx.clone();
    client.on_open(move |client| {
        let _ = open_tx.send(LiveEvent::Link(LinkStatus::Connected));
        // A failed send was already logged; the next open resubscribes.
        let _ = client.send_subscription(&subscription);
    });

    let message_tx = tx.clone();
    client.on_message(move |_client, payload| {
        if let Some(update) = dispatch_value(payload) {
            let _ = message_tx.send(LiveEvent::Update(update));
        }
    });

    client.on_close(move |client, info| {
        let _ = tx.send(LiveEvent::Link(LinkStatus::after_close(info, client)));
    });

    Ok(client)
}

/// Drives `client` forever: connects with `token`, then applies transport
/// events and reconnect timers as they come. Meant to be spawned.
pub async fn run_client(mut client: PushClient, token: String, tx: mpsc::UnboundedSender<LiveEvent>) {
    if client.connect(&token) {
        let _ = tx.send(LiveEvent::Link(LinkStatus::Connecting));
    }
    loop {
        let before = client.state();
        client.process_next().await;
        // Open and close are reported by the handlers; a fired reconnect is not.
        if before != ConnectionState::Connecting && client.state() == ConnectionState::Connecting {
            let _ = tx.send(LiveEvent::Link(LinkStatus::Connecting));
        }
    }
}
