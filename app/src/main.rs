// In app/src/main.rs

use anyhow::{Context, Result};
use api_client::PortfolioApi;
use app_config::Settings;
use clap::{Parser, Subcommand};
use events::StateUpdate;
use std::path::PathBuf;
use store::{Store, fetch_initial_data};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use self::live::{LinkStatus, LiveEvent};
use self::tracing_layer::{LogBuffer, LogBufferLayer};

mod dashboard;
mod live;
mod report;
mod tracing_layer;
mod ui;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "A terminal treemap of a portfolio's tag hierarchy with a live TWR feed.")]
struct Cli {
    /// Credential for the push endpoint. Overrides `push.token`.
    #[arg(long, global = true)]
    token: Option<String>,

    /// Directory holding `base.toml` and `<environment>.toml`.
    #[arg(long, global = true, default_value = "config")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the interactive treemap dashboard (the default).
    Dashboard,

    /// Fetches the hierarchy and TWR once and prints them.
    Snapshot {
        /// Print a JSON document instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Connects to the push endpoint and logs every routed update.
    Watch,
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut settings = app_config::load_settings_from(&cli.config_dir)
        .with_context(|| format!("Failed to load settings from {}", cli.config_dir.display()))?;
    if let Some(token) = cli.token {
        settings.push.token = Some(token);
    }

    let command = cli.command.unwrap_or(Commands::Dashboard);
    let log_buffer = LogBuffer::new();
    init_tracing(&settings.app.log_level, matches!(command, Commands::Dashboard).then(|| log_buffer.clone()));

    tracing::info!(environment = %settings.app.environment, "Starting portfolio dashboard");

    match command {
        Commands::Dashboard => dashboard::run(settings, log_buffer).await?,
        Commands::Snapshot { json } => handle_snapshot(&settings, json).await?,
        Commands::Watch => handle_watch(&settings).await?,
    }

    tracing::info!("Portfolio dashboard has finished successfully.");
    Ok(())
}

/// Installs the global subscriber. The dashboard owns stdout, so its logs go
/// to the in-memory buffer; headless commands log to stderr.
fn init_tracing(default_level: &str, buffer: Option<LogBuffer>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{default_level},hyper=warn,hyper_util=warn,reqwest=warn,tungstenite=warn,tokio_tungstenite=warn"
        ))
    });

    match buffer {
        Some(buffer) => tracing_subscriber::registry()
            .with(LogBufferLayer::new(buffer).with_filter(filter))
            .init(),
        None => tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_filter(filter))
            .init(),
    }
}

// --- "Snapshot" Subcommand Logic ---

async fn handle_snapshot(settings: &Settings, json: bool) -> Result<()> {
    let api = PortfolioApi::new(settings);
    let mut store = Store::new();
    fetch_initial_data(&mut store, &api).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report::snapshot_json(&store))?);
    } else {
        for line in report::snapshot_lines(&store) {
            println!("{line}");
        }
    }

    if report::nothing_loaded(&store) {
        anyhow::bail!("Both the hierarchy and the TWR fetch failed.");
    }
    Ok(())
}

// --- "Watch" Subcommand Logic ---

async fn handle_watch(settings: &Settings) -> Result<()> {
    let Some(token) = settings.push.token.clone() else {
        anyhow::bail!("Cannot watch: no push token configured. Set APP_PUSH__TOKEN or pass --token.");
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = live::build_client(settings, tx.clone())?;
    let push_task = tokio::spawn(live::run_client(client, token, tx));

    let outcome = loop {
        tokio::select! {
            Some(event) = rx.recv() => match event {
                LiveEvent::Update(update) => log_update(&update),
                LiveEvent::Link(LinkStatus::Rejected) => {
                    break Err(anyhow::anyhow!("The push endpoint rejected the credential."));
                }
                LiveEvent::Link(status) => tracing::info!(status = status.label(), "Push link status changed."),
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted; shutting down.");
                break Ok(());
            }
        }
    };

    push_task.abort();
    outcome
}

fn log_update(update: &StateUpdate) {
    match update {
        StateUpdate::Twr(snapshot) => tracing::info!(
            twr = %snapshot.formatted(),
            periods = snapshot.hpr_results.len(),
            symbols = snapshot.twr_contribution_by_symbol.len(),
            "TWR update."
        ),
        StateUpdate::Hierarchy(root) => tracing::info!(
            root = %root.name,
            children = root.children.len(),
            "Hierarchy update."
        ),
        StateUpdate::ServiceError(notice) => tracing::warn!(notice = %notice, "Service error notice."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_dashboard() {
        let cli = Cli::try_parse_from(["portfolio-dash"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config_dir, PathBuf::from("config"));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["portfolio-dash", "snapshot", "--json", "--token", "abc"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Snapshot { json: true })));
        assert_eq!(cli.token.as_deref(), Some("abc"));
    }
}
