//! Arena Dash - terminal dashboard for the AI Trading Robots Arena
//!
//! Polls the arena backend on a fixed interval and shows robots, trades,
//! market analytics and the prediction leaderboard. With `ui.headless` set
//! it logs a text summary of every refresh instead of drawing.

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use arena_dash::api::ArenaClient;
use arena_dash::config::AppConfig;
use arena_dash::dashboard::{RefreshController, RefreshHandle};
use arena_dash::ui::{self, views, App};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config)?;

    info!("Arena Dash v{}", env!("CARGO_PKG_VERSION"));
    info!("Config: {}", config);

    let client = ArenaClient::new(&config.api.base_url, config.request_timeout())
        .context("Failed to build HTTP client")?;
    let handle = RefreshController::new(
        Arc::new(client),
        config.refresh_interval(),
        config.refresh.detailed_trades_limit,
    )
    .spawn();

    let result = if config.ui.headless {
        run_headless(&handle).await
    } else {
        run_tui(&config, &handle).await
    };

    handle.shutdown().await;
    info!("Arena Dash stopped");
    result
}

/// Used when `RUST_LOG` is unset, applies to dependencies too
const DEFAULT_LOG_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// The TUI owns the terminal, so logs go to a file unless running headless
fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = env_filter();

    let writer = if config.ui.headless {
        BoxMakeWriter::new(std::io::stdout)
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.logging.file)
            .with_context(|| format!("Failed to open log file {}", config.logging.file))?;
        BoxMakeWriter::new(Mutex::new(file))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(config.ui.headless);

    let installed = if config.logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("Failed to install log subscriber: {}", e))
}

async fn run_tui(config: &AppConfig, handle: &RefreshHandle) -> Result<()> {
    let mut terminal = ratatui::try_init().context("Failed to set up terminal")?;
    let mut app = App::new(config);

    let result = ui::app::run(&mut terminal, &mut app, handle, config.tick_rate()).await;

    if let Err(e) = ratatui::try_restore() {
        warn!("Failed to restore terminal: {}", e);
    }
    result
}

async fn run_headless(handle: &RefreshHandle) -> Result<()> {
    let mut state_rx = handle.subscribe();
    info!("Running headless, Ctrl-C to stop");

    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    warn!("Refresh task stopped");
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                info!(
                    cycle = state.cycle,
                    unavailable = state.unavailable.len(),
                    "Dashboard refreshed"
                );
                for line in views::summary_lines(&state) {
                    info!("{}", line);
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                info!("Ctrl-C received");
                break;
            }
        }
    }
    Ok(())
}
