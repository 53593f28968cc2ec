//! nginx-sync
//!
//! Keeps an nginx configuration in step with service discovery.
//!
//! # Architecture Overview
//!
//! ```text
//!   watcher state file ──▶ watcher::source ──▶ ┌──────────────────────────────┐
//!          │                                   │        NginxGenerator        │
//!          └── notify ──▶ StateWatcher ──────▶ │                              │
//!                                              │  stanza builders             │
//!   tick interval ───────────────────────────▶ │    ▲ revision cache          │
//!                                              │  assembler                   │
//!                                              │  change-gated writer ────────┼──▶ nginx.conf
//!                                              │  restart limiter ────────────┼──▶ check / start / reload
//!                                              └──────────────────────────────┘
//! ```
//!
//! The generator is synchronous; the async shell only multiplexes the tick
//! interval, state-file updates and Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::task;

use nginx_sync::config::load_config;
use nginx_sync::lifecycle::Shutdown;
use nginx_sync::observability::logging;
use nginx_sync::watcher::file_watcher::StateWatcher;
use nginx_sync::watcher::load_watchers;
use nginx_sync::NginxGenerator;

#[derive(Parser)]
#[command(name = "nginx-sync")]
#[command(about = "Generate nginx configuration from service discovery state", long_about = None)]
struct Cli {
    /// Generator configuration (TOML).
    #[arg(short, long)]
    config: PathBuf,

    /// Watcher state file (JSON), re-read whenever it changes.
    #[arg(short, long)]
    watchers: PathBuf,

    /// Seconds between virtual clock ticks.
    #[arg(long, default_value_t = 1)]
    tick_secs: u64,

    /// Generate and apply once, then exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init(&config.logging.level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        watchers = ?cli.watchers,
        "nginx-sync starting"
    );

    let mut generator = NginxGenerator::new(config)?;
    let watchers = load_watchers(&cli.watchers)?;
    let changed = task::block_in_place(|| generator.update_config(&watchers))?;
    tracing::info!(services = watchers.len(), changed, "Initial configuration applied");

    if cli.once {
        return Ok(());
    }

    let (state_watcher, mut updates) = StateWatcher::new(&cli.watchers);
    let _watch_handle = state_watcher.run()?;

    let shutdown = Arc::new(Shutdown::new());
    let mut shutdown_rx = shutdown.subscribe();
    tokio::spawn({
        let shutdown = Arc::clone(&shutdown);
        async move { shutdown.trigger_on_ctrl_c().await }
    });

    let mut ticker = tokio::time::interval(Duration::from_secs(cli.tick_secs.max(1)));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                task::block_in_place(|| generator.tick());
            }
            Some(watchers) = updates.recv() => {
                match task::block_in_place(|| generator.update_config(&watchers)) {
                    Ok(changed) => {
                        tracing::info!(services = watchers.len(), changed, "Watcher state applied");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to generate nginx config, keeping previous config");
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                break;
            }
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
