//! Headless control surface for the waste-collection engine.
//!
//! Adopts an existing remote session or starts a fresh one, then follows
//! the auto-run to completion, logging progress. Ctrl-C stops the remote
//! session cleanly before exiting.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use controller::{
    AppError, GameSession, GridPos, HttpSimulationApi, Lifecycle, RemoteConfig, SessionConfig,
};
use tracing::{error, info, warn};

mod telemetry;

#[derive(Parser)]
#[command(name = "controller")]
#[command(about = "Session controller for the waste-collection simulation engine")]
struct Args {
    /// Number of agents for a new session
    #[arg(long, default_value = "5")]
    agents: u32,

    /// Number of wastes for a new session
    #[arg(long, default_value = "20")]
    wastes: u32,

    /// Base X coordinate (0..=31)
    #[arg(long, default_value = "15")]
    base_x: i32,

    /// Base Y coordinate (0..=31)
    #[arg(long, default_value = "15")]
    base_y: i32,

    /// Engine base URL (overrides SIM_API_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Auto-run cadence in milliseconds (overrides SIM_TICK_INTERVAL_MS)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    telemetry::init_tracing(args.verbose);

    let mut remote = RemoteConfig::from_env()?;
    if let Some(base_url) = args.base_url {
        remote.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(tick_ms) = args.tick_ms {
        remote.tick_interval = Duration::from_millis(tick_ms);
    }
    info!(base_url = %remote.base_url, tick_ms = remote.tick_interval.as_millis() as u64, "connecting");

    let api = Arc::new(HttpSimulationApi::new(&remote)?);
    let session = GameSession::new(api, remote.tick_interval);

    session.initialize().await?;
    match session.lifecycle() {
        Lifecycle::NoSession => {
            let config = SessionConfig::new(args.agents, args.wastes, GridPos(args.base_x, args.base_y))?;
            session.start(&config).await?;
        }
        Lifecycle::Active => {
            info!("resuming adopted session");
            session.toggle_pause();
        }
        Lifecycle::Complete => {
            info!("remote session is already complete");
            return Ok(());
        }
        lifecycle => warn!(?lifecycle, "unexpected lifecycle after initialize"),
    }

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(err) = result {
                    warn!(error = %err, "ctrl-c handler failed; stopping");
                }
                info!("interrupt received; stopping session");
                session.stop().await?;
                return Ok(());
            }
            _ = tokio::time::sleep(Duration::from_millis(500)) => {
                match session.lifecycle() {
                    Lifecycle::Complete => {
                        if let Some(snapshot) = session.snapshot() {
                            info!(
                                turns = snapshot.turn_number,
                                collected = snapshot.waste_collected,
                                "all waste collected"
                            );
                        }
                        return Ok(());
                    }
                    Lifecycle::Paused => {
                        // Auto-run only pauses itself on failure.
                        let detail = session.last_error().unwrap_or_else(|| "unknown".into());
                        error!(detail = %detail, "auto-run paused on failure; exiting");
                        return Err(AppError::remote(detail));
                    }
                    _ => {
                        if let Some(snapshot) = session.snapshot() {
                            info!(
                                turn = snapshot.turn_number,
                                collected = snapshot.waste_collected,
                                total = snapshot.total_wastes,
                                "in progress"
                            );
                        }
                    }
                }
            }
        }
    }
}
