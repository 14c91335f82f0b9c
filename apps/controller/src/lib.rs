#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod protocol;
pub mod services;

// Re-exports for public API
pub use api::http::HttpSimulationApi;
pub use api::SimulationApi;
pub use config::remote::RemoteConfig;
pub use domain::config::SessionConfig;
pub use domain::session::{Lifecycle, Session};
pub use error::AppError;
pub use protocol::{AgentMarker, GridPos, Snapshot, GRID_SIZE};
pub use services::game_session::GameSession;
pub use services::scheduler::{RoundScheduler, TickOutcome};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
