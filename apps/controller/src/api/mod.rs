//! Boundary to the remote simulation engine.
//!
//! `GameSession` talks to the engine exclusively through the
//! [`SimulationApi`] trait; `http::HttpSimulationApi` is the production
//! implementation, and tests script their own.

pub mod http;

use async_trait::async_trait;

use crate::domain::config::SessionConfig;
use crate::error::AppError;
use crate::protocol::Snapshot;

/// The four operations the engine exposes. Every success returns a full
/// authoritative snapshot.
#[async_trait]
pub trait SimulationApi: Send + Sync {
    /// Create a fresh session (`POST /api/start/`).
    async fn start(&self, config: &SessionConfig) -> Result<Snapshot, AppError>;

    /// Fetch the current state (`GET /api/stats/`). Yields
    /// `AppError::NoActiveSession` when the engine has no session.
    async fn status(&self) -> Result<Snapshot, AppError>;

    /// Advance the simulation by one round (`POST /api/next-round/`).
    async fn next_round(&self) -> Result<Snapshot, AppError>;

    /// Tear the remote session down (`POST /api/stop/`).
    async fn stop(&self) -> Result<Snapshot, AppError>;
}
