//! HTTP implementation of [`SimulationApi`] over the engine's JSON API.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::debug;

use crate::api::SimulationApi;
use crate::config::remote::RemoteConfig;
use crate::domain::config::SessionConfig;
use crate::error::AppError;
use crate::protocol::{ErrorBody, Snapshot};

/// Sentinel substring the engine puts in its 404 body when no session
/// exists. Matched verbatim; the rest of the message varies by endpoint.
const NO_SESSION_MARKER: &str = "No game found";

pub struct HttpSimulationApi {
    client: Client,
    base_url: String,
}

impl HttpSimulationApi {
    pub fn new(config: &RemoteConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| AppError::config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn decode(&self, op: &'static str, response: Response) -> Result<Snapshot, AppError> {
        let status = response.status();
        if status.is_success() {
            let snapshot: Snapshot = response
                .json()
                .await
                .map_err(|err| AppError::remote(format!("{op}: malformed response: {err}")))?;
            snapshot.check_consistency()?;
            debug!(op, turn = snapshot.turn_number, "decoded engine snapshot");
            return Ok(snapshot);
        }
        let body = response.json::<ErrorBody>().await.ok();
        Err(map_failure(op, status, body))
    }
}

/// Classify a non-2xx response. The not-found sentinel becomes the
/// benign `NoActiveSession`; everything else is a remote failure.
fn map_failure(op: &'static str, status: StatusCode, body: Option<ErrorBody>) -> AppError {
    let detail = body
        .map(|b| b.error)
        .unwrap_or_else(|| format!("HTTP {status}"));
    if detail.contains(NO_SESSION_MARKER) {
        AppError::no_active_session(detail)
    } else {
        AppError::remote(format!("{op}: {detail}"))
    }
}

#[async_trait]
impl SimulationApi for HttpSimulationApi {
    async fn start(&self, config: &SessionConfig) -> Result<Snapshot, AppError> {
        let response = self
            .client
            .post(self.url("/start/"))
            .json(config)
            .send()
            .await
            .map_err(|err| AppError::remote(format!("start: {err}")))?;
        self.decode("start", response).await
    }

    async fn status(&self) -> Result<Snapshot, AppError> {
        let response = self
            .client
            .get(self.url("/stats/"))
            .send()
            .await
            .map_err(|err| AppError::remote(format!("status: {err}")))?;
        self.decode("status", response).await
    }

    async fn next_round(&self) -> Result<Snapshot, AppError> {
        let response = self
            .client
            .post(self.url("/next-round/"))
            .send()
            .await
            .map_err(|err| AppError::remote(format!("next_round: {err}")))?;
        self.decode("next_round", response).await
    }

    async fn stop(&self) -> Result<Snapshot, AppError> {
        let response = self
            .client
            .post(self.url("/stop/"))
            .send()
            .await
            .map_err(|err| AppError::remote(format!("stop: {err}")))?;
        self.decode("stop", response).await
    }
}
