//! Scripted mock of the engine boundary for integration tests.
//!
//! Each endpoint pops the next scripted response in FIFO order. An
//! unscripted call fails loudly so a test that issues more requests than
//! it expected cannot pass by accident. A response may be gated on a
//! oneshot so tests can hold a request in flight while others resolve.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use controller::{AppError, SessionConfig, SimulationApi, Snapshot};
use controller::{AgentMarker, GridPos};
use parking_lot::Mutex;
use tokio::sync::oneshot;

pub struct Scripted {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<Snapshot, AppError>,
}

impl Scripted {
    fn ready(result: Result<Snapshot, AppError>) -> Self {
        Self { gate: None, result }
    }
}

#[derive(Default)]
pub struct MockApi {
    start_script: Mutex<VecDeque<Scripted>>,
    status_script: Mutex<VecDeque<Scripted>>,
    next_script: Mutex<VecDeque<Scripted>>,
    stop_script: Mutex<VecDeque<Scripted>>,
    start_calls: AtomicU32,
    status_calls: AtomicU32,
    next_calls: AtomicU32,
    stop_calls: AtomicU32,
}

#[allow(dead_code)] // not every test file uses every helper
impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_start(&self, result: Result<Snapshot, AppError>) {
        self.start_script.lock().push_back(Scripted::ready(result));
    }

    pub fn script_status(&self, result: Result<Snapshot, AppError>) {
        self.status_script.lock().push_back(Scripted::ready(result));
    }

    pub fn script_next(&self, result: Result<Snapshot, AppError>) {
        self.next_script.lock().push_back(Scripted::ready(result));
    }

    pub fn script_stop(&self, result: Result<Snapshot, AppError>) {
        self.stop_script.lock().push_back(Scripted::ready(result));
    }

    /// Script a next-round response that resolves only once the returned
    /// sender fires.
    pub fn script_next_gated(&self, result: Result<Snapshot, AppError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.next_script.lock().push_back(Scripted {
            gate: Some(rx),
            result,
        });
        tx
    }

    /// Script a stop response that resolves only once the returned
    /// sender fires.
    pub fn script_stop_gated(&self, result: Result<Snapshot, AppError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.stop_script.lock().push_back(Scripted {
            gate: Some(rx),
            result,
        });
        tx
    }

    pub fn start_calls(&self) -> u32 {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn next_calls(&self) -> u32 {
        self.next_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> u32 {
        self.stop_calls.load(Ordering::SeqCst)
    }

    async fn take(
        script: &Mutex<VecDeque<Scripted>>,
        calls: &AtomicU32,
        op: &'static str,
    ) -> Result<Snapshot, AppError> {
        calls.fetch_add(1, Ordering::SeqCst);
        let scripted = script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Scripted::ready(Err(AppError::remote(format!("unscripted {op} call")))));
        if let Some(gate) = scripted.gate {
            let _ = gate.await;
        }
        scripted.result
    }
}

#[async_trait]
impl SimulationApi for MockApi {
    async fn start(&self, _config: &SessionConfig) -> Result<Snapshot, AppError> {
        Self::take(&self.start_script, &self.start_calls, "start").await
    }

    async fn status(&self) -> Result<Snapshot, AppError> {
        Self::take(&self.status_script, &self.status_calls, "status").await
    }

    async fn next_round(&self) -> Result<Snapshot, AppError> {
        Self::take(&self.next_script, &self.next_calls, "next_round").await
    }

    async fn stop(&self) -> Result<Snapshot, AppError> {
        Self::take(&self.stop_script, &self.stop_calls, "stop").await
    }
}

/// A consistent snapshot with defaulted grid content.
#[allow(dead_code)]
pub fn snapshot(turn_number: u64, waste_collected: u32, total_wastes: u32) -> Snapshot {
    Snapshot {
        waste_collected,
        total_wastes,
        agent_positions: vec![AgentMarker(1, 1, false), AgentMarker(7, 3, true)],
        waste_positions: vec![GridPos(4, 9)],
        base_position: GridPos(15, 15),
        turn_number,
    }
}

/// The control surface's default configuration.
#[allow(dead_code)]
pub fn default_config() -> SessionConfig {
    SessionConfig::new(5, 20, GridPos(15, 15)).expect("default config is valid")
}
