//! The session lifecycle state machine.
//!
//! `GameSession` is the only component that mutates the local
//! [`Session`] record. All transition legality is enforced here, so an
//! illegal call is rejected centrally instead of relying on the control
//! surface to disable itself.
//!
//! Every remote call takes the next value of a monotonically increasing
//! request sequence. A response is applied only while its sequence is
//! still the latest issued and only if it does not regress the held
//! snapshot's turn counter; anything else is a stale response, discarded
//! silently and never surfaced to the operator.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::api::SimulationApi;
use crate::domain::config::SessionConfig;
use crate::domain::session::{Lifecycle, Session};
use crate::error::AppError;
use crate::protocol::Snapshot;
use crate::services::scheduler::{RoundScheduler, TickOutcome};

pub struct GameSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: Arc<dyn SimulationApi>,
    state: Mutex<Session>,
    scheduler: RoundScheduler,
    /// Sequence number of the most recently issued request.
    issued: AtomicU64,
}

impl GameSession {
    pub fn new(api: Arc<dyn SimulationApi>, tick_interval: Duration) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                api,
                state: Mutex::new(Session::default()),
                scheduler: RoundScheduler::new(tick_interval),
                issued: AtomicU64::new(0),
            }),
        }
    }

    /// Probe the engine for an existing session.
    ///
    /// "No game found" is a normal outcome: lifecycle stays `NoSession`
    /// and the error slot is left untouched. An adopted in-progress
    /// session lands in `Active` (the scheduler is not armed on behalf
    /// of a session this controller did not start); a finished one lands
    /// in `Complete`. Any other failure is recorded without changing
    /// lifecycle.
    pub async fn initialize(&self) -> Result<(), AppError> {
        let seq = self.inner.issue();
        match self.inner.call_status().await {
            Ok(snapshot) => {
                let mut state = self.inner.state.lock();
                if !self.inner.is_latest(seq) || !state.accepts(&snapshot) {
                    debug!(seq, "discarding stale status response");
                    return Ok(());
                }
                state.lifecycle = if snapshot.is_complete() {
                    Lifecycle::Complete
                } else {
                    Lifecycle::Active
                };
                info!(
                    turn = snapshot.turn_number,
                    collected = snapshot.waste_collected,
                    lifecycle = ?state.lifecycle,
                    "adopted existing session"
                );
                state.snapshot = Some(snapshot);
                state.last_error = None;
                Ok(())
            }
            Err(AppError::NoActiveSession { detail }) => {
                debug!(detail = %detail, "no existing session to adopt");
                Ok(())
            }
            Err(err) => {
                self.inner.record_failure(&err);
                Err(err)
            }
        }
    }

    /// Start a fresh session. Legal only from `NoSession` or `Complete`.
    ///
    /// On success the snapshot is replaced and the lifecycle moves to
    /// `AutoRunning` with the scheduler armed, or straight to `Complete`
    /// if the engine reports an already-finished session.
    pub async fn start(&self, config: &SessionConfig) -> Result<(), AppError> {
        {
            let state = self.inner.state.lock();
            if state.lifecycle.has_session() && state.lifecycle != Lifecycle::Complete {
                return Err(AppError::illegal("start", state.lifecycle));
            }
        }
        info!(
            num_agents = config.num_agents(),
            num_wastes = config.num_wastes(),
            "starting session"
        );
        let seq = self.inner.issue();
        match self.inner.call_start(config).await {
            Ok(snapshot) => {
                let arm = {
                    let mut state = self.inner.state.lock();
                    if !self.inner.is_latest(seq) {
                        debug!(seq, "discarding stale start response");
                        return Ok(());
                    }
                    let complete = snapshot.is_complete();
                    state.lifecycle = if complete {
                        Lifecycle::Complete
                    } else {
                        Lifecycle::AutoRunning
                    };
                    debug!(turn = snapshot.turn_number, lifecycle = ?state.lifecycle, "session started");
                    state.snapshot = Some(snapshot);
                    state.last_error = None;
                    !complete
                };
                if arm {
                    self.arm_scheduler();
                }
                Ok(())
            }
            Err(err) => {
                self.inner.record_failure(&err);
                Err(err)
            }
        }
    }

    /// Flip between automated and suspended progression.
    ///
    /// `AutoRunning` disarms and moves to `Paused`; `Paused` and
    /// `Active` arm and move to `AutoRunning`. No-op from `NoSession`
    /// and `Complete`. Purely local: no request is issued.
    pub fn toggle_pause(&self) {
        let lifecycle = self.inner.state.lock().lifecycle;
        match lifecycle {
            Lifecycle::AutoRunning => {
                self.inner.scheduler.disarm();
                let mut state = self.inner.state.lock();
                // A tick may have completed the session between the two
                // locks; never demote a terminal state.
                if state.lifecycle == Lifecycle::AutoRunning {
                    state.lifecycle = Lifecycle::Paused;
                    info!("auto-run paused");
                }
            }
            Lifecycle::Paused | Lifecycle::Active => {
                self.inner.state.lock().lifecycle = Lifecycle::AutoRunning;
                self.arm_scheduler();
                info!("auto-run resumed");
            }
            Lifecycle::NoSession | Lifecycle::Complete => {
                debug!(?lifecycle, "toggle ignored");
            }
        }
    }

    /// Advance one round manually. Legal only while stepping is manual
    /// (`Active` or `Paused`); the automated cadence owns progression in
    /// `AutoRunning`, and terminal states cannot step.
    pub async fn advance_round(&self) -> Result<(), AppError> {
        {
            let state = self.inner.state.lock();
            if !state.lifecycle.allows_manual_step() {
                return Err(AppError::illegal("advance_round", state.lifecycle));
            }
        }
        let seq = self.inner.issue();
        match self.inner.call_next_round().await {
            Ok(snapshot) => {
                let mut state = self.inner.state.lock();
                if !self.inner.is_latest(seq) || !state.accepts(&snapshot) {
                    debug!(seq, "discarding stale advance response");
                    return Ok(());
                }
                let complete = snapshot.is_complete();
                info!(
                    turn = snapshot.turn_number,
                    collected = snapshot.waste_collected,
                    "round advanced"
                );
                state.snapshot = Some(snapshot);
                state.last_error = None;
                if complete {
                    state.lifecycle = Lifecycle::Complete;
                }
                drop(state);
                if complete {
                    // A resume may have armed the scheduler while this
                    // request was in flight; completion disarms on every
                    // path.
                    self.inner.scheduler.disarm();
                    info!("session complete");
                }
                Ok(())
            }
            Err(err) => {
                self.inner.record_failure(&err);
                Err(err)
            }
        }
    }

    /// Tear the session down. No-op from `NoSession`, legal from every
    /// other state. Disarms the scheduler before the stop request goes
    /// out, then resets to `NoSession` regardless of what snapshot the
    /// stop response reports.
    ///
    /// Teardown is a lifecycle decision, not a snapshot application, so
    /// the staleness fence does not apply to it: the reset lands even if
    /// a concurrent request bumped the sequence past this one. An engine
    /// that reports the session as already gone has nothing left to tear
    /// down, so that outcome also resets rather than wedging the client
    /// in a state `start` rejects.
    pub async fn stop(&self) -> Result<(), AppError> {
        {
            let state = self.inner.state.lock();
            if !state.lifecycle.has_session() {
                debug!("stop ignored: no session");
                return Ok(());
            }
        }
        self.inner.scheduler.disarm();
        // Bumping the sequence fences any tick or advance still in
        // flight; their responses resolve stale and are discarded.
        self.inner.issue();
        match self.inner.call_stop().await {
            Ok(_snapshot) => {
                self.inner.state.lock().reset();
                info!("session stopped");
                Ok(())
            }
            Err(AppError::NoActiveSession { detail }) => {
                debug!(detail = %detail, "remote session already gone");
                self.inner.state.lock().reset();
                info!("session stopped");
                Ok(())
            }
            Err(err) => {
                self.inner.record_failure(&err);
                Err(err)
            }
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.state.lock().lifecycle
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.inner.state.lock().snapshot.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.state.lock().last_error.clone()
    }

    pub fn is_auto_running(&self) -> bool {
        self.lifecycle() == Lifecycle::AutoRunning
    }

    /// Visible for tests: whether the scheduler currently holds a live
    /// timer.
    pub fn scheduler_armed(&self) -> bool {
        self.inner.scheduler.is_armed()
    }

    fn arm_scheduler(&self) {
        let inner = Arc::clone(&self.inner);
        self.inner.scheduler.arm(move || {
            let inner = Arc::clone(&inner);
            async move { inner.auto_tick().await }
        });
    }
}

impl SessionInner {
    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == seq
    }

    /// One automated advance. Runs inside the scheduler's timer loop;
    /// returning `Stop` ends the loop.
    async fn auto_tick(&self) -> TickOutcome {
        if self.state.lock().lifecycle != Lifecycle::AutoRunning {
            // Pause or stop won the race against this tick firing.
            return TickOutcome::Stop;
        }
        let seq = self.issue();
        match self.call_next_round().await {
            Ok(snapshot) => {
                let mut state = self.state.lock();
                if state.lifecycle != Lifecycle::AutoRunning {
                    // The lifecycle moved while the request was in
                    // flight; whoever moved it owns the state now.
                    return TickOutcome::Stop;
                }
                if !self.is_latest(seq) || !state.accepts(&snapshot) {
                    debug!(seq, "discarding stale tick response");
                    return TickOutcome::Stop;
                }
                let complete = snapshot.is_complete();
                debug!(
                    turn = snapshot.turn_number,
                    collected = snapshot.waste_collected,
                    "auto-run tick applied"
                );
                state.snapshot = Some(snapshot);
                state.last_error = None;
                if complete {
                    state.lifecycle = Lifecycle::Complete;
                    info!("session complete");
                    TickOutcome::Stop
                } else {
                    TickOutcome::Continue
                }
            }
            Err(err) => {
                warn!(error = %err, "auto-run tick failed; pausing");
                let mut state = self.state.lock();
                state.last_error = Some(err.to_string());
                if state.lifecycle == Lifecycle::AutoRunning {
                    state.lifecycle = Lifecycle::Paused;
                }
                TickOutcome::Stop
            }
        }
    }

    /// Failure policy shared by every user-triggered operation: disarm
    /// if armed, record the message, and demote `AutoRunning` to
    /// `Paused` so the operator can inspect and resume. Any other
    /// lifecycle stays as it was.
    fn record_failure(&self, err: &AppError) {
        warn!(error = %err, code = err.code(), "remote operation failed");
        self.scheduler.disarm();
        let mut state = self.state.lock();
        state.last_error = Some(err.to_string());
        if state.lifecycle == Lifecycle::AutoRunning {
            state.lifecycle = Lifecycle::Paused;
        }
    }

    /// Responses are consistency-checked at the seam so every
    /// `SimulationApi` implementation gets the malformed-response
    /// handling of the HTTP client.
    async fn call_start(&self, config: &SessionConfig) -> Result<Snapshot, AppError> {
        let snapshot = self.api.start(config).await?;
        snapshot.check_consistency()?;
        Ok(snapshot)
    }

    async fn call_status(&self) -> Result<Snapshot, AppError> {
        let snapshot = self.api.status().await?;
        snapshot.check_consistency()?;
        Ok(snapshot)
    }

    async fn call_next_round(&self) -> Result<Snapshot, AppError> {
        let snapshot = self.api.next_round().await?;
        snapshot.check_consistency()?;
        Ok(snapshot)
    }

    async fn call_stop(&self) -> Result<Snapshot, AppError> {
        // The stop response's snapshot is deliberately ignored; the
        // session is torn down, not marked complete. Consistency still
        // gates it so a malformed body surfaces as a failure.
        let snapshot = self.api.stop().await?;
        snapshot.check_consistency()?;
        Ok(snapshot)
    }
}
