//! The client-local session record.
//!
//! `Session` mirrors what the engine last reported plus the controller's
//! own lifecycle position. It is owned exclusively by
//! `services::game_session::GameSession`; nothing else mutates it.

use crate::protocol::Snapshot;

/// Where the controller stands in the session lifecycle.
///
/// `Complete` is terminal until a fresh `start` re-creates the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// No session exists, locally or (as far as we know) remotely.
    #[default]
    NoSession,
    /// A session exists and is stepped manually. Entered when
    /// initialization adopts an in-progress remote session.
    Active,
    /// Auto-run suspended; manual stepping allowed.
    Paused,
    /// The scheduler is issuing round advances on its cadence.
    AutoRunning,
    /// Every waste has been collected.
    Complete,
}

impl Lifecycle {
    /// True for every state in which a session exists.
    pub fn has_session(&self) -> bool {
        !matches!(self, Lifecycle::NoSession)
    }

    /// Manual round stepping is allowed only while the automated cadence
    /// does not own progression and the session is not terminal.
    pub fn allows_manual_step(&self) -> bool {
        matches!(self, Lifecycle::Active | Lifecycle::Paused)
    }
}

/// Lifecycle position, last snapshot, and the most recent user-visible
/// failure. Replaced-wholesale semantics: a successful response swaps
/// the whole snapshot and clears the error slot.
#[derive(Debug, Default)]
pub struct Session {
    pub lifecycle: Lifecycle,
    pub snapshot: Option<Snapshot>,
    pub last_error: Option<String>,
}

impl Session {
    /// Tear the session down to its initial state.
    pub fn reset(&mut self) {
        self.lifecycle = Lifecycle::NoSession;
        self.snapshot = None;
        self.last_error = None;
    }

    /// A snapshot is accepted only if it does not regress the turn
    /// counter of the snapshot already held.
    pub fn accepts(&self, incoming: &Snapshot) -> bool {
        match &self.snapshot {
            Some(held) => incoming.turn_number >= held.turn_number,
            None => true,
        }
    }
}
