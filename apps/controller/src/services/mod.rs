//! Session orchestration: the lifecycle state machine and the auto-run
//! scheduler that drives it.

pub mod game_session;
pub mod scheduler;
