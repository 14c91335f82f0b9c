//! Controller-wide error type.
//!
//! Every fallible operation returns `Result<T, AppError>`. No variant is
//! fatal to the process: remote failures land in the session's error slot
//! and the operator may always retry through the control surface.

use thiserror::Error;

use crate::domain::session::Lifecycle;

#[derive(Error, Debug)]
pub enum AppError {
    /// The engine reports that no session exists. Benign while probing
    /// during initialization; anywhere else it reads as a remote failure.
    #[error("no active session: {detail}")]
    NoActiveSession { detail: String },

    /// Network failure, non-2xx response, or a response body that could
    /// not be decoded or fails the snapshot consistency rules.
    #[error("remote call failed: {detail}")]
    Remote { detail: String },

    /// Client-supplied input rejected before any request was issued.
    #[error("validation error: {detail}")]
    Validation { code: &'static str, detail: String },

    /// A transition operation invoked from a lifecycle state that does
    /// not permit it.
    #[error("{op} is not legal while {state:?}")]
    IllegalTransition { op: &'static str, state: Lifecycle },

    #[error("configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn remote(detail: impl Into<String>) -> Self {
        Self::Remote {
            detail: detail.into(),
        }
    }

    pub fn no_active_session(detail: impl Into<String>) -> Self {
        Self::NoActiveSession {
            detail: detail.into(),
        }
    }

    pub fn invalid(code: &'static str, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn illegal(op: &'static str, state: Lifecycle) -> Self {
        Self::IllegalTransition { op, state }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    /// Stable machine-readable code for each variant.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NoActiveSession { .. } => "NO_ACTIVE_SESSION",
            AppError::Remote { .. } => "REMOTE_CALL_FAILURE",
            AppError::Validation { code, .. } => code,
            AppError::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            AppError::Config { .. } => "CONFIG_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(AppError::remote("boom").code(), "REMOTE_CALL_FAILURE");
        assert_eq!(
            AppError::no_active_session("nothing running").code(),
            "NO_ACTIVE_SESSION"
        );
        assert_eq!(AppError::invalid("NUM_AGENTS", "too many").code(), "NUM_AGENTS");
        assert_eq!(
            AppError::illegal("start", Lifecycle::AutoRunning).code(),
            "ILLEGAL_TRANSITION"
        );
    }

    #[test]
    fn display_includes_detail() {
        let err = AppError::remote("HTTP 502 from /api/next-round/");
        assert!(err.to_string().contains("HTTP 502"));
    }
}
