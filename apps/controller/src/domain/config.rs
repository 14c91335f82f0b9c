//! Validated start configuration for a new session.

use serde::Serialize;

use crate::error::AppError;
use crate::protocol::GridPos;

/// Immutable, validated configuration sent with a start request.
///
/// Fields are private on purpose: the only way to obtain a
/// `SessionConfig` is through [`SessionConfig::new`], so an instance is
/// valid by construction. Serializes to the engine's wire shape
/// (`num_agents`, `num_wastes`, `base_position_x`, `base_position_y`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    num_agents: u32,
    num_wastes: u32,
    base_position_x: i32,
    base_position_y: i32,
}

impl SessionConfig {
    pub const MAX_AGENTS: u32 = 1000;
    pub const MAX_WASTES: u32 = 1000;

    pub fn new(num_agents: u32, num_wastes: u32, base_position: GridPos) -> Result<Self, AppError> {
        if num_agents == 0 || num_agents > Self::MAX_AGENTS {
            return Err(AppError::invalid(
                "NUM_AGENTS_OUT_OF_RANGE",
                format!("num_agents must be 1..={}, got {num_agents}", Self::MAX_AGENTS),
            ));
        }
        if num_wastes == 0 || num_wastes > Self::MAX_WASTES {
            return Err(AppError::invalid(
                "NUM_WASTES_OUT_OF_RANGE",
                format!("num_wastes must be 1..={}, got {num_wastes}", Self::MAX_WASTES),
            ));
        }
        if !base_position.in_bounds() {
            return Err(AppError::invalid(
                "BASE_POSITION_OUT_OF_BOUNDS",
                format!(
                    "base position ({}, {}) is outside the grid",
                    base_position.x(),
                    base_position.y()
                ),
            ));
        }
        Ok(Self {
            num_agents,
            num_wastes,
            base_position_x: base_position.x(),
            base_position_y: base_position.y(),
        })
    }

    pub fn num_agents(&self) -> u32 {
        self.num_agents
    }

    pub fn num_wastes(&self) -> u32 {
        self.num_wastes
    }

    pub fn base_position(&self) -> GridPos {
        GridPos(self.base_position_x, self.base_position_y)
    }
}
