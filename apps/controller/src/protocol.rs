//! Wire types shared with the remote simulation engine.
//!
//! Every successful response carries a full [`Snapshot`]; the controller
//! replaces its held snapshot wholesale and never merges fields. Tuple
//! structs are used for positions so serde produces the engine's JSON
//! arrays (`[x, y]`, `[x, y, carrying]`).

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The engine's playing field is a fixed 32x32 grid.
pub const GRID_SIZE: i32 = 32;

/// A cell coordinate, serialized as `[x, y]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPos(pub i32, pub i32);

impl GridPos {
    pub fn x(&self) -> i32 {
        self.0
    }

    pub fn y(&self) -> i32 {
        self.1
    }

    /// Whether the coordinate lies on the engine's grid.
    pub fn in_bounds(&self) -> bool {
        (0..GRID_SIZE).contains(&self.0) && (0..GRID_SIZE).contains(&self.1)
    }
}

/// An agent's cell plus whether it is carrying waste, serialized as
/// `[x, y, carrying]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMarker(pub i32, pub i32, pub bool);

impl AgentMarker {
    pub fn x(&self) -> i32 {
        self.0
    }

    pub fn y(&self) -> i32 {
        self.1
    }

    pub fn carrying_waste(&self) -> bool {
        self.2
    }
}

/// Authoritative simulation state as last reported by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub waste_collected: u32,
    pub total_wastes: u32,
    pub agent_positions: Vec<AgentMarker>,
    pub waste_positions: Vec<GridPos>,
    pub base_position: GridPos,
    pub turn_number: u64,
}

impl Snapshot {
    /// All waste has been returned to the base.
    pub fn is_complete(&self) -> bool {
        self.total_wastes > 0 && self.waste_collected == self.total_wastes
    }

    /// Rejects responses that violate the engine's own invariants. A
    /// violating body is handled exactly like any other remote failure.
    pub fn check_consistency(&self) -> Result<(), AppError> {
        if self.total_wastes == 0 {
            return Err(AppError::remote("malformed snapshot: total_wastes is 0"));
        }
        if self.waste_collected > self.total_wastes {
            return Err(AppError::remote(format!(
                "malformed snapshot: waste_collected {} exceeds total_wastes {}",
                self.waste_collected, self.total_wastes
            )));
        }
        Ok(())
    }
}

/// Body of every non-2xx response from the engine.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
