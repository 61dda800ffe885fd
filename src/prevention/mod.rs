// src/prevention/mod.rs - Boundary prevention: terrain checks, rewind and push-back
pub mod engine;
pub mod history;
pub mod terrain;
pub mod token_bucket;

pub use engine::{BoundaryPreventionEngine, Correction, EngineState, FadePhase, PreventionInput, PreventionOutput};
pub use history::{PreventionReasonHistory, SafePositionHistory};
pub use terrain::TerrainHeightTracker;
pub use token_bucket::TokenBucket;

use serde::Serialize;

/// Why a correction fired. Exactly one per correction, `None` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreventionReason {
    Climbing,
    Falling,
    InstantClimbing,
    InstantFalling,
    /// Ground height changed while height adjustment was restricted to arm swinging.
    Ohawas,
    /// Headset clipped into a wall.
    Headset,
    WallWalk,
    Manual,
    NoGround,
    #[default]
    None,
}

impl PreventionReason {
    /// Counts as out of bounds for the debounce queues.
    pub fn is_violation(&self) -> bool {
        !matches!(self, PreventionReason::None | PreventionReason::NoGround)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionOutcome {
    #[default]
    NoCorrection,
    RewindApplied,
    PushBackApplied,
}

/// Per-tick status for external observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FrameFlags {
    pub out_of_bounds: bool,
    pub rewind_in_progress: bool,
    pub arm_swinging: bool,
    pub wall_clip_this_frame: bool,
    pub rewind_this_frame: bool,
    pub no_ground: bool,
}
