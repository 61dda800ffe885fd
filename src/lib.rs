// armswing-rs: arm-swing locomotion with terrain boundary prevention

pub mod collaborators;
pub mod config;
pub mod curve;
pub mod locomotion;
pub mod motion;
pub mod prevention;
pub mod ring;

pub use collaborators::{
    CollisionProbe, Collaborators, FadeService, GroundHit, GroundQuery, LayerMask, ProbeContact,
};
pub use config::{load_config, ConfigError, LocomotionConfig, PolicyFlags, PreventionMode};
pub use locomotion::{update, FrameInput, FrameOutput, LocomotionState};
pub use motion::{ControllerFrame, ControllerPose, MovementProposal};
pub use prevention::{BoundaryPreventionEngine, CorrectionOutcome, FrameFlags, PreventionReason};
