// src/motion/mod.rs - Movement proposal pipeline
pub mod inertia;
pub mod proposer;
pub mod sampler;
pub mod swing;

pub use inertia::{InertiaCarry, InertiaModel};
pub use proposer::{MovementProposal, MovementProposer, ProposerOutput};
pub use sampler::{ControllerSampler, SmoothedMovement, SmoothingCache};
pub use swing::{Activation, Hand, SwingResult, SwingSpeedCalculator, SwingState};

use glam::{Quat, Vec3};

/// One controller as reported by the pose source for this tick (play-space local).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub button_pressed: bool,
}

impl Default for ControllerPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            button_pressed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerFrame {
    pub left: ControllerPose,
    pub right: ControllerPose,
}
