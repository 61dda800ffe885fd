// src/motion/proposer.rs
use glam::{Quat, Vec3};

use crate::config::LocomotionConfig;
use crate::motion::inertia::InertiaModel;
use crate::motion::sampler::ControllerSampler;
use crate::motion::swing::{Activation, SwingSpeedCalculator};
use crate::motion::ControllerFrame;

/// This tick's requested play-space movement, horizontal plane only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementProposal {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl MovementProposal {
    pub fn none(rotation: Quat) -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProposerOutput {
    pub proposal: MovementProposal,
    pub activation: Activation,
    pub arm_swinging: bool,
    /// Speed after inertia, world units per second.
    pub speed: f32,
}

/// Rotate the forward axis by `rotation`, scale by `distance` and drop the vertical part.
pub fn forward_xz(distance: f32, rotation: Quat) -> Vec3 {
    let forward = rotation * Vec3::Z * distance;
    Vec3::new(forward.x, 0.0, forward.z)
}

#[derive(Debug, Clone)]
pub struct MovementProposer {
    sampler: ControllerSampler,
    swing: SwingSpeedCalculator,
    inertia: InertiaModel,
    last_rotation: Quat,
}

impl MovementProposer {
    pub fn new(config: &LocomotionConfig) -> Self {
        Self {
            sampler: ControllerSampler::new(&config.smoothing),
            swing: SwingSpeedCalculator::new(&config.arm_swing),
            inertia: InertiaModel::new(),
            last_rotation: Quat::IDENTITY,
        }
    }

    pub fn swing(&self) -> &SwingSpeedCalculator {
        &self.swing
    }

    pub fn inertia(&self) -> &InertiaModel {
        &self.inertia
    }

    pub fn reset(&mut self) {
        self.sampler.reset();
        self.swing.reset();
        self.inertia.reset();
    }

    /// Run sampler, swing calculator and inertia for one tick. With `suppressed`
    /// set (a rewind is in progress) controllers are still sampled but no
    /// movement is produced and inertia is dropped.
    pub fn propose(
        &mut self,
        config: &LocomotionConfig,
        controllers: &ControllerFrame,
        dt: f32,
        suppressed: bool,
    ) -> ProposerOutput {
        let movement = self.sampler.sample(
            &config.smoothing,
            controllers.left.position,
            controllers.right.position,
            dt,
        );

        if suppressed || !config.arm_swing.navigation {
            self.swing.reset();
            self.inertia.reset();
            return ProposerOutput {
                proposal: MovementProposal::none(self.last_rotation),
                activation: Activation::Inactive,
                arm_swinging: false,
                speed: 0.0,
            };
        }

        let buttons = if config.policy.arm_swinging_paused {
            (false, false)
        } else {
            (controllers.left.button_pressed, controllers.right.button_pressed)
        };
        let swing = self.swing.calculate(
            config,
            movement,
            (controllers.left.rotation, controllers.right.rotation),
            buttons,
            dt,
        );
        if let Some(result) = &swing {
            self.last_rotation = result.rotation;
        }

        let speed = self.inertia.update(
            &config.inertia,
            config.max_speed(),
            swing.map(|s| s.speed),
            dt,
        );
        let distance = speed * dt.max(0.0);

        ProposerOutput {
            proposal: MovementProposal {
                translation: forward_xz(distance, self.last_rotation),
                rotation: self.last_rotation,
            },
            activation: swing.map(|s| s.activation).unwrap_or(Activation::Inactive),
            arm_swinging: swing.is_some(),
            speed,
        }
    }
}
