// src/motion/swing.rs - Swing activation and controller-to-speed mapping
use glam::Quat;

use crate::config::{ActivationMode, ArmSwingConfig, LocomotionConfig};
use crate::curve::ResponseCurve;
use crate::motion::sampler::SmoothedMovement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

/// Which controllers drive this tick's movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Inactive,
    Both,
    Single(Hand),
}

impl Activation {
    pub fn is_active(&self) -> bool {
        !matches!(self, Activation::Inactive)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwingState {
    pub mode: ActivationMode,
    pub active_controller: Option<Hand>,
    /// Only used by the exclusive mode: the hand that started swinging.
    pub exclusive_lock: Option<Hand>,
}

impl SwingState {
    pub fn new(mode: ActivationMode) -> Self {
        Self {
            mode,
            active_controller: None,
            exclusive_lock: None,
        }
    }

    pub fn reset(&mut self) {
        self.active_controller = None;
        self.exclusive_lock = None;
    }

    /// Update from button state and return which controllers contribute.
    pub fn resolve(&mut self, mode: ActivationMode, left_pressed: bool, right_pressed: bool) -> Activation {
        if mode != self.mode {
            tracing::debug!("Swing activation mode changed from {:?} to {:?}", self.mode, mode);
            self.mode = mode;
            self.reset();
        }

        let activation = match mode {
            ActivationMode::BothButtonsBothControllers => {
                if left_pressed && right_pressed { Activation::Both } else { Activation::Inactive }
            }
            ActivationMode::LeftButtonBothControllers => {
                if left_pressed { Activation::Both } else { Activation::Inactive }
            }
            ActivationMode::RightButtonBothControllers => {
                if right_pressed { Activation::Both } else { Activation::Inactive }
            }
            ActivationMode::OneButtonSameController => match (left_pressed, right_pressed) {
                (true, true) => Activation::Both,
                (true, false) => Activation::Single(Hand::Left),
                (false, true) => Activation::Single(Hand::Right),
                (false, false) => Activation::Inactive,
            },
            ActivationMode::OneButtonSameControllerExclusive => {
                let held = |hand: Hand| match hand {
                    Hand::Left => left_pressed,
                    Hand::Right => right_pressed,
                };
                self.exclusive_lock = match self.exclusive_lock {
                    Some(hand) if held(hand) => Some(hand),
                    _ if left_pressed => Some(Hand::Left),
                    _ if right_pressed => Some(Hand::Right),
                    _ => None,
                };
                match self.exclusive_lock {
                    Some(hand) => Activation::Single(hand),
                    None => Activation::Inactive,
                }
            }
        };

        self.active_controller = match activation {
            Activation::Single(hand) => Some(hand),
            _ => None,
        };
        activation
    }
}

/// Per-controller speed in world units per second for a smoothed controller speed.
pub fn swing_speed(curve: &ResponseCurve, controller_speed: f32, speed_for_max_speed: f32, max_speed: f32) -> f32 {
    if speed_for_max_speed <= 0.0 {
        return 0.0;
    }
    max_speed * curve.evaluate(controller_speed / speed_for_max_speed)
}

/// Per-tick distance for one controller.
pub fn calculate_movement(
    curve: &ResponseCurve,
    controller_speed: f32,
    speed_for_max_speed: f32,
    max_speed: f32,
    dt: f32,
) -> f32 {
    swing_speed(curve, controller_speed, speed_for_max_speed, max_speed) * dt
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingResult {
    pub activation: Activation,
    /// Combined speed after the both/single controller coefficient, units per second.
    pub speed: f32,
    /// `speed * dt`.
    pub distance: f32,
    pub rotation: Quat,
}

#[derive(Debug, Clone)]
pub struct SwingSpeedCalculator {
    state: SwingState,
}

impl SwingSpeedCalculator {
    pub fn new(config: &ArmSwingConfig) -> Self {
        Self {
            state: SwingState::new(config.mode),
        }
    }

    pub fn state(&self) -> &SwingState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Returns `None` when no controller is swinging this tick.
    pub fn calculate(
        &mut self,
        config: &LocomotionConfig,
        movement: SmoothedMovement,
        rotations: (Quat, Quat),
        buttons: (bool, bool),
        dt: f32,
    ) -> Option<SwingResult> {
        let arm = &config.arm_swing;
        let activation = self.state.resolve(arm.mode, buttons.0, buttons.1);
        let max_speed = config.max_speed();
        let speed_of = |controller_speed: f32| {
            swing_speed(&arm.curve, controller_speed, arm.controller_speed_for_max_speed, max_speed)
        };

        let (speed, rotation) = match activation {
            Activation::Inactive => return None,
            Activation::Both => {
                let combined = (speed_of(movement.left) + speed_of(movement.right)) / 2.0;
                (
                    combined * arm.both_controllers_coefficient(),
                    rotations.0.slerp(rotations.1, 0.5),
                )
            }
            Activation::Single(Hand::Left) => (
                speed_of(movement.left) * arm.single_controller_coefficient(),
                rotations.0,
            ),
            Activation::Single(Hand::Right) => (
                speed_of(movement.right) * arm.single_controller_coefficient(),
                rotations.1,
            ),
        };

        Some(SwingResult {
            activation,
            speed,
            distance: speed * dt.max(0.0),
            rotation,
        })
    }
}
