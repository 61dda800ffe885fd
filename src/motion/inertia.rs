// src/motion/inertia.rs
// Carry-over speed so starting and stopping a swing is not a hard cut.

use crate::config::InertiaConfig;
use crate::curve::LinearCurve;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecayPhase {
    #[default]
    Moving,
    Stopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InertiaCarry {
    /// World units per second.
    pub current_speed: f32,
    pub phase: DecayPhase,
}

#[derive(Debug, Clone, Default)]
pub struct InertiaModel {
    carry: InertiaCarry,
}

impl InertiaModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn carry(&self) -> InertiaCarry {
        self.carry
    }

    pub fn reset(&mut self) {
        self.carry = InertiaCarry::default();
    }

    /// Blend this tick's live speed (`None` when not swinging) with the carried
    /// speed and return the speed to move at. Never exceeds
    /// `max(instantaneous, carried)`.
    pub fn update(
        &mut self,
        config: &InertiaConfig,
        max_speed: f32,
        instantaneous: Option<f32>,
        dt: f32,
    ) -> f32 {
        let carried = self.carry.current_speed;
        match instantaneous {
            Some(live) => {
                self.carry.phase = DecayPhase::Moving;
                self.carry.current_speed = if config.moving_enabled && live < carried {
                    decay(
                        &config.moving_curve,
                        carried,
                        live,
                        config.moving_time_to_stop_at_max_speed,
                        max_speed,
                        dt,
                    )
                } else {
                    live
                };
            }
            None => {
                self.carry.phase = DecayPhase::Stopping;
                self.carry.current_speed = if config.stopping_enabled && carried > 0.0 {
                    decay(
                        &config.stopping_curve,
                        carried,
                        0.0,
                        config.stopping_time_to_stop_at_max_speed,
                        max_speed,
                        dt,
                    )
                } else {
                    0.0
                };
            }
        }
        instantaneous.unwrap_or(0.0).max(self.carry.current_speed)
    }
}

/// Decay `carried` toward `floor` along `curve`. The time to stop scales with
/// `carried / max_speed`, so slower speeds stop proportionally sooner.
fn decay(curve: &LinearCurve, carried: f32, floor: f32, time_at_max: f32, max_speed: f32, dt: f32) -> f32 {
    if carried <= floor || time_at_max <= 0.0 || max_speed <= 0.0 || curve.start() <= 0.0 {
        return floor;
    }
    let stop_time = time_at_max * (carried / max_speed);
    if stop_time <= 0.0 {
        return floor;
    }
    let remaining = curve.evaluate(dt / stop_time) / curve.start();
    (carried * remaining).max(floor)
}
