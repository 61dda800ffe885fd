// src/collaborators.rs
// Interfaces to the host engine. The pipeline calls these synchronously once per tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Bit mask selecting which collision layers a query considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const NONE: LayerMask = LayerMask(0);

    pub fn contains(&self, layer: u8) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::ALL
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

impl GroundHit {
    /// Steepness of the hit surface in degrees: 0 is flat, 90 is a vertical wall.
    pub fn surface_angle(&self) -> f32 {
        surface_angle(self.normal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeContact {
    pub normal: Vec3,
}

impl ProbeContact {
    pub fn surface_angle(&self) -> f32 {
        surface_angle(self.normal)
    }
}

pub(crate) fn surface_angle(normal: Vec3) -> f32 {
    if normal.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    normal.angle_between(Vec3::Y).to_degrees()
}

/// Downward ray query against walkable geometry.
pub trait GroundQuery {
    fn cast_down(&self, origin: Vec3, max_length: f32, mask: LayerMask) -> Option<GroundHit>;
}

/// Sphere overlap query used for headset wall-clip detection.
pub trait CollisionProbe {
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<ProbeContact>;
}

/// Screen fade driven by the host; both calls return immediately.
pub trait FadeService {
    fn begin_fade_out(&mut self, duration_secs: f32);
    fn begin_fade_in(&mut self, duration_secs: f32);
}

/// Everything a tick needs from the host, borrowed for the duration of the call.
pub struct Collaborators<'a> {
    pub ground: &'a dyn GroundQuery,
    pub probe: &'a dyn CollisionProbe,
    pub fade: &'a mut dyn FadeService,
}

impl<'a> Collaborators<'a> {
    pub fn new(
        ground: &'a dyn GroundQuery,
        probe: &'a dyn CollisionProbe,
        fade: &'a mut dyn FadeService,
    ) -> Self {
        Self { ground, probe, fade }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_angle() {
        assert!(surface_angle(Vec3::Y).abs() < 1e-4);
        assert!((surface_angle(Vec3::X) - 90.0).abs() < 1e-4);
        let slope = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert!((surface_angle(slope) - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_layer_mask() {
        assert!(LayerMask::ALL.contains(5));
        assert!(!LayerMask::NONE.contains(5));
        assert!(LayerMask(0b100).contains(2));
        assert!(!LayerMask(0b100).contains(40));
    }
}
