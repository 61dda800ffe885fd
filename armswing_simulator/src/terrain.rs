//! Synthetic host world: analytic ground, one optional wall, and a fade service
//! that only records what it was asked to do.

use armswing_rs::{CollisionProbe, FadeService, GroundHit, GroundQuery, LayerMask, ProbeContact};
use clap::ValueEnum;
use glam::Vec3;
use serde::Serialize;

/// Half-width of the square world; ground queries outside it miss.
pub const WORLD_HALF_EXTENT: f32 = 200.0;
/// Distance along +Z where each scenario's feature begins.
pub const FEATURE_Z: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Endless flat floor
    Flat,
    /// Walkable 30 degree incline
    Ramp,
    /// 60 degree incline, too steep to climb
    Cliff,
    /// Two metre drop
    Ledge,
    /// Vertical wall across the path
    Wall,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::Flat,
        Scenario::Ramp,
        Scenario::Cliff,
        Scenario::Ledge,
        Scenario::Wall,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Flat => "flat",
            Scenario::Ramp => "ramp",
            Scenario::Cliff => "cliff",
            Scenario::Ledge => "ledge",
            Scenario::Wall => "wall",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::Flat => "flat floor, no corrections expected",
            Scenario::Ramp => "30 degree incline from z=3, climbable",
            Scenario::Cliff => "60 degree incline from z=3, climbing is rewound",
            Scenario::Ledge => "2 m drop at z=3, instant fall is rewound",
            Scenario::Wall => "wall at z=3, headset clipping is pushed back",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SyntheticTerrain {
    scenario: Scenario,
}

impl SyntheticTerrain {
    pub fn new(scenario: Scenario) -> Self {
        Self { scenario }
    }

    fn incline(&self) -> Option<f32> {
        match self.scenario {
            Scenario::Ramp => Some(30.0_f32.to_radians()),
            Scenario::Cliff => Some(60.0_f32.to_radians()),
            _ => None,
        }
    }

    pub fn height_at(&self, _x: f32, z: f32) -> f32 {
        let past = (z - FEATURE_Z).max(0.0);
        match (self.scenario, self.incline()) {
            (_, Some(angle)) => past * angle.tan(),
            (Scenario::Ledge, _) if z > FEATURE_Z => -2.0,
            _ => 0.0,
        }
    }

    pub fn normal_at(&self, _x: f32, z: f32) -> Vec3 {
        match self.incline() {
            Some(angle) if z > FEATURE_Z => Vec3::new(0.0, angle.cos(), -angle.sin()),
            _ => Vec3::Y,
        }
    }
}

impl GroundQuery for SyntheticTerrain {
    fn cast_down(&self, origin: Vec3, max_length: f32, _mask: LayerMask) -> Option<GroundHit> {
        if origin.x.abs() > WORLD_HALF_EXTENT || origin.z.abs() > WORLD_HALF_EXTENT {
            return None;
        }
        let ground = self.height_at(origin.x, origin.z);
        let distance = origin.y - ground;
        if !(0.0..=max_length).contains(&distance) {
            return None;
        }
        Some(GroundHit {
            point: Vec3::new(origin.x, ground, origin.z),
            normal: self.normal_at(origin.x, origin.z),
            distance,
        })
    }
}

impl CollisionProbe for SyntheticTerrain {
    fn overlap_sphere(&self, center: Vec3, radius: f32, _mask: LayerMask) -> Vec<ProbeContact> {
        if self.scenario == Scenario::Wall && center.z + radius >= FEATURE_Z {
            vec![ProbeContact { normal: Vec3::NEG_Z }]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeKind {
    Out,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FadeEvent {
    pub frame: usize,
    pub kind: FadeKind,
    pub duration_secs: f32,
}

/// Records fade requests instead of rendering them.
#[derive(Debug, Default)]
pub struct RecordingFade {
    pub frame: usize,
    pub events: Vec<FadeEvent>,
}

impl RecordingFade {
    pub fn count(&self, kind: FadeKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}

impl FadeService for RecordingFade {
    fn begin_fade_out(&mut self, duration_secs: f32) {
        tracing::debug!("frame {}: fade out over {:.2}s", self.frame, duration_secs);
        self.events.push(FadeEvent { frame: self.frame, kind: FadeKind::Out, duration_secs });
    }

    fn begin_fade_in(&mut self, duration_secs: f32) {
        tracing::debug!("frame {}: fade in over {:.2}s", self.frame, duration_secs);
        self.events.push(FadeEvent { frame: self.frame, kind: FadeKind::In, duration_secs });
    }
}
