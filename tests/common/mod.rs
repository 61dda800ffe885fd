// Shared fakes for the integration tests: analytic ground, a wall probe and a recording fade.
#![allow(dead_code)]

use armswing_rs::collaborators::{CollisionProbe, FadeService, GroundHit, GroundQuery, LayerMask, ProbeContact};
use armswing_rs::config::LocomotionConfig;
use armswing_rs::motion::MovementProposal;
use armswing_rs::prevention::{BoundaryPreventionEngine, PreventionInput, PreventionOutput};
use armswing_rs::Collaborators;
use glam::{Quat, Vec3};

pub const HEADSET_LOCAL: Vec3 = Vec3::new(0.0, 1.6, 0.0);
pub const DT: f32 = 1.0 / 90.0;

/// Ground described by a height function of (x, z); `None` means a hole.
pub struct Ground<F: Fn(f32, f32) -> Option<(f32, Vec3)>>(pub F);

impl<F: Fn(f32, f32) -> Option<(f32, Vec3)>> GroundQuery for Ground<F> {
    fn cast_down(&self, origin: Vec3, max_length: f32, _mask: LayerMask) -> Option<GroundHit> {
        let (height, normal) = (self.0)(origin.x, origin.z)?;
        let distance = origin.y - height;
        (0.0..=max_length).contains(&distance).then(|| GroundHit {
            point: Vec3::new(origin.x, height, origin.z),
            normal,
            distance,
        })
    }
}

pub fn flat() -> Ground<impl Fn(f32, f32) -> Option<(f32, Vec3)>> {
    Ground(|_, _| Some((0.0, Vec3::Y)))
}

/// Incline of `angle_deg` rising along +Z from `start_z`.
pub fn slope(start_z: f32, angle_deg: f32) -> Ground<impl Fn(f32, f32) -> Option<(f32, Vec3)>> {
    let angle = angle_deg.to_radians();
    Ground(move |_, z| {
        if z <= start_z {
            Some((0.0, Vec3::Y))
        } else {
            Some(((z - start_z) * angle.tan(), Vec3::new(0.0, angle.cos(), -angle.sin())))
        }
    })
}

/// Decline of `angle_deg` dropping along +Z from `start_z`.
pub fn descent(start_z: f32, angle_deg: f32) -> Ground<impl Fn(f32, f32) -> Option<(f32, Vec3)>> {
    let angle = angle_deg.to_radians();
    Ground(move |_, z| {
        if z <= start_z {
            Some((0.0, Vec3::Y))
        } else {
            Some((-(z - start_z) * angle.tan(), Vec3::new(0.0, angle.cos(), angle.sin())))
        }
    })
}

/// Flat floor that jumps by `height` past `at_z`.
pub fn step(at_z: f32, height: f32) -> Ground<impl Fn(f32, f32) -> Option<(f32, Vec3)>> {
    Ground(move |_, z| Some((if z > at_z { height } else { 0.0 }, Vec3::Y)))
}

/// Flat floor that ends at `edge_z`.
pub fn void_after(edge_z: f32) -> Ground<impl Fn(f32, f32) -> Option<(f32, Vec3)>> {
    Ground(move |_, z| (z <= edge_z).then_some((0.0, Vec3::Y)))
}

/// Vertical wall across +Z at `z`; `None` disables it.
pub struct Wall(pub Option<f32>);

impl CollisionProbe for Wall {
    fn overlap_sphere(&self, center: Vec3, radius: f32, _mask: LayerMask) -> Vec<ProbeContact> {
        match self.0 {
            Some(z) if center.z + radius >= z => vec![ProbeContact { normal: Vec3::NEG_Z }],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingFade {
    pub outs: Vec<f32>,
    pub ins: Vec<f32>,
}

impl FadeService for RecordingFade {
    fn begin_fade_out(&mut self, duration_secs: f32) {
        self.outs.push(duration_secs);
    }

    fn begin_fade_in(&mut self, duration_secs: f32) {
        self.ins.push(duration_secs);
    }
}

/// Bundles the fakes and drives the engine one tick at a time.
pub struct Harness<G: GroundQuery> {
    pub config: LocomotionConfig,
    pub engine: BoundaryPreventionEngine,
    pub ground: G,
    pub wall: Wall,
    pub fade: RecordingFade,
    pub rig: Vec3,
    pub headset_local: Vec3,
    pub dt: f32,
}

impl<G: GroundQuery> Harness<G> {
    pub fn new(config: LocomotionConfig, ground: G, wall: Wall, rig: Vec3) -> Self {
        Self {
            engine: BoundaryPreventionEngine::new(&config),
            config,
            ground,
            wall,
            fade: RecordingFade::default(),
            rig,
            headset_local: HEADSET_LOCAL,
            dt: DT,
        }
    }

    pub fn tick(&mut self, translation: Vec3, arm_swinging: bool) -> PreventionOutput {
        let input = PreventionInput {
            proposal: MovementProposal { translation, rotation: Quat::IDENTITY },
            rig_position: self.rig,
            headset_local: self.headset_local,
            arm_swinging,
            dt: self.dt,
        };
        let mut collab = Collaborators::new(&self.ground, &self.wall, &mut self.fade);
        let out = self.engine.process(&self.config, &input, &mut collab);
        self.rig = out.rig_position;
        out
    }

    /// Tick with no movement until the current rewind has faded back in.
    pub fn finish_rewind(&mut self) -> usize {
        let mut ticks = 0;
        while self.engine.rewind_in_progress() {
            self.tick(Vec3::ZERO, false);
            ticks += 1;
            assert!(ticks < 1000, "rewind never completed");
        }
        ticks
    }
}
