// Benchmark for the per-tick locomotion pipeline
// Run with: cargo bench

use std::hint::black_box;

use armswing_rs::collaborators::{CollisionProbe, FadeService, GroundHit, GroundQuery, LayerMask, ProbeContact};
use armswing_rs::config::LocomotionConfig;
use armswing_rs::{update, Collaborators, ControllerFrame, ControllerPose, FrameInput, LocomotionState};
use criterion::{criterion_group, criterion_main, Criterion};
use glam::{Quat, Vec3};

struct RollingHills;

impl GroundQuery for RollingHills {
    fn cast_down(&self, origin: Vec3, _max_length: f32, _mask: LayerMask) -> Option<GroundHit> {
        let y = 0.3 * (origin.z * 0.5).sin();
        let slope = 0.15 * (origin.z * 0.5).cos();
        Some(GroundHit {
            point: Vec3::new(origin.x, y, origin.z),
            normal: Vec3::new(0.0, 1.0, -slope).normalize(),
            distance: origin.y - y,
        })
    }
}

impl CollisionProbe for RollingHills {
    fn overlap_sphere(&self, _center: Vec3, _radius: f32, _mask: LayerMask) -> Vec<ProbeContact> {
        Vec::new()
    }
}

struct NoFade;

impl FadeService for NoFade {
    fn begin_fade_out(&mut self, _duration_secs: f32) {}
    fn begin_fade_in(&mut self, _duration_secs: f32) {}
}

fn frame_input(frame: usize) -> FrameInput {
    let z = 0.25 * (frame as f32 * 0.1).sin();
    let pose = |x: f32, z: f32| ControllerPose { position: Vec3::new(x, 1.0, z), rotation: Quat::IDENTITY, button_pressed: true };
    FrameInput {
        dt: 1.0 / 90.0,
        headset_local_position: Vec3::new(0.0, 1.6, 0.0),
        controllers: ControllerFrame { left: pose(-0.2, z), right: pose(0.2, -z) },
    }
}

fn bench_tick(c: &mut Criterion) {
    let config = LocomotionConfig::default();
    let inputs: Vec<FrameInput> = (0..900).map(frame_input).collect();
    c.bench_function("900 ticks over rolling hills", |b| {
        b.iter(|| {
            let mut state = LocomotionState::new(&config, Vec3::ZERO);
            let mut fade = NoFade;
            for input in &inputs {
                let mut collab = Collaborators::new(&RollingHills, &RollingHills, &mut fade);
                black_box(update(&mut state, &config, input, &mut collab));
            }
            state.rig_position()
        });
    });
}

fn bench_prevention_checks_with_large_history(c: &mut Criterion) {
    let mut config = LocomotionConfig::default();
    config.rewind.num_saved_positions_to_store = 90;
    config.smoothing.set_cache_size(90);
    config.raycast.set_average_height_cache_size(90);
    let inputs: Vec<FrameInput> = (0..900).map(frame_input).collect();
    c.bench_function("900 ticks with 90-entry caches", |b| {
        b.iter(|| {
            let mut state = LocomotionState::new(&config, Vec3::ZERO);
            let mut fade = NoFade;
            for input in &inputs {
                let mut collab = Collaborators::new(&RollingHills, &RollingHills, &mut fade);
                black_box(update(&mut state, &config, input, &mut collab));
            }
            state.rig_position()
        });
    });
}

criterion_group!(benches, bench_tick, bench_prevention_checks_with_large_history);
criterion_main!(benches);
