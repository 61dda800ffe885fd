// Full per-tick pipeline: controllers in, play-space move out

mod common;

use std::f32::consts::FRAC_PI_2;

use armswing_rs::config::LocomotionConfig;
use armswing_rs::{update, Collaborators, ControllerFrame, ControllerPose, CorrectionOutcome, FrameInput, FrameOutput, LocomotionState};
use common::{flat, RecordingFade, Wall, DT, HEADSET_LOCAL};
use glam::{Quat, Vec3};

fn pose(x: f32, z: f32, rotation: Quat, pressed: bool) -> ControllerPose {
    ControllerPose { position: Vec3::new(x, 1.0, z), rotation, button_pressed: pressed }
}

/// Controllers moving 0.02 m per tick in opposite directions.
fn swinging(frame: usize, rotations: (Quat, Quat), buttons: (bool, bool)) -> FrameInput {
    let z = if frame % 2 == 0 { 0.0 } else { 0.02 };
    FrameInput {
        dt: DT,
        headset_local_position: HEADSET_LOCAL,
        controllers: ControllerFrame {
            left: pose(-0.2, z, rotations.0, buttons.0),
            right: pose(0.2, -z, rotations.1, buttons.1),
        },
    }
}

fn run(
    state: &mut LocomotionState,
    config: &LocomotionConfig,
    fade: &mut RecordingFade,
    input: &FrameInput,
) -> FrameOutput {
    let ground = flat();
    let wall = Wall(None);
    let mut collab = Collaborators::new(&ground, &wall, fade);
    update(state, config, input, &mut collab)
}

const FORWARD: (Quat, Quat) = (Quat::IDENTITY, Quat::IDENTITY);

#[test]
fn test_swing_then_release_coasts_to_a_stop() {
    let config = LocomotionConfig::default();
    let mut state = LocomotionState::new(&config, Vec3::ZERO);
    let mut fade = RecordingFade::default();

    let mut last_z = 0.0;
    for frame in 0..60 {
        let out = run(&mut state, &config, &mut fade, &swinging(frame, FORWARD, (true, true)));
        assert!(out.rig_position.z >= last_z);
        last_z = out.rig_position.z;
    }
    assert!(state.flags().arm_swinging);
    let swung = state.rig_position().z;
    assert!(swung > 1.0);

    let mut coasted = 0.0;
    for frame in 60..150 {
        let out = run(&mut state, &config, &mut fade, &swinging(frame, FORWARD, (false, false)));
        assert!(!out.flags.arm_swinging);
        coasted += out.translation.z;
    }
    assert!(coasted > 0.0);
    let stopped = state.rig_position();
    let out = run(&mut state, &config, &mut fade, &swinging(150, FORWARD, (false, false)));
    assert_eq!(out.rig_position, stopped);
}

#[test]
fn test_single_controller_steers_with_its_own_rotation() {
    let config = LocomotionConfig::default();
    let mut state = LocomotionState::new(&config, Vec3::ZERO);
    let mut fade = RecordingFade::default();
    let rotations = (Quat::IDENTITY, Quat::from_rotation_y(FRAC_PI_2));
    for frame in 0..40 {
        run(&mut state, &config, &mut fade, &swinging(frame, rotations, (false, true)));
    }
    let rig = state.rig_position();
    assert!(rig.x > 0.5);
    assert!(rig.z.abs() < 1e-3);
}

#[test]
fn test_swinging_is_ignored_during_rewind() {
    let config = LocomotionConfig::default();
    let mut state = LocomotionState::new(&config, Vec3::ZERO);
    let mut fade = RecordingFade::default();
    for frame in 0..60 {
        run(&mut state, &config, &mut fade, &swinging(frame, FORWARD, (true, true)));
    }
    state.request_rewind();
    let out = run(&mut state, &config, &mut fade, &swinging(60, FORWARD, (true, true)));
    assert!(out.flags.rewind_this_frame);
    assert_eq!(out.outcome, CorrectionOutcome::RewindApplied);

    let mut frame = 61;
    while state.engine().rewind_in_progress() {
        let out = run(&mut state, &config, &mut fade, &swinging(frame, FORWARD, (true, true)));
        assert!(!out.flags.arm_swinging);
        frame += 1;
    }
    let (_, saved_rig) = state.engine().safe_positions().latest().unwrap();
    assert!(state.rig_position().distance(saved_rig) < 1e-4);
    assert_eq!(fade.outs.len(), 1);
    assert_eq!(fade.ins.len(), 1);
}

#[test]
fn test_reposition_mid_rewind_fades_back_in() {
    let config = LocomotionConfig::default();
    let mut state = LocomotionState::new(&config, Vec3::ZERO);
    let mut fade = RecordingFade::default();
    for frame in 0..30 {
        run(&mut state, &config, &mut fade, &swinging(frame, FORWARD, (true, true)));
    }
    state.request_rewind();
    run(&mut state, &config, &mut fade, &swinging(30, FORWARD, (false, false)));
    assert!(state.engine().rewind_in_progress());
    assert!(fade.ins.is_empty());

    let target = Vec3::new(10.0, 0.0, -4.0);
    state.move_rig_to(target);
    let out = run(&mut state, &config, &mut fade, &swinging(31, FORWARD, (false, false)));
    assert_eq!(fade.ins.len(), 1);
    assert!(!out.flags.rewind_in_progress);
    assert_eq!(out.outcome, CorrectionOutcome::NoCorrection);
    assert_eq!(state.rig_position(), target);
}

#[test]
fn test_navigation_disabled_never_moves() {
    let mut config = LocomotionConfig::default();
    config.arm_swing.navigation = false;
    let mut state = LocomotionState::new(&config, Vec3::ZERO);
    let mut fade = RecordingFade::default();
    for frame in 0..30 {
        let out = run(&mut state, &config, &mut fade, &swinging(frame, FORWARD, (true, true)));
        assert_eq!(out.translation, Vec3::ZERO);
    }
}
