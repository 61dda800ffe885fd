// src/locomotion.rs - Per-tick entry point tying movement proposal to boundary prevention
use glam::{Quat, Vec3};
use serde::Serialize;

use crate::collaborators::Collaborators;
use crate::config::LocomotionConfig;
use crate::motion::{ControllerFrame, MovementProposer};
use crate::prevention::{
    BoundaryPreventionEngine, CorrectionOutcome, FrameFlags, PreventionInput, PreventionReason,
};

/// Everything the host samples for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    pub dt: f32,
    /// Headset position relative to the camera rig.
    pub headset_local_position: Vec3,
    pub controllers: ControllerFrame,
}

/// Result of one tick, to be applied to the play space by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameOutput {
    #[serde(serialize_with = "serialize_vec3")]
    pub rig_position: Vec3,
    #[serde(serialize_with = "serialize_quat")]
    pub rotation: Quat,
    #[serde(serialize_with = "serialize_vec3")]
    pub translation: Vec3,
    pub outcome: CorrectionOutcome,
    pub reason: PreventionReason,
    pub flags: FrameFlags,
}

fn serialize_vec3<S: serde::Serializer>(v: &Vec3, s: S) -> Result<S::Ok, S::Error> {
    v.to_array().serialize(s)
}

fn serialize_quat<S: serde::Serializer>(q: &Quat, s: S) -> Result<S::Ok, S::Error> {
    q.to_array().serialize(s)
}

/// All state carried between ticks. Owned by the host and handed to [`update`].
#[derive(Debug, Clone)]
pub struct LocomotionState {
    proposer: MovementProposer,
    engine: BoundaryPreventionEngine,
    rig_position: Vec3,
    flags: FrameFlags,
}

impl LocomotionState {
    pub fn new(config: &LocomotionConfig, rig_position: Vec3) -> Self {
        Self {
            proposer: MovementProposer::new(config),
            engine: BoundaryPreventionEngine::new(config),
            rig_position,
            flags: FrameFlags::default(),
        }
    }

    pub fn rig_position(&self) -> Vec3 {
        self.rig_position
    }

    /// Flags from the most recent tick.
    pub fn flags(&self) -> FrameFlags {
        self.flags
    }

    pub fn proposer(&self) -> &MovementProposer {
        &self.proposer
    }

    pub fn engine(&self) -> &BoundaryPreventionEngine {
        &self.engine
    }

    /// Reposition the player from outside the pipeline (teleport, level load).
    /// Clears every history and cache so the jump is not mistaken for an exploit.
    pub fn move_rig_to(&mut self, position: Vec3) {
        tracing::info!("Manual reposition to {:?}, resetting locomotion state", position);
        self.rig_position = position;
        self.proposer.reset();
        self.engine.reset();
        self.flags = FrameFlags::default();
    }

    /// Rewind to an earlier safe position on the next tick.
    pub fn request_rewind(&mut self) {
        self.engine.request_rewind();
    }
}

/// Run one tick: sample controllers, propose a move, validate it against the terrain.
pub fn update(
    state: &mut LocomotionState,
    config: &LocomotionConfig,
    input: &FrameInput,
    collab: &mut Collaborators<'_>,
) -> FrameOutput {
    let suppressed = state.engine.rewind_in_progress();
    let proposed = state
        .proposer
        .propose(config, &input.controllers, input.dt, suppressed);

    let prevention = state.engine.process(
        config,
        &PreventionInput {
            proposal: proposed.proposal,
            rig_position: state.rig_position,
            headset_local: input.headset_local_position,
            arm_swinging: proposed.arm_swinging,
            dt: input.dt,
        },
        collab,
    );

    let flags = FrameFlags {
        arm_swinging: proposed.arm_swinging,
        ..prevention.flags
    };
    state.rig_position = prevention.rig_position;
    state.flags = flags;

    FrameOutput {
        rig_position: prevention.rig_position,
        rotation: proposed.proposal.rotation,
        translation: prevention.translation,
        outcome: prevention.outcome,
        reason: prevention.reason,
        flags,
    }
}
