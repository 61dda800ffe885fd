// src/prevention/engine.rs
//! Boundary prevention engine.
//!
//! Validates each tick's proposed play-space move against the terrain:
//!
//! - wall clip: sphere probe at the proposed headset position
//! - instant height: per-tick change of the ground height under the headset
//! - OHAWAS: ground height drifting while height adjustment waits for arm swinging
//! - climb / fall / wall-walk: slope angles, checked every time the headset has
//!   moved the rewind save distance and debounced over consecutive checks
//!
//! A violation is corrected by a rewind (fade out, jump back through the safe
//! position history, fade in) or a push-back (stay at a recent clean position).
//! Push-backs draw from a token bucket and escalate to a rewind once it is empty.

use glam::Vec3;

use crate::collaborators::{CollisionProbe, Collaborators, FadeService, GroundHit};
use crate::config::{LocomotionConfig, PreventionMode};
use crate::motion::MovementProposal;
use crate::prevention::history::{PreventionReasonHistory, SafePositionHistory};
use crate::prevention::terrain::TerrainHeightTracker;
use crate::prevention::token_bucket::{PUSH_BACK_COST, TokenBucket};
use crate::prevention::{CorrectionOutcome, FrameFlags, PreventionReason};
use crate::ring::RingBuffer;

/// Clean camera-rig positions kept for push-back.
const PUSH_BACK_HISTORY_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadePhase {
    FadingOut,
    FadingIn,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correction {
    Rewind {
        phase: FadePhase,
        elapsed: f32,
        target: Vec3,
        reason: PreventionReason,
    },
    PushBack {
        reason: PreventionReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineState {
    /// Nothing was checked this tick (all preventions paused, or freshly reset).
    Idle,
    Checking,
    Correcting(Correction),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreventionInput {
    pub proposal: MovementProposal,
    /// Camera-rig (play space origin) position before this tick's move.
    pub rig_position: Vec3,
    /// Headset position relative to the camera rig, in world units.
    pub headset_local: Vec3,
    pub arm_swinging: bool,
    pub dt: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreventionOutput {
    /// Where the camera rig ends up this tick.
    pub rig_position: Vec3,
    /// `rig_position - input.rig_position`.
    pub translation: Vec3,
    pub outcome: CorrectionOutcome,
    pub reason: PreventionReason,
    pub flags: FrameFlags,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Violation {
    reason: PreventionReason,
    mode: PreventionMode,
}

#[derive(Debug, Clone)]
pub struct BoundaryPreventionEngine {
    state: EngineState,
    terrain: TerrainHeightTracker,
    safe_positions: SafePositionHistory,
    push_back_positions: RingBuffer<Vec3>,
    climb_fall_history: PreventionReasonHistory,
    wall_walk_history: PreventionReasonHistory,
    token_bucket: TokenBucket,
    previous_ground: Option<GroundHit>,
    angle_check_anchor: Option<(Vec3, GroundHit)>,
    /// Becomes the anchor only if this tick's move is accepted.
    proposed_anchor: Option<(Vec3, GroundHit)>,
    manual_rewind_requested: bool,
    pending_fade_in: bool,
}

impl BoundaryPreventionEngine {
    pub fn new(config: &LocomotionConfig) -> Self {
        Self {
            state: EngineState::Idle,
            terrain: TerrainHeightTracker::new(config),
            safe_positions: SafePositionHistory::new(config.rewind.num_saved_positions_to_store),
            push_back_positions: RingBuffer::new(PUSH_BACK_HISTORY_SIZE),
            climb_fall_history: PreventionReasonHistory::new(config.checks.num_climb_fall_checks_oob_before_rewind),
            wall_walk_history: PreventionReasonHistory::new(config.checks.num_wall_walk_checks_oob_before_rewind),
            token_bucket: TokenBucket::from_config(&config.push_back_override),
            previous_ground: None,
            angle_check_anchor: None,
            proposed_anchor: None,
            manual_rewind_requested: false,
            pending_fade_in: false,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn rewind_in_progress(&self) -> bool {
        matches!(self.state, EngineState::Correcting(Correction::Rewind { .. }))
    }

    pub fn token_bucket(&self) -> &TokenBucket {
        &self.token_bucket
    }

    pub fn safe_positions(&self) -> &SafePositionHistory {
        &self.safe_positions
    }

    pub fn climb_fall_history(&self) -> &PreventionReasonHistory {
        &self.climb_fall_history
    }

    pub fn wall_walk_history(&self) -> &PreventionReasonHistory {
        &self.wall_walk_history
    }

    /// Rewind with reason `MANUAL` on the next tick.
    pub fn request_rewind(&mut self) {
        self.manual_rewind_requested = true;
    }

    /// Forget every history and cache, e.g. after a legitimate teleport. An
    /// interrupted rewind gets its fade-in on the next tick so the view is not
    /// left dark.
    pub fn reset(&mut self) {
        if let EngineState::Correcting(Correction::Rewind { phase: FadePhase::FadingOut, .. }) = self.state {
            self.pending_fade_in = true;
        }
        self.state = EngineState::Idle;
        self.safe_positions.clear();
        self.push_back_positions.clear();
        self.climb_fall_history.clear();
        self.wall_walk_history.clear();
        self.token_bucket.fill();
        self.manual_rewind_requested = false;
        self.forget_ground();
    }

    pub fn process(
        &mut self,
        config: &LocomotionConfig,
        input: &PreventionInput,
        collab: &mut Collaborators<'_>,
    ) -> PreventionOutput {
        self.sync_config(config);
        self.token_bucket.refill(input.dt);
        self.proposed_anchor = None;
        if self.pending_fade_in {
            collab.fade.begin_fade_in(config.rewind.fade_in_sec);
            self.pending_fade_in = false;
        }

        if self.rewind_in_progress() {
            return self.advance_rewind(config, input, &mut *collab.fade, input.dt);
        }

        if self.safe_positions.is_empty() {
            self.safe_positions
                .record(input.rig_position + input.headset_local, input.rig_position);
        }

        if self.manual_rewind_requested {
            self.manual_rewind_requested = false;
            return self.begin_rewind(config, input, &mut *collab.fade, PreventionReason::Manual, FrameFlags::default());
        }

        let proposed_rig = input.rig_position + input.proposal.translation;
        let proposed_headset = proposed_rig + input.headset_local;
        let hit = self.terrain.query(config, collab.ground, proposed_headset);
        let mut flags = FrameFlags {
            no_ground: hit.is_none(),
            ..FrameFlags::default()
        };
        if hit.is_none() {
            tracing::debug!("No ground under headset at {:?}", proposed_headset);
        }

        if config.policy.preventions_paused {
            self.state = EngineState::Idle;
            return self.accept(config, input, proposed_rig, hit, flags);
        }

        match self.run_checks(config, input, collab.probe, proposed_headset, hit, &mut flags) {
            Some(violation) => self.correct(config, input, &mut *collab.fade, violation, flags),
            None => {
                self.state = EngineState::Checking;
                self.accept(config, input, proposed_rig, hit, flags)
            }
        }
    }

    fn sync_config(&mut self, config: &LocomotionConfig) {
        self.token_bucket.reconfigure(&config.push_back_override);
        self.safe_positions.resize(config.rewind.num_saved_positions_to_store);
        self.climb_fall_history
            .set_required(config.checks.num_climb_fall_checks_oob_before_rewind);
        self.wall_walk_history
            .set_required(config.checks.num_wall_walk_checks_oob_before_rewind);
    }

    /// Run every enabled check and return the highest-priority violation.
    fn run_checks(
        &mut self,
        config: &LocomotionConfig,
        input: &PreventionInput,
        probe: &dyn CollisionProbe,
        headset: Vec3,
        hit: Option<GroundHit>,
        flags: &mut FrameFlags,
    ) -> Option<Violation> {
        let mut found = None;

        if config.wall_clip.enabled && !config.policy.wall_clip_prevention_paused {
            let contacts = probe.overlap_sphere(headset, config.headset_collider_radius(), config.wall_clip.layers);
            if contacts
                .iter()
                .any(|c| c.surface_angle() >= config.wall_clip.min_angle_to_trigger)
            {
                flags.wall_clip_this_frame = true;
                found = Some(Violation {
                    reason: PreventionReason::Headset,
                    mode: config.wall_clip.mode,
                });
            }
        }

        // No ground: height and angle checks sit this tick out.
        let Some(hit) = hit else {
            return found;
        };
        let angle_checks = !config.policy.angle_preventions_paused;
        let max_change = config.instant_height_max_change();
        let height_restricted = config.raycast.only_height_adjust_while_arm_swinging && !input.arm_swinging;

        if height_restricted {
            if let Some(reference) = self.terrain.last_hit_while_swinging() {
                if (hit.point.y - reference.point.y).abs() > max_change && found.is_none() {
                    found = Some(Violation {
                        reason: PreventionReason::Ohawas,
                        mode: PreventionMode::Rewind,
                    });
                }
            }
        } else if angle_checks {
            if let Some(previous) = self.previous_ground {
                let dy = hit.point.y - previous.point.y;
                let instant = if dy > max_change && config.climbing.enabled {
                    Some(Violation {
                        reason: PreventionReason::InstantClimbing,
                        mode: config.instant_height.climb_mode,
                    })
                } else if dy < -max_change && config.falling.enabled {
                    Some(Violation {
                        reason: PreventionReason::InstantFalling,
                        mode: config.instant_height.fall_mode,
                    })
                } else {
                    None
                };
                found = found.or(instant);
            }
        }

        if angle_checks {
            let debounced = self.angle_check(config, headset, hit);
            found = found.or(debounced);
        }
        found
    }

    /// Slope checks, spaced by the rewind save distance rather than by tick.
    fn angle_check(&mut self, config: &LocomotionConfig, headset: Vec3, hit: GroundHit) -> Option<Violation> {
        if !(config.climbing.enabled || config.falling.enabled || config.wall_walking.enabled) {
            return None;
        }
        let Some((anchor_headset, anchor_hit)) = self.angle_check_anchor else {
            self.proposed_anchor = Some((headset, hit));
            return None;
        };
        if horizontal_distance(headset, anchor_headset) < config.min_distance_change_to_save_position() {
            return None;
        }
        self.proposed_anchor = Some((headset, hit));

        let (climb_fall, wall_walk) = classify_slope(config, &anchor_hit, &hit);
        self.climb_fall_history.record(climb_fall);
        self.wall_walk_history.record(wall_walk);
        if climb_fall.is_violation() || wall_walk.is_violation() {
            tracing::debug!("Angle check out of bounds: {:?} / {:?}", climb_fall, wall_walk);
        }

        self.climb_fall_history
            .triggered()
            .or_else(|| self.wall_walk_history.triggered())
            .map(|reason| Violation {
                reason,
                mode: PreventionMode::Rewind,
            })
    }

    fn correct(
        &mut self,
        config: &LocomotionConfig,
        input: &PreventionInput,
        fade: &mut dyn FadeService,
        violation: Violation,
        flags: FrameFlags,
    ) -> PreventionOutput {
        match violation.mode {
            PreventionMode::Rewind => self.begin_rewind(config, input, fade, violation.reason, flags),
            PreventionMode::PushBack => {
                if config.push_back_override.enabled && !self.token_bucket.try_spend(PUSH_BACK_COST) {
                    tracing::info!(
                        "Push back override: token bucket empty during {:?}, rewinding instead",
                        violation.reason
                    );
                    return self.begin_rewind(config, input, fade, violation.reason, flags);
                }
                self.push_back(input, violation.reason, flags)
            }
        }
    }

    fn push_back(&mut self, input: &PreventionInput, reason: PreventionReason, mut flags: FrameFlags) -> PreventionOutput {
        let target = self.push_back_positions.oldest().unwrap_or(input.rig_position);
        tracing::debug!("Pushing back ({:?}) to {:?}", reason, target);
        self.state = EngineState::Correcting(Correction::PushBack { reason });
        flags.out_of_bounds = true;
        PreventionOutput {
            rig_position: target,
            translation: target - input.rig_position,
            outcome: CorrectionOutcome::PushBackApplied,
            reason,
            flags,
        }
    }

    fn begin_rewind(
        &mut self,
        config: &LocomotionConfig,
        input: &PreventionInput,
        fade: &mut dyn FadeService,
        reason: PreventionReason,
        flags: FrameFlags,
    ) -> PreventionOutput {
        let depth = config.rewind.num_saved_positions_to_rewind;
        let target = match self.safe_positions.rewind(depth) {
            // Land the headset on the saved spot, keeping the player's offset in the play space.
            Some((headset, rig)) => Vec3::new(
                headset.x - input.headset_local.x,
                rig.y,
                headset.z - input.headset_local.z,
            ),
            None => {
                tracing::warn!("Rewind requested with no saved positions, staying in place");
                input.rig_position
            }
        };
        tracing::info!("Out of bounds ({:?}), rewinding {} saved positions", reason, depth);

        fade.begin_fade_out(config.rewind.fade_out_sec);
        self.climb_fall_history.clear();
        self.wall_walk_history.clear();
        self.push_back_positions.clear();
        self.token_bucket.fill();
        self.state = EngineState::Correcting(Correction::Rewind {
            phase: FadePhase::FadingOut,
            elapsed: 0.0,
            target,
            reason,
        });

        let mut output = self.advance_rewind(config, input, fade, 0.0);
        output.outcome = CorrectionOutcome::RewindApplied;
        output.reason = reason;
        output.flags.rewind_this_frame = true;
        output.flags.out_of_bounds = true;
        output.flags.wall_clip_this_frame = flags.wall_clip_this_frame;
        output.flags.no_ground = flags.no_ground;
        output
    }

    /// Move the fade forward by `step` seconds. The rig jumps once the fade-out has finished.
    fn advance_rewind(
        &mut self,
        config: &LocomotionConfig,
        input: &PreventionInput,
        fade: &mut dyn FadeService,
        step: f32,
    ) -> PreventionOutput {
        let mut rig_position = input.rig_position;
        let mut landed = false;
        let mut finished = false;

        if let EngineState::Correcting(Correction::Rewind { phase, elapsed, target, .. }) = &mut self.state {
            *elapsed += step;
            match *phase {
                FadePhase::FadingOut if *elapsed >= config.rewind.fade_out_sec => {
                    rig_position = *target;
                    fade.begin_fade_in(config.rewind.fade_in_sec);
                    *phase = FadePhase::FadingIn;
                    *elapsed = 0.0;
                    landed = true;
                    finished = config.rewind.fade_in_sec <= 0.0;
                }
                FadePhase::FadingIn if *elapsed >= config.rewind.fade_in_sec => {
                    finished = true;
                }
                _ => {}
            }
        }

        if landed {
            tracing::debug!("Rewind landed at {:?}", rig_position);
            self.forget_ground();
        }
        if finished {
            tracing::debug!("Rewind complete");
            self.state = EngineState::Checking;
        }

        let in_progress = self.rewind_in_progress();
        PreventionOutput {
            rig_position,
            translation: rig_position - input.rig_position,
            outcome: CorrectionOutcome::NoCorrection,
            reason: PreventionReason::None,
            flags: FrameFlags {
                out_of_bounds: in_progress,
                rewind_in_progress: in_progress,
                ..FrameFlags::default()
            },
        }
    }

    /// Apply the proposed move, adjust height and maybe save a safe position.
    fn accept(
        &mut self,
        config: &LocomotionConfig,
        input: &PreventionInput,
        proposed_rig: Vec3,
        hit: Option<GroundHit>,
        flags: FrameFlags,
    ) -> PreventionOutput {
        let mut rig = proposed_rig;
        if let Some(height) = self.terrain.adjust(config, hit, input.arm_swinging) {
            rig.y = height;
        }
        if hit.is_some() {
            self.previous_ground = hit;
        }
        if let Some(anchor) = self.proposed_anchor.take() {
            self.angle_check_anchor = Some(anchor);
        }
        self.push_back_positions.push(rig);

        let headset = rig + input.headset_local;
        let unsafe_climb_fall = config.rewind.dont_save_unsafe_climb_fall_positions
            && self.climb_fall_history.latest_is_violation();
        let unsafe_wall_walk = config.rewind.dont_save_unsafe_wall_walk_positions
            && self.wall_walk_history.latest_is_violation();
        if !unsafe_climb_fall
            && !unsafe_wall_walk
            && self
                .safe_positions
                .moved_enough(headset, config.min_distance_change_to_save_position())
        {
            self.safe_positions.record(headset, rig);
        }

        PreventionOutput {
            rig_position: rig,
            translation: rig - input.rig_position,
            outcome: CorrectionOutcome::NoCorrection,
            reason: if flags.no_ground { PreventionReason::NoGround } else { PreventionReason::None },
            flags,
        }
    }

    fn forget_ground(&mut self) {
        self.previous_ground = None;
        self.angle_check_anchor = None;
        self.proposed_anchor = None;
        self.terrain.reset();
    }
}

fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    let d = a - b;
    (d.x * d.x + d.z * d.z).sqrt()
}

/// Classify the move from `from` to `to` for the climb/fall and wall-walk families.
fn classify_slope(config: &LocomotionConfig, from: &GroundHit, to: &GroundHit) -> (PreventionReason, PreventionReason) {
    let rise = to.point.y - from.point.y;
    let run = horizontal_distance(to.point, from.point);
    let center_angle = rise.atan2(run).to_degrees();
    let max_climb = config.climbing.max_angle_player_can_climb;
    let max_fall = config.falling.max_angle_player_can_fall;

    let climb_fall = if config.climbing.enabled && center_angle > max_climb {
        PreventionReason::Climbing
    } else if config.falling.enabled && center_angle < -max_fall {
        PreventionReason::Falling
    } else {
        PreventionReason::None
    };

    // Progress along the path is within limits, but the surface underfoot is too steep.
    let wall_walk = if config.wall_walking.enabled && !climb_fall.is_violation() {
        let limit = if center_angle >= 0.0 { max_climb } else { max_fall };
        if to.surface_angle() > limit {
            PreventionReason::WallWalk
        } else {
            PreventionReason::None
        }
    } else {
        PreventionReason::None
    };

    (climb_fall, wall_walk)
}
