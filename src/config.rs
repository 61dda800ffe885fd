//! # Locomotion Configuration
//!
//! Every tunable of the arm-swing pipeline, grouped by concern. All sections and
//! fields have defaults, so a partial file is valid:
//!
//! ```toml
//! [arm_swing]
//! mode = "both_buttons_both_controllers"
//! max_speed = 6.0
//! both_controllers_coefficient = 1.2
//!
//! [smoothing]
//! mode = "average"
//! cache_size = 5
//!
//! [rewind]
//! num_saved_positions_to_store = 28
//! num_saved_positions_to_rewind = 7
//! ```
//!
//! Malformed curves make [`load_config`] fail with [`ConfigError::InvalidCurve`].
//! Ranged values are clamped by [`LocomotionConfig::sanitize`] after loading. The
//! runtime setters clamp cache sizes and reject out-of-range coefficients; neither
//! ever panics.

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collaborators::LayerMask;
use crate::curve::{CurveError, LinearCurve, ResponseCurve};

/// Largest fixed timestep at which collision-based prevention stays reliable (90 Hz).
pub const MAX_FIXED_TIMESTEP: f32 = 1.0 / 90.0;

pub const CACHE_SIZE_MIN: usize = 2;
pub const CACHE_SIZE_MAX: usize = 90;
pub const COEFFICIENT_MIN: f32 = 0.0;
pub const COEFFICIENT_MAX: f32 = 10.0;
pub const ANGLE_MIN: f32 = 0.0;
pub const ANGLE_MAX: f32 = 90.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("{field}: value {value} is out of range ({min}..{max})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("invalid curve: {0}")]
    InvalidCurve(#[from] CurveError),
}

/// Which button(s) start swinging and which controller(s) drive speed and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivationMode {
    BothButtonsBothControllers,
    LeftButtonBothControllers,
    RightButtonBothControllers,
    #[default]
    OneButtonSameController,
    OneButtonSameControllerExclusive,
}

/// Controller button the host should poll for swing activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControllerButton {
    Menu,
    #[default]
    Grip,
    TouchPad,
    Trigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMode {
    Lowest,
    Average,
    #[default]
    AverageMinusHighest,
}

/// Correction strategy applied when a prevention check fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreventionMode {
    Rewind,
    PushBack,
}

/// Runtime pause switches. Passed explicitly with the config, never hidden state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PolicyFlags {
    pub arm_swinging_paused: bool,
    pub preventions_paused: bool,
    pub angle_preventions_paused: bool,
    pub wall_clip_prevention_paused: bool,
    pub play_area_height_adjustment_paused: bool,
}

/// Main configuration struct for the locomotion pipeline.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LocomotionConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub arm_swing: ArmSwingConfig,
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    #[serde(default)]
    pub inertia: InertiaConfig,
    #[serde(default)]
    pub raycast: RaycastConfig,
    #[serde(default)]
    pub wall_clip: WallClipConfig,
    #[serde(default)]
    pub climbing: ClimbingConfig,
    #[serde(default)]
    pub falling: FallingConfig,
    #[serde(default)]
    pub wall_walking: WallWalkingConfig,
    #[serde(default)]
    pub instant_height: InstantHeightConfig,
    #[serde(default)]
    pub checks: ChecksConfig,
    #[serde(default)]
    pub push_back_override: PushBackOverrideConfig,
    #[serde(default)]
    pub rewind: RewindConfig,
    #[serde(default)]
    pub policy: PolicyFlags,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub scale_world_units_to_rig_scale: bool,
    #[serde(default = "default_rig_scale")]
    pub rig_scale: f32,
    #[serde(default = "default_true")]
    pub auto_adjust_fixed_timestep: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            scale_world_units_to_rig_scale: false,
            rig_scale: default_rig_scale(),
            auto_adjust_fixed_timestep: true,
        }
    }
}

impl GeneralConfig {
    /// Returns the timestep the host should run its fixed tick at.
    pub fn check_fixed_timestep(&self, fixed_dt: f32) -> f32 {
        if fixed_dt <= MAX_FIXED_TIMESTEP {
            return fixed_dt;
        }
        if self.auto_adjust_fixed_timestep {
            tracing::info!(
                "Fixed timestep {:.4}s is too coarse for wall clip prevention, reducing to {:.4}s",
                fixed_dt,
                MAX_FIXED_TIMESTEP
            );
            MAX_FIXED_TIMESTEP
        } else {
            tracing::warn!(
                "Fixed timestep {:.4}s exceeds {:.4}s; collision-based prevention may miss walls",
                fixed_dt,
                MAX_FIXED_TIMESTEP
            );
            fixed_dt
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArmSwingConfig {
    #[serde(default = "default_true")]
    pub navigation: bool,
    #[serde(default)]
    pub button: ControllerButton,
    #[serde(default)]
    pub mode: ActivationMode,
    #[serde(default)]
    pub curve: ResponseCurve,
    #[serde(default = "default_controller_speed_for_max_speed")]
    pub controller_speed_for_max_speed: f32,
    #[serde(default = "default_max_speed")]
    pub max_speed: f32,
    #[serde(default = "default_both_controllers_coefficient")]
    both_controllers_coefficient: f32,
    #[serde(default = "default_single_controller_coefficient")]
    single_controller_coefficient: f32,
}

impl Default for ArmSwingConfig {
    fn default() -> Self {
        Self {
            navigation: true,
            button: ControllerButton::default(),
            mode: ActivationMode::default(),
            curve: ResponseCurve::default(),
            controller_speed_for_max_speed: default_controller_speed_for_max_speed(),
            max_speed: default_max_speed(),
            both_controllers_coefficient: default_both_controllers_coefficient(),
            single_controller_coefficient: default_single_controller_coefficient(),
        }
    }
}

impl ArmSwingConfig {
    pub fn both_controllers_coefficient(&self) -> f32 {
        self.both_controllers_coefficient
    }

    pub fn single_controller_coefficient(&self) -> f32 {
        self.single_controller_coefficient
    }

    pub fn set_both_controllers_coefficient(&mut self, value: f32) -> Result<(), ConfigError> {
        check_range("both_controllers_coefficient", value, COEFFICIENT_MIN, COEFFICIENT_MAX)?;
        self.both_controllers_coefficient = value;
        Ok(())
    }

    pub fn set_single_controller_coefficient(&mut self, value: f32) -> Result<(), ConfigError> {
        check_range("single_controller_coefficient", value, COEFFICIENT_MIN, COEFFICIENT_MAX)?;
        self.single_controller_coefficient = value;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmoothingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub mode: SmoothingMode,
    #[serde(default = "default_cache_size")]
    cache_size: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: SmoothingMode::default(),
            cache_size: default_cache_size(),
        }
    }
}

impl SmoothingConfig {
    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    pub fn set_cache_size(&mut self, size: usize) {
        self.cache_size = clamp_cache_size("smoothing.cache_size", size);
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InertiaConfig {
    #[serde(default = "default_true")]
    pub moving_enabled: bool,
    #[serde(default = "default_moving_time_to_stop")]
    pub moving_time_to_stop_at_max_speed: f32,
    #[serde(default)]
    pub moving_curve: LinearCurve,
    #[serde(default = "default_true")]
    pub stopping_enabled: bool,
    #[serde(default = "default_stopping_time_to_stop")]
    pub stopping_time_to_stop_at_max_speed: f32,
    #[serde(default)]
    pub stopping_curve: LinearCurve,
}

impl Default for InertiaConfig {
    fn default() -> Self {
        Self {
            moving_enabled: true,
            moving_time_to_stop_at_max_speed: default_moving_time_to_stop(),
            moving_curve: LinearCurve::default(),
            stopping_enabled: true,
            stopping_time_to_stop_at_max_speed: default_stopping_time_to_stop(),
            stopping_curve: LinearCurve::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RaycastConfig {
    #[serde(default)]
    pub ground_layers: LayerMask,
    #[serde(default = "default_raycast_max_length")]
    pub max_length: f32,
    #[serde(default = "default_cache_size")]
    average_height_cache_size: usize,
    #[serde(default)]
    pub only_height_adjust_while_arm_swinging: bool,
}

impl Default for RaycastConfig {
    fn default() -> Self {
        Self {
            ground_layers: LayerMask::ALL,
            max_length: default_raycast_max_length(),
            average_height_cache_size: default_cache_size(),
            only_height_adjust_while_arm_swinging: false,
        }
    }
}

impl RaycastConfig {
    pub fn average_height_cache_size(&self) -> usize {
        self.average_height_cache_size
    }

    pub fn set_average_height_cache_size(&mut self, size: usize) {
        self.average_height_cache_size = clamp_cache_size("raycast.average_height_cache_size", size);
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WallClipConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub layers: LayerMask,
    #[serde(default = "default_push_back")]
    pub mode: PreventionMode,
    #[serde(default = "default_headset_collider_radius")]
    pub headset_collider_radius: f32,
    #[serde(default = "default_wall_clip_min_angle")]
    pub min_angle_to_trigger: f32,
}

impl Default for WallClipConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            layers: LayerMask::ALL,
            mode: PreventionMode::PushBack,
            headset_collider_radius: default_headset_collider_radius(),
            min_angle_to_trigger: default_wall_clip_min_angle(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClimbingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_climb_angle")]
    pub max_angle_player_can_climb: f32,
}

impl Default for ClimbingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_angle_player_can_climb: default_max_climb_angle(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FallingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_fall_angle")]
    pub max_angle_player_can_fall: f32,
}

impl Default for FallingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_angle_player_can_fall: default_max_fall_angle(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WallWalkingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for WallWalkingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstantHeightConfig {
    #[serde(default = "default_instant_height_max_change")]
    pub max_change: f32,
    #[serde(default = "default_push_back")]
    pub climb_mode: PreventionMode,
    #[serde(default = "default_rewind")]
    pub fall_mode: PreventionMode,
}

impl Default for InstantHeightConfig {
    fn default() -> Self {
        Self {
            max_change: default_instant_height_max_change(),
            climb_mode: PreventionMode::PushBack,
            fall_mode: PreventionMode::Rewind,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChecksConfig {
    #[serde(default = "default_climb_fall_checks")]
    pub num_climb_fall_checks_oob_before_rewind: usize,
    #[serde(default = "default_wall_walk_checks")]
    pub num_wall_walk_checks_oob_before_rewind: usize,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            num_climb_fall_checks_oob_before_rewind: default_climb_fall_checks(),
            num_wall_walk_checks_oob_before_rewind: default_wall_walk_checks(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PushBackOverrideConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_refill_per_sec")]
    pub refill_per_sec: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: f32,
}

impl Default for PushBackOverrideConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refill_per_sec: default_refill_per_sec(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RewindConfig {
    #[serde(default = "default_min_distance_change")]
    pub min_distance_change_to_save_position: f32,
    #[serde(default = "default_true")]
    pub dont_save_unsafe_climb_fall_positions: bool,
    #[serde(default = "default_true")]
    pub dont_save_unsafe_wall_walk_positions: bool,
    #[serde(default = "default_positions_to_store")]
    pub num_saved_positions_to_store: usize,
    #[serde(default = "default_positions_to_rewind")]
    pub num_saved_positions_to_rewind: usize,
    #[serde(default = "default_fade_out_sec")]
    pub fade_out_sec: f32,
    #[serde(default = "default_fade_in_sec")]
    pub fade_in_sec: f32,
}

impl Default for RewindConfig {
    fn default() -> Self {
        Self {
            min_distance_change_to_save_position: default_min_distance_change(),
            dont_save_unsafe_climb_fall_positions: true,
            dont_save_unsafe_wall_walk_positions: true,
            num_saved_positions_to_store: default_positions_to_store(),
            num_saved_positions_to_rewind: default_positions_to_rewind(),
            fade_out_sec: default_fade_out_sec(),
            fade_in_sec: default_fade_in_sec(),
        }
    }
}

impl LocomotionConfig {
    /// Multiplier applied to world-unit settings when rig scaling is enabled.
    pub fn world_scale(&self) -> f32 {
        if self.general.scale_world_units_to_rig_scale {
            self.general.rig_scale
        } else {
            1.0
        }
    }

    pub fn max_speed(&self) -> f32 {
        self.arm_swing.max_speed * self.world_scale()
    }

    pub fn raycast_max_length(&self) -> f32 {
        self.raycast.max_length * self.world_scale()
    }

    pub fn instant_height_max_change(&self) -> f32 {
        self.instant_height.max_change * self.world_scale()
    }

    pub fn min_distance_change_to_save_position(&self) -> f32 {
        self.rewind.min_distance_change_to_save_position * self.world_scale()
    }

    pub fn headset_collider_radius(&self) -> f32 {
        self.wall_clip.headset_collider_radius * self.world_scale()
    }

    /// Check every response curve; a file with a malformed curve is rejected outright.
    pub fn validate_curves(&self) -> Result<(), ConfigError> {
        self.arm_swing.curve.validate()?;
        LinearCurve::new(self.inertia.moving_curve.start(), self.inertia.moving_curve.end())?;
        LinearCurve::new(self.inertia.stopping_curve.start(), self.inertia.stopping_curve.end())?;
        Ok(())
    }

    /// Clamp every ranged value into its valid range, warning about each change.
    pub fn sanitize(&mut self) {
        self.smoothing.set_cache_size(self.smoothing.cache_size);
        self.raycast
            .set_average_height_cache_size(self.raycast.average_height_cache_size);

        self.arm_swing.both_controllers_coefficient = clamp_f32(
            "arm_swing.both_controllers_coefficient",
            self.arm_swing.both_controllers_coefficient,
            COEFFICIENT_MIN,
            COEFFICIENT_MAX,
        );
        self.arm_swing.single_controller_coefficient = clamp_f32(
            "arm_swing.single_controller_coefficient",
            self.arm_swing.single_controller_coefficient,
            COEFFICIENT_MIN,
            COEFFICIENT_MAX,
        );
        self.wall_clip.min_angle_to_trigger = clamp_f32(
            "wall_clip.min_angle_to_trigger",
            self.wall_clip.min_angle_to_trigger,
            ANGLE_MIN,
            ANGLE_MAX,
        );
        self.climbing.max_angle_player_can_climb = clamp_f32(
            "climbing.max_angle_player_can_climb",
            self.climbing.max_angle_player_can_climb,
            ANGLE_MIN,
            ANGLE_MAX,
        );
        self.falling.max_angle_player_can_fall = clamp_f32(
            "falling.max_angle_player_can_fall",
            self.falling.max_angle_player_can_fall,
            ANGLE_MIN,
            ANGLE_MAX,
        );

        if self.arm_swing.controller_speed_for_max_speed <= 0.0 {
            tracing::warn!(
                "arm_swing.controller_speed_for_max_speed must be > 0, resetting to {}",
                default_controller_speed_for_max_speed()
            );
            self.arm_swing.controller_speed_for_max_speed = default_controller_speed_for_max_speed();
        }
        if self.general.rig_scale <= 0.0 {
            tracing::warn!("general.rig_scale must be > 0, resetting to 1.0");
            self.general.rig_scale = default_rig_scale();
        }
        if let Err(e) = self.arm_swing.curve.validate() {
            tracing::warn!("arm_swing.curve is invalid ({}), falling back to linear", e);
            self.arm_swing.curve = ResponseCurve::Linear;
        }
        for (field, curve) in [
            ("inertia.moving_curve", &mut self.inertia.moving_curve),
            ("inertia.stopping_curve", &mut self.inertia.stopping_curve),
        ] {
            if let Err(e) = LinearCurve::new(curve.start(), curve.end()) {
                tracing::warn!("{} is invalid ({}), falling back to a full linear decay", field, e);
                *curve = LinearCurve::DECAY;
            }
        }
        if self.checks.num_climb_fall_checks_oob_before_rewind == 0 {
            tracing::warn!("checks.num_climb_fall_checks_oob_before_rewind must be >= 1");
            self.checks.num_climb_fall_checks_oob_before_rewind = 1;
        }
        if self.checks.num_wall_walk_checks_oob_before_rewind == 0 {
            tracing::warn!("checks.num_wall_walk_checks_oob_before_rewind must be >= 1");
            self.checks.num_wall_walk_checks_oob_before_rewind = 1;
        }
        if self.push_back_override.max_tokens < 0.0 {
            tracing::warn!("push_back_override.max_tokens must be >= 0");
            self.push_back_override.max_tokens = 0.0;
        }
        if self.rewind.num_saved_positions_to_store == 0 {
            tracing::warn!("rewind.num_saved_positions_to_store must be >= 1");
            self.rewind.num_saved_positions_to_store = 1;
        }
        if self.rewind.num_saved_positions_to_store <= self.rewind.num_saved_positions_to_rewind {
            tracing::warn!(
                "rewind.num_saved_positions_to_store ({}) should be greater than num_saved_positions_to_rewind ({}); rewinds will not reach further back",
                self.rewind.num_saved_positions_to_store,
                self.rewind.num_saved_positions_to_rewind
            );
        }
    }

    pub fn save_config(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value >= min && value <= max {
        Ok(())
    } else {
        tracing::warn!(
            "{}: requested new value {} is out of range ({}..{}), keeping previous value",
            field,
            value,
            min,
            max
        );
        Err(ConfigError::OutOfRange { field, value, min, max })
    }
}

fn clamp_f32(field: &str, value: f32, min: f32, max: f32) -> f32 {
    let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
    if clamped != value {
        tracing::warn!("{}: value {} clamped to {}", field, value, clamped);
    }
    clamped
}

fn clamp_cache_size(field: &str, size: usize) -> usize {
    let clamped = size.clamp(CACHE_SIZE_MIN, CACHE_SIZE_MAX);
    if clamped != size {
        tracing::warn!("{}: cache size {} clamped to {}", field, size, clamped);
    }
    clamped
}

fn default_true() -> bool { true }
fn default_rig_scale() -> f32 { 1.0 }
fn default_controller_speed_for_max_speed() -> f32 { 3.0 }
fn default_max_speed() -> f32 { 8.0 }
fn default_both_controllers_coefficient() -> f32 { 1.0 }
fn default_single_controller_coefficient() -> f32 { 0.7 }
fn default_cache_size() -> usize { 3 }
fn default_moving_time_to_stop() -> f32 { 0.5 }
fn default_stopping_time_to_stop() -> f32 { 0.35 }
fn default_raycast_max_length() -> f32 { 100.0 }
fn default_push_back() -> PreventionMode { PreventionMode::PushBack }
fn default_rewind() -> PreventionMode { PreventionMode::Rewind }
fn default_headset_collider_radius() -> f32 { 0.11 }
fn default_wall_clip_min_angle() -> f32 { 20.0 }
fn default_max_climb_angle() -> f32 { 45.0 }
fn default_max_fall_angle() -> f32 { 60.0 }
fn default_instant_height_max_change() -> f32 { 0.2 }
fn default_climb_fall_checks() -> usize { 5 }
fn default_wall_walk_checks() -> usize { 15 }
fn default_refill_per_sec() -> f32 { 30.0 }
fn default_max_tokens() -> f32 { 90.0 }
fn default_min_distance_change() -> f32 { 0.05 }
fn default_positions_to_store() -> usize { 28 }
fn default_positions_to_rewind() -> usize { 7 }
fn default_fade_out_sec() -> f32 { 0.15 }
fn default_fade_in_sec() -> f32 { 0.35 }

pub fn load_config(path: &str) -> Result<LocomotionConfig, ConfigError> {
    let mut config: LocomotionConfig = match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                return Err(ConfigError::Toml(e));
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path, e);
            return Err(ConfigError::Io(e));
        }
    };
    if let Err(e) = config.validate_curves() {
        tracing::error!("Rejecting config file '{}': {}", path, e);
        return Err(e);
    }
    config.sanitize();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coefficient_out_of_range_is_rejected() {
        let mut arm = ArmSwingConfig::default();
        assert_eq!(arm.both_controllers_coefficient(), 1.0);
        let err = arm.set_both_controllers_coefficient(15.0).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "both_controllers_coefficient", .. }));
        assert_eq!(arm.both_controllers_coefficient(), 1.0);

        assert!(arm.set_single_controller_coefficient(-0.1).is_err());
        assert_eq!(arm.single_controller_coefficient(), 0.7);
        assert!(arm.set_single_controller_coefficient(10.0).is_ok());
        assert_eq!(arm.single_controller_coefficient(), 10.0);
    }

    #[test]
    fn test_cache_size_is_clamped() {
        let mut smoothing = SmoothingConfig::default();
        smoothing.set_cache_size(1);
        assert_eq!(smoothing.cache_size(), CACHE_SIZE_MIN);
        smoothing.set_cache_size(500);
        assert_eq!(smoothing.cache_size(), CACHE_SIZE_MAX);
        smoothing.set_cache_size(12);
        assert_eq!(smoothing.cache_size(), 12);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
            [arm_swing]
            mode = "left_button_both_controllers"
            max_speed = 5.0

            [smoothing]
            mode = "lowest"
            cache_size = 200

            [wall_clip]
            mode = "rewind"
        "#;
        let mut config: LocomotionConfig = toml::from_str(toml_str).unwrap();
        config.sanitize();
        assert_eq!(config.arm_swing.mode, ActivationMode::LeftButtonBothControllers);
        assert_eq!(config.arm_swing.max_speed, 5.0);
        assert_eq!(config.arm_swing.single_controller_coefficient(), 0.7);
        assert_eq!(config.smoothing.mode, SmoothingMode::Lowest);
        assert_eq!(config.smoothing.cache_size(), CACHE_SIZE_MAX);
        assert_eq!(config.wall_clip.mode, PreventionMode::Rewind);
        assert_eq!(config.instant_height.fall_mode, PreventionMode::Rewind);
        assert_eq!(config.rewind.num_saved_positions_to_store, 28);
    }

    #[test]
    fn test_sanitize_clamps_angles_and_coefficients() {
        let toml_str = r#"
            [arm_swing]
            both_controllers_coefficient = 42.0

            [climbing]
            max_angle_player_can_climb = 120.0
        "#;
        let mut config: LocomotionConfig = toml::from_str(toml_str).unwrap();
        config.sanitize();
        assert_eq!(config.arm_swing.both_controllers_coefficient(), COEFFICIENT_MAX);
        assert_eq!(config.climbing.max_angle_player_can_climb, ANGLE_MAX);
    }

    #[test]
    fn test_world_scale_applies_only_when_enabled() {
        let mut config = LocomotionConfig::default();
        config.general.rig_scale = 2.0;
        assert_eq!(config.max_speed(), 8.0);
        config.general.scale_world_units_to_rig_scale = true;
        assert_eq!(config.max_speed(), 16.0);
        assert!((config.instant_height_max_change() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_check_fixed_timestep() {
        let mut general = GeneralConfig::default();
        assert_eq!(general.check_fixed_timestep(0.01), 0.01);
        assert_eq!(general.check_fixed_timestep(0.02), MAX_FIXED_TIMESTEP);
        general.auto_adjust_fixed_timestep = false;
        assert_eq!(general.check_fixed_timestep(0.02), 0.02);
    }
}
