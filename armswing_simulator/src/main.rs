//! CLI entry point for the locomotion simulator: scripted arm swinging over synthetic terrain,
//! with per-frame CSV output and a JSON run summary.

mod terrain;

use std::collections::BTreeMap;
use std::f32::consts::TAU;
use std::path::{Path, PathBuf};

use armswing_rs::config::{load_config, LocomotionConfig};
use armswing_rs::{
    update, Collaborators, ControllerFrame, ControllerPose, CorrectionOutcome, FrameInput, FrameOutput,
    LocomotionState,
};
use clap::{Parser, Subcommand};
use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use terrain::{FadeKind, RecordingFade, Scenario, SyntheticTerrain};

/// Arm-swing locomotion simulator
#[derive(Parser, Debug)]
#[command(name = "armswing-sim", about = "Scripted arm-swing locomotion over synthetic terrain.")]
struct Cli {
    /// Path to a TOML config file (defaults are used otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Terrain scenario to walk into
    #[arg(long, value_enum, default_value = "flat")]
    scenario: Scenario,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 900)]
    frames: usize,

    /// Fixed timestep in seconds
    #[arg(long, default_value_t = 1.0 / 90.0)]
    dt: f32,

    /// Max random offset added to each controller position, in metres
    #[arg(long, default_value_t = 0.0)]
    jitter: f32,

    /// Seed for the jitter generator
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Output directory for frames.csv and summary.json
    #[arg(short, long, default_value = "./sim_output")]
    output: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available built-in scenarios
    ListScenarios,
    /// Run a single scenario (default)
    Run,
}

/// Swing amplitude of each controller along Z, metres.
const SWING_AMPLITUDE: f32 = 0.25;
/// Swing cycles per second.
const SWING_FREQUENCY: f32 = 1.5;
/// Buttons are released for the last part of the run to show stopping inertia.
const HOLD_FRACTION: f32 = 0.8;
const HEADSET_HEIGHT: f32 = 1.6;

#[derive(Debug, Serialize)]
struct FrameRecord {
    frame: usize,
    time: f32,
    rig_x: f32,
    rig_y: f32,
    rig_z: f32,
    step: f32,
    outcome: CorrectionOutcome,
    reason: armswing_rs::PreventionReason,
    arm_swinging: bool,
    out_of_bounds: bool,
    rewind_in_progress: bool,
    rewind_this_frame: bool,
    wall_clip_this_frame: bool,
    no_ground: bool,
}

impl FrameRecord {
    fn new(frame: usize, time: f32, out: &FrameOutput) -> Self {
        Self {
            frame,
            time,
            rig_x: out.rig_position.x,
            rig_y: out.rig_position.y,
            rig_z: out.rig_position.z,
            step: out.translation.length(),
            outcome: out.outcome,
            reason: out.reason,
            arm_swinging: out.flags.arm_swinging,
            out_of_bounds: out.flags.out_of_bounds,
            rewind_in_progress: out.flags.rewind_in_progress,
            rewind_this_frame: out.flags.rewind_this_frame,
            wall_clip_this_frame: out.flags.wall_clip_this_frame,
            no_ground: out.flags.no_ground,
        }
    }
}

#[derive(Debug, Serialize)]
struct RunSummary {
    scenario: Scenario,
    frames: usize,
    dt: f32,
    final_position: [f32; 3],
    max_z: f32,
    rewinds: usize,
    push_backs: usize,
    wall_clip_frames: usize,
    no_ground_frames: usize,
    fade_outs: usize,
    fade_ins: usize,
    reasons: BTreeMap<String, usize>,
}

/// Controllers swinging in opposite phase, both facing +Z.
fn scripted_controllers(frame: usize, dt: f32, hold_until: usize, jitter: f32, rng: &mut StdRng) -> ControllerFrame {
    let phase = TAU * SWING_FREQUENCY * frame as f32 * dt;
    let offset = SWING_AMPLITUDE * phase.sin();
    let held = frame < hold_until;
    let mut noise = || if jitter > 0.0 { rng.random_range(-jitter..=jitter) } else { 0.0 };
    let left = ControllerPose {
        position: Vec3::new(-0.2 + noise(), 1.0 + noise(), offset + noise()),
        rotation: Quat::IDENTITY,
        button_pressed: held,
    };
    let right = ControllerPose {
        position: Vec3::new(0.2 + noise(), 1.0 + noise(), -offset + noise()),
        rotation: Quat::IDENTITY,
        button_pressed: held,
    };
    ControllerFrame { left, right }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => load_config(&path.to_string_lossy())?,
        None => LocomotionConfig::default(),
    };
    let dt = config.general.check_fixed_timestep(cli.dt);
    std::fs::create_dir_all(&cli.output)?;

    tracing::info!(
        "Running scenario '{}' for {} frames at dt={:.4}s",
        cli.scenario.name(),
        cli.frames,
        dt
    );

    let terrain = SyntheticTerrain::new(cli.scenario);
    let mut fade = RecordingFade::default();
    let mut rng = StdRng::seed_from_u64(cli.seed);
    let mut state = LocomotionState::new(&config, Vec3::ZERO);
    let hold_until = (cli.frames as f32 * HOLD_FRACTION) as usize;

    let mut writer = csv::Writer::from_path(cli.output.join("frames.csv"))?;
    let mut summary = RunSummary {
        scenario: cli.scenario,
        frames: cli.frames,
        dt,
        final_position: [0.0; 3],
        max_z: 0.0,
        rewinds: 0,
        push_backs: 0,
        wall_clip_frames: 0,
        no_ground_frames: 0,
        fade_outs: 0,
        fade_ins: 0,
        reasons: BTreeMap::new(),
    };

    for frame in 0..cli.frames {
        fade.frame = frame;
        let input = FrameInput {
            dt,
            headset_local_position: Vec3::new(0.0, HEADSET_HEIGHT, 0.0),
            controllers: scripted_controllers(frame, dt, hold_until, cli.jitter, &mut rng),
        };
        let mut collab = Collaborators::new(&terrain, &terrain, &mut fade);
        let out = update(&mut state, &config, &input, &mut collab);

        match out.outcome {
            CorrectionOutcome::RewindApplied => summary.rewinds += 1,
            CorrectionOutcome::PushBackApplied => summary.push_backs += 1,
            CorrectionOutcome::NoCorrection => {}
        }
        if out.outcome != CorrectionOutcome::NoCorrection {
            tracing::info!("frame {}: {:?} ({:?})", frame, out.outcome, out.reason);
            *summary.reasons.entry(format!("{:?}", out.reason)).or_default() += 1;
        }
        summary.wall_clip_frames += usize::from(out.flags.wall_clip_this_frame);
        summary.no_ground_frames += usize::from(out.flags.no_ground);
        summary.max_z = summary.max_z.max(out.rig_position.z);

        writer.serialize(FrameRecord::new(frame, frame as f32 * dt, &out))?;
    }
    writer.flush()?;

    summary.final_position = state.rig_position().to_array();
    summary.fade_outs = fade.count(FadeKind::Out);
    summary.fade_ins = fade.count(FadeKind::In);
    write_summary(&cli.output.join("summary.json"), &summary)?;

    tracing::info!(
        "Done: final position {:?}, {} rewinds, {} push-backs",
        summary.final_position,
        summary.rewinds,
        summary.push_backs
    );
    Ok(())
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let level = cli.log_level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    match &cli.command {
        Some(Commands::ListScenarios) => {
            println!("Available scenarios:");
            for scenario in Scenario::ALL {
                println!("  {:<6} {}", scenario.name(), scenario.description());
            }
        }
        Some(Commands::Run) | None => {
            if let Err(e) = run(&cli) {
                tracing::error!("Simulation failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn cli(scenario: &str, output: &Path) -> Cli {
        Cli::parse_from([
            "armswing-sim",
            "--scenario",
            scenario,
            "--frames",
            "900",
            "--output",
            &output.to_string_lossy(),
        ])
    }

    fn read_summary(dir: &Path) -> serde_json::Value {
        let contents = std::fs::read_to_string(dir.join("summary.json")).unwrap();
        serde_json::from_str(&contents).unwrap()
    }

    #[test]
    fn test_flat_run_writes_frames_and_summary() {
        let dir = tempdir().unwrap();
        run(&cli("flat", dir.path())).unwrap();

        let frames = std::fs::read_to_string(dir.path().join("frames.csv")).unwrap();
        let mut lines = frames.lines();
        assert!(lines.next().unwrap().starts_with("frame,time,rig_x"));
        assert_eq!(lines.count(), 900);

        let summary = read_summary(dir.path());
        assert_eq!(summary["scenario"], "flat");
        assert_eq!(summary["frames"], 900);
        assert_eq!(summary["rewinds"], 0);
        assert_eq!(summary["push_backs"], 0);
        assert!(summary["max_z"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_wall_run_records_corrections() {
        let dir = tempdir().unwrap();
        run(&cli("wall", dir.path())).unwrap();

        let summary = read_summary(dir.path());
        assert!(summary["wall_clip_frames"].as_u64().unwrap() > 0);
        assert!(summary["max_z"].as_f64().unwrap() < f64::from(terrain::FEATURE_Z));
    }

    #[test]
    fn test_missing_config_file_fails_run() {
        let dir = tempdir().unwrap();
        let mut cli = cli("flat", dir.path());
        cli.config = Some(dir.path().join("missing.toml"));
        assert!(run(&cli).is_err());
        assert!(!dir.path().join("summary.json").exists());
    }
}
