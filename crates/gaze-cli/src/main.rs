use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, thread};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use gaze_calib::GazeMapper;
use gaze_pipeline::{
    CalibrationProfile, MemorySink, PipelineConfig, PipelineCoordinator, RecordedFrame,
    ReplayDetector, ReplaySource,
};

/// Replay a recorded observation stream through the full gaze pipeline
/// and print the session summary as JSON.
#[derive(Debug, Parser)]
#[command(author, version, about = "Gaze session replay")]
struct Args {
    /// Calibration profile JSON (model parameters, RMS, area of interest).
    #[arg(long)]
    profile: PathBuf,

    /// Recorded frames as JSON lines, one `RecordedFrame` per line.
    #[arg(long)]
    observations: PathBuf,

    /// Optional pipeline config JSON. Defaults are used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_frames(path: &Path) -> Result<Vec<RecordedFrame>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading observations from {}", path.display()))?;
    let mut frames = Vec::new();
    for (lineno, line) in data.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let frame: RecordedFrame = serde_json::from_str(line)
            .with_context(|| format!("{}:{}", path.display(), lineno + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

fn try_main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let profile_json = fs::read_to_string(&args.profile)
        .with_context(|| format!("reading profile from {}", args.profile.display()))?;
    let profile = CalibrationProfile::from_json(&profile_json)?;

    let config = match &args.config {
        Some(path) => {
            let data = fs::read_to_string(path)
                .with_context(|| format!("reading config from {}", path.display()))?;
            serde_json::from_str::<PipelineConfig>(&data)?
        }
        None => PipelineConfig::default(),
    };

    info!(
        "profile '{}' (hash {}), rms={:.4}",
        profile.profile_name,
        profile.content_hash(),
        profile.rms_error,
    );
    if profile.exceeds_rms_warn(config.calibration.rms_warn_threshold) {
        warn!(
            "calibration rms {:.4} exceeds warn threshold {:.4}; expect degraded accuracy",
            profile.rms_error, config.calibration.rms_warn_threshold,
        );
    }

    let mapper = GazeMapper::from_params(profile.model.clone())?;
    let frames = load_frames(&args.observations)?;
    info!("replaying {} frames", frames.len());

    let handle = PipelineCoordinator::spawn(
        ReplaySource::new(frames),
        ReplayDetector,
        mapper,
        profile.aoi.clone(),
        MemorySink::new(),
        config,
    )?;
    // Drain so replay throughput is not judged by the drop counter.
    while !handle.is_finished() {
        while handle.try_recv().is_some() {}
        thread::sleep(Duration::from_millis(2));
    }
    while handle.try_recv().is_some() {}
    let outcome = handle.stop()?;

    if outcome.dropped_results > 0 {
        warn!("{} results dropped during replay", outcome.dropped_results);
    }
    println!("{}", serde_json::to_string_pretty(&outcome.summary)?);
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
