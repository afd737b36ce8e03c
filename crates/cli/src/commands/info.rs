//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::AlignError;
use serde::Serialize;
use tracing::info;

use align_engine::derive_session_windows;
use ingestion::{FfprobeSource, MotionLoader};

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    config: ConfigEcho,
    #[serde(skip_serializing_if = "Option::is_none")]
    video: Option<VideoProbe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    motion: Option<MotionScan>,
}

#[derive(Serialize)]
struct ConfigEcho {
    video_path: String,
    motion_dir: String,
    output_dir: String,
    gap_threshold: f64,
    calibrated_start: Option<f64>,
    metrics_port: u16,
}

#[derive(Serialize)]
struct VideoProbe {
    nominal_fps: f64,
    duration: f64,
    frame_count: u64,
    /// File mtime minus duration; a calibration hint for the operator only
    start_hint: Option<f64>,
}

#[derive(Serialize)]
struct MotionScan {
    samples: usize,
    sessions: Vec<String>,
    time_range: Option<(f64, f64)>,
    windows: Vec<WindowInfo>,
}

#[derive(Serialize)]
struct WindowInfo {
    session: String,
    start: f64,
    end: f64,
    duration: f64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(AlignError::config_parse(format!(
            "configuration file not found: {}",
            args.config.display()
        ))
        .into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let video = if args.video {
        let source = FfprobeSource::new(&config.video_path);
        let probe = source.video_info().context("Failed to probe video")?;
        Some(VideoProbe {
            nominal_fps: probe.nominal_fps,
            duration: probe.duration,
            frame_count: probe.frame_count,
            start_hint: probe.start_hint,
        })
    } else {
        None
    };

    let motion = if args.motion {
        let sequence =
            MotionLoader::load_dir(&config.motion_dir).context("Failed to load motion logs")?;
        let windows = derive_session_windows(&sequence, config.sync.gap_threshold);
        Some(MotionScan {
            samples: sequence.len(),
            sessions: sequence
                .session_ids()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            time_range: sequence.time_range(),
            windows: windows
                .iter()
                .map(|w| WindowInfo {
                    session: w.session_id.to_string(),
                    start: w.start,
                    end: w.end,
                    duration: w.duration(),
                })
                .collect(),
        })
    } else {
        None
    };

    let info_doc = ConfigInfo {
        config: ConfigEcho {
            video_path: config.video_path.display().to_string(),
            motion_dir: config.motion_dir.display().to_string(),
            output_dir: config.output_dir.display().to_string(),
            gap_threshold: config.sync.gap_threshold,
            calibrated_start: config.sync.calibrated_start,
            metrics_port: config.metrics_port,
        },
        video,
        motion,
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&info_doc).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info_doc);
    }

    Ok(())
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                   Vidsync Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📋 Pipeline");
    println!("   ├─ Video: {}", info.config.video_path);
    println!("   ├─ Motion dir: {}", info.config.motion_dir);
    println!("   ├─ Output dir: {}", info.config.output_dir);
    println!("   ├─ Gap threshold: {:.3} s", info.config.gap_threshold);
    match info.config.calibrated_start {
        Some(start) => println!("   └─ Calibrated start: {start:.6}"),
        None => println!("   └─ Calibrated start: (unset)"),
    }

    if let Some(ref video) = info.video {
        println!("\n🎬 Video (probed)");
        println!("   ├─ Nominal fps: {:.2}", video.nominal_fps);
        println!("   ├─ Duration: {:.2} s", video.duration);
        println!("   ├─ Frames: {}", video.frame_count);
        match video.start_hint {
            Some(hint) => println!("   └─ Start hint (mtime - duration): {hint:.3}"),
            None => println!("   └─ Start hint: (unavailable)"),
        }
    }

    if let Some(ref motion) = info.motion {
        println!("\n🤚 Motion");
        println!("   ├─ Samples: {}", motion.samples);
        println!("   ├─ Sessions: {:?}", motion.sessions);
        if let Some((start, end)) = motion.time_range {
            println!("   ├─ Time range: {start:.3} .. {end:.3}");
        }
        println!("   └─ Windows ({}):", motion.windows.len());
        for (i, window) in motion.windows.iter().enumerate() {
            let is_last = i == motion.windows.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!(
                "      {} {} [{:.3} .. {:.3}] ({:.3} s)",
                prefix, window.session, window.start, window.end, window.duration
            );
        }
    }

    println!();
}
