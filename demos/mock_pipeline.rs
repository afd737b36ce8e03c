//! Mock Pipeline Demo
//!
//! Runs the full alignment pipeline on synthetic data: a generated hand
//! trajectory with two recording sessions, and a jittery VFR frame timeline
//! from `MockVideoSource`. No video file, ffprobe, or ffmpeg required.
//!
//! Run with: cargo run --bin mock_pipeline
//!
//! Pass a config path as the first argument to reuse its sync and export
//! settings instead of the built-in demo values.

use align_engine::{derive_session_windows, AlignMode, Aligner};
use config_loader::ConfigLoader;
use contracts::{PipelineConfig, PoseSample, PoseSequence, Quat, Vec3, VideoFrameRef};
use exporter::{Dispatcher, JsonFileSink, LogSink, ReportSink, RunContext, SinkHandle};
use ingestion::{FrameTimestampSource, MockVideoSource};
use observability::AlignmentStats;

/// Absolute Unix-epoch time of video frame 0 in the synthetic setup.
const DEMO_START: f64 = 1_766_488_000.0;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    observability::init()?;

    tracing::info!("Starting Mock Pipeline Demo");

    // ==== Stage 1: Use demo config or load from file ====
    let config = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading pipeline config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        demo_config()
    };
    let calibrated_start = config.sync.calibrated_start.unwrap_or(DEMO_START);

    // ==== Stage 2: Synthesize a motion log ====
    let sequence = synthesize_motion(calibrated_start)?;
    let windows = derive_session_windows(&sequence, config.sync.gap_threshold);

    tracing::info!(
        samples = sequence.len(),
        sessions = windows.len(),
        time_range = ?sequence.time_range(),
        "Motion log synthesized"
    );

    // ==== Stage 3: Mock frame timeline (VFR, ~29.4 fps) ====
    let source = MockVideoSource::from_deltas(&jittered_deltas(235));
    let timeline = source.frame_timeline()?;

    tracing::info!(
        frames = timeline.len(),
        nominal_fps = format!("{:.2}", timeline.nominal_fps),
        duration_secs = format!("{:.2}", timeline.duration),
        "Frame timeline generated"
    );

    // ==== Stage 4: Sinks and dispatcher ====
    let context = RunContext {
        video_path: config.video_path.clone(),
        nominal_fps: timeline.nominal_fps,
        calibrated_start,
        gap_threshold: config.sync.gap_threshold,
        windows,
    };

    let json_path = config.output_dir.join("synced_poses.json");
    let report_path = config.output_dir.join("alignment_report.md");

    let handles = vec![
        SinkHandle::spawn(JsonFileSink::new(&json_path, context.clone())?, 64),
        SinkHandle::spawn(ReportSink::new(&report_path, context.clone())?, 64),
        SinkHandle::spawn(LogSink::new(config.export.log_every), 64),
    ];
    let (tx, rx) = Dispatcher::channel(64);
    let dispatcher_handle = Dispatcher::new(handles, rx).spawn();

    // ==== Stage 5: Align every frame ====
    let aligner = Aligner::new(&sequence, config.sync.gap_threshold, AlignMode::Interpolated)?;
    let mut stats = AlignmentStats::new();

    for frame in &timeline.frames {
        let absolute = VideoFrameRef::new(frame.frame_index, calibrated_start + frame.timestamp);
        let aligned = aligner.align_frame(&absolute)?;
        stats.update(&aligned);
        if tx.send(aligned).await.is_err() {
            tracing::warn!("Dispatcher channel closed early");
            break;
        }
    }

    // ==== Stage 6: Flush and report ====
    drop(tx);
    dispatcher_handle.await?;

    tracing::info!(json = %json_path.display(), report = %report_path.display(), "Artifacts written");
    println!("{}", stats.summary());

    Ok(())
}

/// Built-in settings for the synthetic run.
fn demo_config() -> PipelineConfig {
    use contracts::SyncConfig;

    PipelineConfig {
        // Echoed into the document metadata; the mock source never opens it
        video_path: "demo_session.mp4".into(),
        motion_dir: "demo_motion".into(),
        output_dir: "demo_output".into(),
        sync: SyncConfig {
            gap_threshold: contracts::DEFAULT_GAP_THRESHOLD,
            calibrated_start: Some(DEMO_START),
        },
        export: Default::default(),
        metrics_port: 0,
    }
}

/// Two hand-motion sessions with an idle stretch between them:
/// "pick" covers 0-3 s of the video, "place" 5.5-7.5 s.
fn synthesize_motion(start: f64) -> Result<PoseSequence, contracts::AlignError> {
    let mut samples = Vec::new();
    append_session(&mut samples, "pick", start, 90);
    append_session(&mut samples, "place", start + 5.5, 60);
    PoseSequence::new(samples)
}

/// A 30 Hz arc: the hand sweeps sideways while rotating about the wrist.
fn append_session(samples: &mut Vec<PoseSample>, label: &str, start: f64, count: usize) {
    for i in 0..count {
        let t = i as f64 / 30.0;
        let angle = 0.8 * t;
        let position = Vec3::new(0.3 * angle.cos(), 0.3 * angle.sin(), 1.0 - 0.05 * t);
        let rotation = Quat::new(0.0, 0.0, (angle / 2.0).sin(), (angle / 2.0).cos());
        samples.push(PoseSample::new(start + t, position, rotation, label.into()));
    }
}

/// Frame deltas that wobble around 33 ms the way real decode stamps do.
fn jittered_deltas(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| match i % 5 {
            0 => 0.0401,
            1 => 0.0299,
            _ => 0.0334,
        })
        .collect()
}
