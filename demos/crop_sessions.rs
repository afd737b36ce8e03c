//! Session Cropping Demo
//!
//! Derives session windows from a synthetic motion log, maps them onto a
//! mock frame timeline, and writes the clip manifest. Cutting actual video
//! files goes through `vidsync crop --extract` against a real recording.
//!
//! Run with: cargo run --bin crop_sessions

use std::fs;
use std::path::Path;

use align_engine::{derive_session_windows, VideoCropper};
use contracts::{PoseSample, PoseSequence, Quat, Vec3};
use exporter::clips::relative_window;
use exporter::write_clip_manifest;
use ingestion::{FrameTimestampSource, MockVideoSource};

/// Absolute Unix-epoch time of video frame 0 in the synthetic setup.
const DEMO_START: f64 = 1_766_488_000.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Session Cropping Demo");

    // ==== Stage 1: Synthesize motion with a repeated session label ====
    // Two "grasp" attempts and one "release"; the window derivation gives
    // the second grasp a -2 suffix so clip files stay distinguishable.
    let mut samples = Vec::new();
    append_session(&mut samples, "grasp", DEMO_START, 60);
    append_session(&mut samples, "grasp", DEMO_START + 4.0, 60);
    append_session(&mut samples, "release", DEMO_START + 8.0, 30);
    let sequence = PoseSequence::new(samples)?;

    let windows = derive_session_windows(&sequence, contracts::DEFAULT_GAP_THRESHOLD);
    for window in &windows {
        tracing::info!(
            session = %window.session_id,
            start = format!("{:.3}", window.start),
            end = format!("{:.3}", window.end),
            duration_secs = format!("{:.3}", window.duration()),
            "Session window"
        );
    }

    // ==== Stage 2: Mock frame timeline (30 fps, 10 s) ====
    let source = MockVideoSource::constant_rate(30.0, 300);
    let timeline = source.frame_timeline()?;

    // ==== Stage 3: Crop the timeline against the windows ====
    let outcome = VideoCropper::new(DEMO_START).crop(&timeline, &windows)?;
    for failure in &outcome.failures {
        tracing::warn!(error = %failure, "Window matched no frames");
    }

    println!("\nClips:");
    for clip in &outcome.clips {
        let (rel_start, rel_end) = relative_window(clip, DEMO_START);
        println!(
            "  {} - frames {}..{} ({} frames, {:.3}s .. {:.3}s in the video)",
            clip.session_id,
            clip.start_frame,
            clip.end_frame,
            clip.frame_count,
            rel_start,
            rel_end,
        );
    }

    // ==== Stage 4: Write the manifest ====
    let output_dir = Path::new("demo_output");
    fs::create_dir_all(output_dir)?;
    let manifest_path = output_dir.join("clips.json");
    write_clip_manifest(&manifest_path, &outcome.clips)?;

    println!("\nManifest: {}", manifest_path.display());
    Ok(())
}

/// A 30 Hz session at a fixed grip height.
fn append_session(samples: &mut Vec<PoseSample>, label: &str, start: f64, count: usize) {
    for i in 0..count {
        let t = i as f64 / 30.0;
        let position = Vec3::new(0.1 * t, 0.0, 0.9);
        samples.push(PoseSample::new(start + t, position, Quat::IDENTITY, label.into()));
    }
}
