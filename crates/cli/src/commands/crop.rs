//! `crop` command implementation.

use anyhow::{Context, Result};
use contracts::AlignError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use align_engine::{derive_session_windows, CropOutcome, VideoCropper};
use exporter::{write_clip_manifest, FfmpegClipWriter};
use ingestion::{FfprobeSource, FrameTimestampSource, MotionLoader};

use crate::cli::CropArgs;

/// Execute the `crop` command
pub fn run_crop(args: &CropArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(AlignError::config_parse(format!(
            "configuration file not found: {}",
            args.config.display()
        ))
        .into());
    }

    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if let Some(ref output_dir) = args.output_dir {
        config.output_dir = output_dir.clone();
    }

    let calibrated_start = config.sync.calibrated_start.ok_or_else(|| {
        AlignError::config_validation(
            "sync.calibrated_start",
            "required to map session windows onto the video",
        )
    })?;

    // Motion logs -> session windows
    let sequence =
        MotionLoader::load_dir(&config.motion_dir).context("Failed to load motion logs")?;
    let windows = derive_session_windows(&sequence, config.sync.gap_threshold);
    info!(
        samples = sequence.len(),
        windows = windows.len(),
        "Session windows derived"
    );

    // Video timeline
    let source = FfprobeSource::new(&config.video_path);
    let timeline = source
        .frame_timeline()
        .context("Failed to probe video timeline")?;
    info!(
        frames = timeline.len(),
        nominal_fps = timeline.nominal_fps,
        "Video timeline probed"
    );

    // Map windows onto frames
    let cropper = VideoCropper::new(calibrated_start);
    let outcome = cropper
        .crop(&timeline, &windows)
        .context("Crop pass failed")?;

    for failure in &outcome.failures {
        warn!(error = %failure, "Session window produced no clip");
    }

    // Manifest lands next to the video
    let manifest = manifest_path(&config.video_path);
    write_clip_manifest(&manifest, &outcome.clips).context("Failed to write clip manifest")?;

    print_clip_summary(&outcome, &manifest);

    if args.extract {
        let clip_dir = config.output_dir.join("clips");
        info!(dir = %clip_dir.display(), "Extracting clips with ffmpeg");

        let writer = FfmpegClipWriter::new(&config.video_path, &clip_dir, calibrated_start);
        let extraction = writer
            .extract_all(&outcome.clips)
            .context("Clip extraction failed")?;

        println!(
            "Extracted {} clip(s) to {}",
            extraction.written.len(),
            clip_dir.display()
        );
        if !extraction.is_clean() {
            println!(
                "{} clip(s) failed to extract - see log for details",
                extraction.failures.len()
            );
        }
    }

    Ok(())
}

fn manifest_path(video_path: &Path) -> PathBuf {
    let stem = video_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("video");
    video_path.with_file_name(format!("{stem}_clips.json"))
}

fn print_clip_summary(outcome: &CropOutcome, manifest: &Path) {
    println!("\n=== Clip Summary ===\n");
    for clip in &outcome.clips {
        println!(
            "  {} - frames {}..{} ({} frames, {:.3} .. {:.3})",
            clip.session_id,
            clip.start_frame,
            clip.end_frame,
            clip.frame_count,
            clip.start_timestamp,
            clip.end_timestamp
        );
    }
    if !outcome.failures.is_empty() {
        println!("\n  {} window(s) matched no frames", outcome.failures.len());
    }
    println!("\nManifest: {}", manifest.display());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_lands_next_to_video() {
        let path = manifest_path(Path::new("/captures/session.mp4"));
        assert_eq!(path, PathBuf::from("/captures/session_clips.json"));
    }

    #[test]
    fn test_manifest_path_without_extension() {
        let path = manifest_path(Path::new("/captures/session"));
        assert_eq!(path, PathBuf::from("/captures/session_clips.json"));
    }
}
