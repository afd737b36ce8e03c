//! Clip manifest and ffmpeg stream-copy extraction

use contracts::{AlignError, ClipSpec};
use observability::record_clip_written;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, instrument, warn};

/// Serialize clip specs to a JSON manifest.
///
/// The manifest is the machine-readable record of which video spans belong
/// to which session; the extractor and downstream tooling both read it.
pub fn write_clip_manifest(path: &Path, clips: &[ClipSpec]) -> contracts::Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, clips)
        .map_err(|e| AlignError::clip_write("manifest", e.to_string()))?;

    info!(
        path = %path.display(),
        clips = clips.len(),
        "clip manifest written"
    );
    Ok(())
}

/// Clip bounds mapped into the video's own clock, clamped at zero.
///
/// A clip starting marginally before the calibrated video start (first pose
/// sample slightly precedes frame 0) is trimmed rather than rejected.
pub fn relative_window(clip: &ClipSpec, video_start: f64) -> (f64, f64) {
    let rel_start = (clip.start_timestamp - video_start).max(0.0);
    let rel_end = (clip.end_timestamp - video_start).max(rel_start);
    (rel_start, rel_end)
}

/// Output file path for one clip. Session names come from user-supplied
/// trajectory names, so path separators are squashed.
pub fn clip_output_path(output_dir: &Path, session_id: &str) -> PathBuf {
    let safe: String = session_id
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    output_dir.join(format!("{safe}.mp4"))
}

/// Result of one extraction batch.
///
/// Per-clip failures are collected, not short-circuiting; one unreadable
/// span must not abort the remaining clips.
#[derive(Debug, Default)]
pub struct ClipOutcome {
    pub written: Vec<PathBuf>,
    pub failures: Vec<AlignError>,
}

impl ClipOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Extracts session clips from the source video via ffmpeg stream copy.
///
/// No re-encode: `-c copy` cuts at the nearest keyframe, which is the
/// accepted tradeoff for instant extraction. `start_timestamp` is the
/// calibrated absolute time of video frame 0 and maps clip bounds into
/// the video's clock.
pub struct FfmpegClipWriter {
    video_path: PathBuf,
    output_dir: PathBuf,
    start_timestamp: f64,
}

impl FfmpegClipWriter {
    pub fn new(
        video_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        start_timestamp: f64,
    ) -> Self {
        Self {
            video_path: video_path.into(),
            output_dir: output_dir.into(),
            start_timestamp,
        }
    }

    /// Extract every clip, collecting per-clip failures.
    ///
    /// # Errors
    /// Only the output directory being uncreatable is fatal; ffmpeg
    /// failures land in the returned outcome.
    #[instrument(
        name = "extract_clips",
        skip(self, clips),
        fields(video = %self.video_path.display(), clips = clips.len())
    )]
    pub fn extract_all(&self, clips: &[ClipSpec]) -> contracts::Result<ClipOutcome> {
        fs::create_dir_all(&self.output_dir)?;

        let mut outcome = ClipOutcome::default();
        for clip in clips {
            match self.extract_one(clip) {
                Ok(path) => {
                    record_clip_written(clip.session_id.as_ref(), true);
                    outcome.written.push(path);
                }
                Err(e) => {
                    record_clip_written(clip.session_id.as_ref(), false);
                    warn!(
                        session = %clip.session_id,
                        error = %e,
                        "clip extraction failed, continuing"
                    );
                    outcome.failures.push(e);
                }
            }
        }

        info!(
            written = outcome.written.len(),
            failed = outcome.failures.len(),
            "clip extraction finished"
        );
        Ok(outcome)
    }

    fn extract_one(&self, clip: &ClipSpec) -> contracts::Result<PathBuf> {
        let (rel_start, rel_end) = relative_window(clip, self.start_timestamp);
        let out_path = clip_output_path(&self.output_dir, clip.session_id.as_ref());

        // -ss before -i seeks on the input side, which is what makes stream
        // copy fast; -y overwrites a clip from a previous run.
        let output = Command::new("ffmpeg")
            .args(["-v", "error", "-y", "-ss"])
            .arg(format!("{rel_start:.6}"))
            .arg("-to")
            .arg(format!("{rel_end:.6}"))
            .arg("-i")
            .arg(&self.video_path)
            .args(["-c", "copy"])
            .arg(&out_path)
            .output()
            .map_err(|e| {
                AlignError::clip_write(
                    clip.session_id.as_ref(),
                    format!("failed to run ffmpeg: {e}"),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AlignError::clip_write(
                clip.session_id.as_ref(),
                stderr.trim().to_string(),
            ));
        }

        debug!(
            session = %clip.session_id,
            path = %out_path.display(),
            frames = clip.frame_count,
            rel_start,
            rel_end,
            "clip written"
        );
        Ok(out_path)
    }
}
