//! Pose-log loading.
//!
//! Wire format, one JSON document per recording session:
//!
//! ```json
//! {
//!   "trajectories": [
//!     {
//!       "name": "take_01",
//!       "timestamps": [1766488163.738, 1766488163.755, ...],
//!       "poses": [[px, py, pz, qx, qy, qz, qw], ...]
//!     }
//!   ]
//! }
//! ```
//!
//! The session label is the trajectory name when present, the file stem
//! otherwise. Rows may carry trailing channels past the seven pose values
//! (some rigs append a gripper state); those are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use contracts::{AlignError, PoseSample, PoseSequence, Quat, Result, SessionId, Vec3};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Deserialize)]
struct MotionLogFile {
    #[serde(default)]
    trajectories: Vec<TrajectoryRecord>,
}

#[derive(Debug, Deserialize)]
struct TrajectoryRecord {
    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    timestamps: Vec<f64>,

    #[serde(default)]
    poses: Vec<Vec<f64>>,
}

/// Pose-log reader; associated functions only, no state.
pub struct MotionLoader;

impl MotionLoader {
    /// Load a pose log from a file or a directory of files.
    pub fn load(path: &Path) -> Result<PoseSequence> {
        if path.is_dir() {
            Self::load_dir(path)
        } else {
            let samples = Self::load_file(path)?;
            Self::into_sequence(samples)
        }
    }

    /// Load every motion log in a directory into one sorted sequence.
    ///
    /// Skips `*metadata.json` and `*validation.json` sidecars. Unreadable or
    /// malformed files are logged and skipped; an empty merged result is an
    /// error because the pipeline cannot align against nothing.
    #[instrument(level = "info", name = "load_motion_dir", skip_all, fields(dir = %dir.display()))]
    pub fn load_dir(dir: &Path) -> Result<PoseSequence> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| {
                AlignError::motion_parse(dir.display().to_string(), format!("read dir: {e}"))
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_motion_log(path))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(AlignError::motion_parse(
                dir.display().to_string(),
                "no motion log files found",
            ));
        }

        let mut samples = Vec::new();
        for path in &files {
            match Self::load_file(path) {
                Ok(mut loaded) => samples.append(&mut loaded),
                Err(e) => {
                    error!(path = %path.display(), error = %e, "skipping motion log");
                }
            }
        }

        if samples.is_empty() {
            return Err(AlignError::motion_parse(
                dir.display().to_string(),
                "no usable pose samples in directory",
            ));
        }

        info!(files = files.len(), samples = samples.len(), "motion directory loaded");
        Self::into_sequence(samples)
    }

    /// Parse one pose-log file into samples, in file order.
    ///
    /// A timestamp/pose count mismatch truncates to the shorter side with a
    /// warning; a pose row with fewer than seven values is malformed and
    /// fails the whole file.
    pub fn load_file(path: &Path) -> Result<Vec<PoseSample>> {
        // Named `display_path` rather than `display`: a local called `display`
        // is shadowed inside tracing's macros by their internal
        // `use tracing::field::display` import.
        let display_path = path.display().to_string();
        let text = fs::read_to_string(path)
            .map_err(|e| AlignError::motion_parse(&display_path, format!("read: {e}")))?;
        let log: MotionLogFile = serde_json::from_str(&text)
            .map_err(|e| AlignError::motion_parse(&display_path, e.to_string()))?;

        if log.trajectories.is_empty() {
            warn!(path = %display_path, "no trajectories in motion log");
            return Ok(Vec::new());
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("motion");

        let mut samples = Vec::new();
        for trajectory in &log.trajectories {
            let session_id: SessionId = match trajectory.name.as_deref() {
                Some(name) if !name.is_empty() => name.into(),
                _ => stem.into(),
            };

            let count = trajectory.timestamps.len().min(trajectory.poses.len());
            if trajectory.timestamps.len() != trajectory.poses.len() {
                warn!(
                    path = %display_path,
                    session = %session_id,
                    timestamps = trajectory.timestamps.len(),
                    poses = trajectory.poses.len(),
                    "timestamp/pose count mismatch, truncating"
                );
            }

            for i in 0..count {
                let ts = trajectory.timestamps[i];
                if !ts.is_finite() {
                    return Err(AlignError::motion_parse(
                        &display_path,
                        format!("non-finite timestamp at index {i}"),
                    ));
                }
                let row = &trajectory.poses[i];
                if row.len() < 7 {
                    return Err(AlignError::motion_parse(
                        &display_path,
                        format!("pose row {i} has {} values, expected 7", row.len()),
                    ));
                }
                samples.push(PoseSample::new(
                    ts,
                    Vec3::new(row[0], row[1], row[2]),
                    Quat::new(row[3], row[4], row[5], row[6]),
                    session_id.clone(),
                ));
            }
        }

        metrics::counter!("motion_files_loaded_total").increment(1);
        metrics::counter!("motion_samples_loaded_total").increment(samples.len() as u64);
        info!(path = %display_path, samples = samples.len(), "motion log loaded");
        Ok(samples)
    }

    /// Sort merged samples and seal them into a sequence.
    ///
    /// Duplicate timestamps inside one session survive the sort and are only
    /// warned about here; queries landing on them come back as degenerate
    /// brackets from the matcher.
    fn into_sequence(mut samples: Vec<PoseSample>) -> Result<PoseSequence> {
        samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        let duplicates = samples
            .windows(2)
            .filter(|pair| {
                pair[0].timestamp == pair[1].timestamp && pair[0].session_id == pair[1].session_id
            })
            .count();
        if duplicates > 0 {
            warn!(duplicates, "duplicate timestamps within a session");
        }

        PoseSequence::new(samples)
    }
}

fn is_motion_log(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.is_file()
        && name.ends_with(".json")
        && !name.ends_with("metadata.json")
        && !name.ends_with("validation.json")
}
