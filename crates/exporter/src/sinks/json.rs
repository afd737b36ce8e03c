//! JsonFileSink - writes the whole run to one synced-pose JSON document

use contracts::{AlignError, AlignedFrame, AlignedFrameSink, BracketKind, Quat, Vec3};
use observability::AlignmentStats;
use serde::Serialize;
use std::fs::{self, File};
use std::path::PathBuf;
use tracing::{debug, info, instrument};

use super::RunContext;

/// One frame entry in the output document.
///
/// Position and rotation are omitted (not nulled) for frames without a valid
/// pose, so consumers cannot mistake a placeholder for real motion.
#[derive(Debug, Serialize)]
struct FrameRecord {
    frame_index: u64,
    timestamp: f64,
    classification: BracketKind,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rotation: Option<Quat>,
}

impl FrameRecord {
    fn from_frame(frame: &AlignedFrame) -> Self {
        let (position, rotation) = if frame.pose.valid {
            (Some(frame.pose.position), Some(frame.pose.rotation))
        } else {
            (None, None)
        };
        Self {
            frame_index: frame.frame_index,
            timestamp: frame.timestamp,
            classification: frame.classification,
            valid: frame.pose.valid,
            position,
            rotation,
        }
    }
}

#[derive(Debug, Serialize)]
struct DocumentMetadata {
    video: String,
    nominal_fps: f64,
    calibrated_start: f64,
    gap_threshold: f64,
    session_count: usize,
    total_frames: u64,
    matched: u64,
    in_gap: u64,
    out_of_range: u64,
    processing_date: String,
}

#[derive(Debug, Serialize)]
struct SyncedPoseDocument<'a> {
    metadata: DocumentMetadata,
    frames: &'a [FrameRecord],
}

/// Sink that buffers the run and writes `{"metadata": ..., "frames": [...]}`
/// as one pretty-printed JSON document at close.
///
/// The document shape is the archive format downstream tooling reads; frames
/// are buffered in memory because the metadata block carries run totals that
/// are only known once the last frame has arrived.
pub struct JsonFileSink {
    name: String,
    path: PathBuf,
    context: RunContext,
    stats: AlignmentStats,
    frames: Vec<FrameRecord>,
}

impl JsonFileSink {
    /// Create a sink writing to `path`, creating parent directories.
    pub fn new(path: impl Into<PathBuf>, context: RunContext) -> contracts::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(Self {
            name: "json_file".to_string(),
            path,
            context,
            stats: AlignmentStats::new(),
            frames: Vec::new(),
        })
    }

    fn write_document(&self) -> contracts::Result<()> {
        let summary = self.stats.summary();
        let metadata = DocumentMetadata {
            video: self.context.video_path.display().to_string(),
            nominal_fps: self.context.nominal_fps,
            calibrated_start: self.context.calibrated_start,
            gap_threshold: self.context.gap_threshold,
            session_count: self.context.windows.len(),
            total_frames: summary.total_frames,
            matched: summary.matched,
            in_gap: summary.in_gap,
            out_of_range: summary.out_of_range,
            processing_date: chrono::Utc::now().to_rfc3339(),
        };
        let document = SyncedPoseDocument {
            metadata,
            frames: &self.frames,
        };

        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(file, &document)
            .map_err(|e| AlignError::sink_write(&self.name, e.to_string()))?;

        info!(
            sink = %self.name,
            path = %self.path.display(),
            frames = self.frames.len(),
            "synced pose document written"
        );
        Ok(())
    }
}

impl AlignedFrameSink for JsonFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "json_sink_write",
        skip(self, frame),
        fields(sink = %self.name, frame_index = frame.frame_index)
    )]
    async fn write(&mut self, frame: &AlignedFrame) -> Result<(), AlignError> {
        self.frames.push(FrameRecord::from_frame(frame));
        self.stats.update(frame);
        Ok(())
    }

    #[instrument(name = "json_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), AlignError> {
        // Document totals are only known at close; nothing to flush early.
        Ok(())
    }

    #[instrument(name = "json_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), AlignError> {
        self.write_document()?;
        debug!(sink = %self.name, "JsonFileSink closed");
        Ok(())
    }
}
