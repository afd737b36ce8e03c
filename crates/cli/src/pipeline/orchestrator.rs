//! Pipeline orchestrator - coordinates loading, alignment, and export.
//!
//! One run: load the motion logs, pull the video's frame timeline, shift it
//! onto the motion clock with the calibrated start, align frame by frame, and
//! stream the results through the sink dispatcher.

use std::time::Instant;

use align_engine::{derive_session_windows, AlignMode, Aligner};
use anyhow::{Context, Result};
use contracts::{AlignError, PipelineConfig, VideoFrameRef};
use exporter::{Dispatcher, JsonFileSink, LogSink, ReportSink, RunContext, SinkHandle};
use ingestion::{FfprobeSource, FrameTimestampSource, MotionLoader};
use observability::AlignmentStats;
use tracing::{info, warn};

use super::RunStats;

/// Options for one alignment run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Full pipeline configuration (paths, sync parameters, export toggles)
    pub config: PipelineConfig,

    /// Maximum number of frames to align (None = whole timeline)
    pub max_frames: Option<u64>,

    /// Channel buffer size between the alignment loop and the sinks
    pub buffer_size: usize,

    /// How matched brackets become poses
    pub mode: AlignMode,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a new pipeline with the given options
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<RunStats> {
        let start_time = Instant::now();
        let config = &self.options.config;

        // Initialize Metrics (optional)
        if config.metrics_port != 0 {
            observability::init_metrics_only(config.metrics_port)?;
            info!("Metrics endpoint available on port {}", config.metrics_port);
        }

        // The operator-supplied start is what places video frames on the
        // motion log's clock; without it alignment is meaningless.
        let calibrated_start = config.sync.calibrated_start.ok_or_else(|| {
            AlignError::config_validation(
                "sync.calibrated_start",
                "required to place video frames on the motion log's clock",
            )
        })?;

        // Load motion logs
        info!(motion_dir = %config.motion_dir.display(), "Loading motion logs...");
        let sequence =
            MotionLoader::load_dir(&config.motion_dir).context("Failed to load motion logs")?;

        info!(
            samples = sequence.len(),
            sessions = sequence.session_ids().len(),
            time_range = ?sequence.time_range(),
            "Motion logs loaded"
        );

        // Extract frame timeline
        info!(video = %config.video_path.display(), "Extracting frame timeline...");
        let source = FfprobeSource::new(&config.video_path);
        let timeline = source
            .frame_timeline()
            .context("Failed to extract frame timeline")?;

        info!(
            frames = timeline.len(),
            nominal_fps = format!("{:.3}", timeline.nominal_fps),
            duration_secs = format!("{:.3}", timeline.duration),
            "Frame timeline extracted"
        );

        // Validates the sequence up front, before any output file is touched
        let aligner = Aligner::new(&sequence, config.sync.gap_threshold, self.options.mode)
            .context("Failed to build aligner")?;

        // Derive session windows
        let windows = derive_session_windows(&sequence, config.sync.gap_threshold);
        info!(windows = windows.len(), "Session windows derived");

        // Setup sinks and dispatcher
        let context = RunContext {
            video_path: config.video_path.clone(),
            nominal_fps: timeline.nominal_fps,
            calibrated_start,
            gap_threshold: config.sync.gap_threshold,
            windows,
        };

        let handles = self.spawn_sinks(&context)?;
        let active_sinks = handles.len();

        let (frame_tx, frame_rx) = Dispatcher::channel(self.options.buffer_size);
        let dispatcher_handle = Dispatcher::new(handles, frame_rx).spawn();

        info!(active_sinks, "Dispatcher started");

        // Align frames
        info!(
            mode = aligner.mode().as_str(),
            max_frames = ?self.options.max_frames,
            "Aligning frames..."
        );

        let mut stats = AlignmentStats::new();
        let mut frames_processed: u64 = 0;

        for frame in &timeline.frames {
            // Timeline stamps are relative to frame 0; the aligner wants
            // absolute epoch seconds.
            let absolute =
                VideoFrameRef::new(frame.frame_index, calibrated_start + frame.timestamp);
            frames_processed += 1;

            match aligner.align_frame(&absolute) {
                Ok(aligned) => {
                    stats.update(&aligned);
                    if frame_tx.send(aligned).await.is_err() {
                        warn!("Dispatcher channel closed");
                        break;
                    }
                }
                Err(e) => {
                    warn!(frame = frame.frame_index, error = %e, "Frame skipped");
                    stats.record_error();
                }
            }

            if let Some(max) = self.options.max_frames {
                if frames_processed >= max {
                    info!(frames = frames_processed, "Reached max frames limit");
                    break;
                }
            }
        }

        // Closing the channel is what lets the document sinks finalize; the
        // dispatcher is awaited without a timeout so no export is cut short.
        drop(frame_tx);
        info!("Waiting for sinks to flush...");
        if let Err(e) = dispatcher_handle.await {
            warn!(error = %e, "Dispatcher task failed");
        }

        let run_stats = RunStats {
            frames_processed,
            alignment: stats.summary(),
            duration: start_time.elapsed(),
            active_sinks,
        };

        info!(
            duration_secs = run_stats.duration.as_secs_f64(),
            fps = format!("{:.2}", run_stats.fps()),
            "Pipeline shutdown complete"
        );

        Ok(run_stats)
    }

    /// Build sink workers from the export toggles
    fn spawn_sinks(&self, context: &RunContext) -> Result<Vec<SinkHandle>> {
        let config = &self.options.config;
        let mut handles = Vec::new();

        if config.export.write_json {
            let path = config.output_dir.join("synced_poses.json");
            let sink =
                JsonFileSink::new(&path, context.clone()).context("Failed to create JSON sink")?;
            handles.push(SinkHandle::spawn(sink, self.options.buffer_size));
            info!(path = %path.display(), "JSON sink registered");
        }

        if config.export.write_report {
            let path = config.output_dir.join("alignment_report.md");
            let sink =
                ReportSink::new(&path, context.clone()).context("Failed to create report sink")?;
            handles.push(SinkHandle::spawn(sink, self.options.buffer_size));
            info!(path = %path.display(), "Report sink registered");
        }

        // Progress logging always runs, even with file exports disabled
        handles.push(SinkHandle::spawn(
            LogSink::new(config.export.log_every),
            self.options.buffer_size,
        ));

        Ok(handles)
    }
}
