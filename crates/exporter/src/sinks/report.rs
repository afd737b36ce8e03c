//! ReportSink - aggregates the run into a Markdown report at close

use contracts::{AlignError, AlignedFrame, AlignedFrameSink, BracketKind};
use observability::AlignmentStats;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

use super::RunContext;

/// Sink that accumulates run statistics and writes a human-readable
/// Markdown report when closed.
///
/// Holds only counters, not frames; the per-session column counts matched
/// frames by window containment.
pub struct ReportSink {
    name: String,
    path: PathBuf,
    context: RunContext,
    stats: AlignmentStats,
    window_frames: Vec<u64>,
}

impl ReportSink {
    /// Create a sink writing its report to `path`, creating parent directories.
    pub fn new(path: impl Into<PathBuf>, context: RunContext) -> contracts::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let window_frames = vec![0; context.windows.len()];
        Ok(Self {
            name: "report".to_string(),
            path,
            context,
            stats: AlignmentStats::new(),
            window_frames,
        })
    }

    fn render(&self) -> Result<String, std::fmt::Error> {
        use std::fmt::Write;

        let summary = self.stats.summary();
        let mut out = String::new();

        writeln!(out, "# Alignment Run Report")?;
        writeln!(out)?;
        writeln!(out, "Generated: {}", chrono::Utc::now().to_rfc3339())?;
        writeln!(out)?;

        writeln!(out, "## Configuration")?;
        writeln!(out)?;
        writeln!(out, "| Setting | Value |")?;
        writeln!(out, "|---|---|")?;
        writeln!(out, "| Video | `{}` |", self.context.video_path.display())?;
        writeln!(out, "| Nominal fps | {:.2} |", self.context.nominal_fps)?;
        writeln!(
            out,
            "| Calibrated start | {:.6} |",
            self.context.calibrated_start
        )?;
        writeln!(
            out,
            "| Gap threshold | {:.3} s |",
            self.context.gap_threshold
        )?;
        writeln!(out)?;

        writeln!(out, "## Totals")?;
        writeln!(out)?;
        writeln!(out, "| Outcome | Frames | Share |")?;
        writeln!(out, "|---|---|---|")?;
        writeln!(
            out,
            "| Matched | {} | {:.2}% |",
            summary.matched, summary.matched_rate
        )?;
        writeln!(
            out,
            "| In gap | {} | {:.2}% |",
            summary.in_gap, summary.in_gap_rate
        )?;
        writeln!(
            out,
            "| Out of range | {} | {:.2}% |",
            summary.out_of_range, summary.out_of_range_rate
        )?;
        writeln!(out, "| Total | {} | 100.00% |", summary.total_frames)?;
        writeln!(out)?;
        writeln!(out, "Frame spacing (ms): {}", summary.frame_delta_ms)?;
        writeln!(out)?;

        writeln!(out, "## Sessions")?;
        writeln!(out)?;
        writeln!(out, "| Session | Start | End | Duration (s) | Matched frames |")?;
        writeln!(out, "|---|---|---|---|---|")?;
        for (window, frames) in self.context.windows.iter().zip(&self.window_frames) {
            writeln!(
                out,
                "| {} | {:.3} | {:.3} | {:.3} | {} |",
                window.session_id,
                window.start,
                window.end,
                window.duration(),
                frames
            )?;
        }

        Ok(out)
    }
}

impl AlignedFrameSink for ReportSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "report_sink_write",
        skip(self, frame),
        fields(sink = %self.name, frame_index = frame.frame_index)
    )]
    async fn write(&mut self, frame: &AlignedFrame) -> Result<(), AlignError> {
        self.stats.update(frame);

        if frame.classification == BracketKind::Matched {
            let hit = self
                .context
                .windows
                .iter()
                .position(|w| w.contains(frame.timestamp));
            if let Some(i) = hit {
                self.window_frames[i] += 1;
            }
        }
        Ok(())
    }

    #[instrument(name = "report_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), AlignError> {
        Ok(())
    }

    #[instrument(name = "report_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), AlignError> {
        let body = self
            .render()
            .map_err(|e| AlignError::sink_write(&self.name, e.to_string()))?;
        fs::write(&self.path, body)?;

        info!(
            sink = %self.name,
            path = %self.path.display(),
            frames = self.stats.total_frames,
            "run report written"
        );
        debug!(sink = %self.name, "ReportSink closed");
        Ok(())
    }
}
