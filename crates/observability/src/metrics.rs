//! Run statistics for the alignment pipeline.
//!
//! Aggregates per-frame alignment outcomes in memory for the end-of-run
//! summary, alongside a couple of helpers that record export-side events to
//! the global metrics recorder.

use contracts::{AlignedFrame, BracketKind};
use metrics::counter;

/// Record one frame handed to an export sink.
pub fn record_frame_exported(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "export_frames_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record one clip extraction attempt.
pub fn record_clip_written(session_id: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "export_clips_total",
        "session" => session_id.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Per-run alignment statistics.
///
/// Updated once per aligned frame; frame deltas feed a running Welford
/// accumulator so VFR irregularity shows up in the summary without holding
/// the whole timeline in memory.
#[derive(Debug, Clone, Default)]
pub struct AlignmentStats {
    /// Frames seen
    pub total_frames: u64,

    /// Frames matched inside a session run
    pub matched: u64,

    /// Frames before the first pose sample
    pub before_start: u64,

    /// Frames after the last pose sample
    pub after_end: u64,

    /// Frames inside an inter-session gap
    pub in_gap: u64,

    /// Frames the matcher refused (degenerate brackets)
    pub errors: u64,

    /// Inter-frame spacing statistics (milliseconds)
    pub frame_delta_ms: RunningStats,

    last_timestamp: Option<f64>,
}

impl AlignmentStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one aligned frame into the running totals.
    pub fn update(&mut self, frame: &AlignedFrame) {
        self.total_frames += 1;
        match frame.classification {
            BracketKind::Matched => self.matched += 1,
            BracketKind::BeforeStart => self.before_start += 1,
            BracketKind::AfterEnd => self.after_end += 1,
            BracketKind::InGap => self.in_gap += 1,
        }

        if let Some(prev) = self.last_timestamp {
            self.frame_delta_ms.push((frame.timestamp - prev) * 1000.0);
        }
        self.last_timestamp = Some(frame.timestamp);
    }

    /// Count a frame the matcher errored on (it reaches no sink).
    pub fn record_error(&mut self) {
        self.total_frames += 1;
        self.errors += 1;
    }

    /// Frames outside the pose log's time range entirely.
    pub fn out_of_range(&self) -> u64 {
        self.before_start + self.after_end
    }

    /// Snapshot the totals as a printable summary.
    pub fn summary(&self) -> AlignmentSummary {
        let rate = |part: u64| {
            if self.total_frames > 0 {
                part as f64 / self.total_frames as f64 * 100.0
            } else {
                0.0
            }
        };
        AlignmentSummary {
            total_frames: self.total_frames,
            matched: self.matched,
            in_gap: self.in_gap,
            out_of_range: self.out_of_range(),
            errors: self.errors,
            matched_rate: rate(self.matched),
            in_gap_rate: rate(self.in_gap),
            out_of_range_rate: rate(self.out_of_range()),
            frame_delta_ms: StatsSummary::from(&self.frame_delta_ms),
        }
    }

    /// Reset all totals.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Printable end-of-run summary.
#[derive(Debug, Clone, Default)]
pub struct AlignmentSummary {
    pub total_frames: u64,
    pub matched: u64,
    pub in_gap: u64,
    pub out_of_range: u64,
    pub errors: u64,
    pub matched_rate: f64,
    pub in_gap_rate: f64,
    pub out_of_range_rate: f64,
    pub frame_delta_ms: StatsSummary,
}

impl std::fmt::Display for AlignmentSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Alignment Summary ===")?;
        writeln!(f, "Total frames: {}", self.total_frames)?;
        writeln!(f, "Matched: {} ({:.2}%)", self.matched, self.matched_rate)?;
        writeln!(f, "In gap: {} ({:.2}%)", self.in_gap, self.in_gap_rate)?;
        writeln!(
            f,
            "Out of range: {} ({:.2}%)",
            self.out_of_range, self.out_of_range_rate
        )?;
        writeln!(f, "Errors: {}", self.errors)?;
        writeln!(f, "Frame spacing (ms): {}", self.frame_delta_ms)?;
        Ok(())
    }
}

/// Statistics snapshot
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics accumulator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::InterpolatedPose;

    fn frame(index: u64, ts: f64, kind: BracketKind) -> AlignedFrame {
        AlignedFrame {
            frame_index: index,
            timestamp: ts,
            classification: kind,
            pose: InterpolatedPose::invalid(ts),
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_stats_update_counts_classifications() {
        let mut stats = AlignmentStats::new();
        stats.update(&frame(0, 10.00, BracketKind::BeforeStart));
        stats.update(&frame(1, 10.03, BracketKind::Matched));
        stats.update(&frame(2, 10.10, BracketKind::Matched));
        stats.update(&frame(3, 10.13, BracketKind::InGap));
        stats.update(&frame(4, 10.20, BracketKind::AfterEnd));
        stats.record_error();

        assert_eq!(stats.total_frames, 6);
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.in_gap, 1);
        assert_eq!(stats.out_of_range(), 2);
        assert_eq!(stats.errors, 1);

        // Four deltas from five timestamped frames
        assert_eq!(stats.frame_delta_ms.count(), 4);
        assert!((stats.frame_delta_ms.max() - 70.0).abs() < 1e-6);
    }

    #[test]
    fn test_summary_display() {
        let mut stats = AlignmentStats::new();
        stats.update(&frame(0, 1.00, BracketKind::Matched));
        stats.update(&frame(1, 1.05, BracketKind::Matched));
        stats.update(&frame(2, 1.10, BracketKind::InGap));
        stats.update(&frame(3, 1.15, BracketKind::BeforeStart));

        let output = format!("{}", stats.summary());
        assert!(output.contains("Total frames: 4"));
        assert!(output.contains("Matched: 2 (50.00%)"));
        assert!(output.contains("In gap: 1 (25.00%)"));
        assert!(output.contains("Out of range: 1 (25.00%)"));
    }

    #[test]
    fn test_empty_summary_has_zero_rates() {
        let summary = AlignmentStats::new().summary();
        assert_eq!(summary.total_frames, 0);
        assert_eq!(summary.matched_rate, 0.0);
        assert_eq!(format!("{}", summary.frame_delta_ms), "N/A");
    }
}
