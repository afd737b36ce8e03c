//! Run statistics for the end-of-run summary.

use std::time::Duration;

use observability::AlignmentSummary;

/// Statistics from an alignment run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Frames pulled from the timeline, aligned or skipped
    pub frames_processed: u64,

    /// End-of-run alignment outcome totals
    pub alignment: AlignmentSummary,

    /// Total duration of the run
    pub duration: Duration,

    /// Number of sinks that received frames
    pub active_sinks: usize,
}

impl RunStats {
    /// Effective frames per second throughput
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_processed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                       Run Statistics                         ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Frames processed: {}", self.frames_processed);
        println!("   ├─ Effective fps: {:.2}", self.fps());
        println!("   └─ Active sinks: {}", self.active_sinks);

        println!("\n📈 Alignment");
        println!(
            "   ├─ Matched: {} ({:.2}%)",
            self.alignment.matched, self.alignment.matched_rate
        );
        println!(
            "   ├─ In gap: {} ({:.2}%)",
            self.alignment.in_gap, self.alignment.in_gap_rate
        );
        println!(
            "   ├─ Out of range: {} ({:.2}%)",
            self.alignment.out_of_range, self.alignment.out_of_range_rate
        );
        println!("   ├─ Skipped (errors): {}", self.alignment.errors);
        println!("   └─ Frame spacing (ms): {}", self.alignment.frame_delta_ms);

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_zero_duration() {
        let stats = RunStats::default();
        assert_eq!(stats.fps(), 0.0);
    }

    #[test]
    fn test_fps_computed() {
        let stats = RunStats {
            frames_processed: 300,
            duration: Duration::from_secs(10),
            ..Default::default()
        };
        assert_eq!(stats.fps(), 30.0);
    }
}
