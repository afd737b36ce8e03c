//! LogSink - progress lines via tracing

use contracts::{AlignError, AlignedFrame, AlignedFrameSink};
use tracing::{info, instrument};

/// Sink that logs one progress line every N frames.
pub struct LogSink {
    name: String,
    every: u64,
    count: u64,
}

impl LogSink {
    /// Create a sink logging every `every` frames (0 is treated as 1).
    pub fn new(every: u64) -> Self {
        Self {
            name: "log".to_string(),
            every: every.max(1),
            count: 0,
        }
    }

    fn log_progress(&self, frame: &AlignedFrame) {
        info!(
            sink = %self.name,
            frames = self.count,
            frame_index = frame.frame_index,
            timestamp = frame.timestamp,
            classification = frame.classification.as_str(),
            "alignment progress"
        );
    }
}

impl AlignedFrameSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, frame),
        fields(sink = %self.name, frame_index = frame.frame_index)
    )]
    async fn write(&mut self, frame: &AlignedFrame) -> Result<(), AlignError> {
        self.count += 1;
        if self.count.is_multiple_of(self.every) {
            self.log_progress(frame);
        }
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), AlignError> {
        // Nothing buffered for the log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), AlignError> {
        info!(sink = %self.name, frames = self.count, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BracketKind, InterpolatedPose};

    fn make_frame(index: u64) -> AlignedFrame {
        AlignedFrame {
            frame_index: index,
            timestamp: index as f64,
            classification: BracketKind::AfterEnd,
            pose: InterpolatedPose::invalid(index as f64),
        }
    }

    #[tokio::test]
    async fn test_log_sink_counts_frames() {
        let mut sink = LogSink::new(10);
        for i in 0..25 {
            sink.write(&make_frame(i)).await.unwrap();
        }
        sink.flush().await.unwrap();
        sink.close().await.unwrap();
        assert_eq!(sink.count, 25);
    }

    #[tokio::test]
    async fn test_zero_interval_is_clamped() {
        let sink = LogSink::new(0);
        assert_eq!(sink.every, 1);
        assert_eq!(sink.name(), "log");
    }
}
