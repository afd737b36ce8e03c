//! AlignedFrameSink trait - exporter output interface
//!
//! Defines the abstract interface for sinks.

use crate::{AlignError, AlignedFrame};

/// Aligned-frame output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(AlignedFrameSink: Send)]
pub trait LocalAlignedFrameSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one aligned frame
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, frame: &AlignedFrame) -> Result<(), AlignError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), AlignError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), AlignError>;
}
