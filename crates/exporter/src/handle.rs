//! SinkHandle - owns one sink's queue and worker task

use contracts::{AlignedFrame, AlignedFrameSink};
use observability::record_frame_exported;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::metrics::SinkMetrics;

/// Handle to a sink running on its own worker task.
///
/// Frames travel over a bounded queue; `send` awaits when the queue is full
/// so a slow sink backpressures the alignment loop instead of losing frames.
/// An export document with holes in it is worthless, so there is no lossy
/// send path.
pub struct SinkHandle {
    name: String,
    tx: mpsc::Sender<AlignedFrame>,
    metrics: Arc<SinkMetrics>,
    worker: JoinHandle<()>,
}

impl SinkHandle {
    /// Spawn a worker task around `sink` with a queue of `queue_capacity`.
    pub fn spawn<S>(sink: S, queue_capacity: usize) -> Self
    where
        S: AlignedFrameSink + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(SinkMetrics::new());
        let name = sink.name().to_string();

        let worker = tokio::spawn(sink_worker(sink, rx, Arc::clone(&metrics)));

        Self {
            name,
            tx,
            metrics,
            worker,
        }
    }

    /// Sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared metrics for this sink
    pub fn metrics(&self) -> Arc<SinkMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Queue a frame for this sink, waiting if the queue is full.
    ///
    /// Returns `false` when the worker is gone (its queue closed); the
    /// caller should stop feeding this handle.
    pub async fn send(&self, frame: AlignedFrame) -> bool {
        match self.tx.send(frame).await {
            Ok(()) => true,
            Err(_) => {
                error!(sink = %self.name, "sink worker gone, frame not delivered");
                false
            }
        }
    }

    /// Close the queue and wait for the worker to flush and exit.
    pub async fn shutdown(self) {
        drop(self.tx);

        if let Err(e) = self.worker.await {
            error!(sink = %self.name, error = %e, "sink worker panicked");
        }

        let snapshot = self.metrics.snapshot();
        info!(
            sink = %self.name,
            written = snapshot.write_count,
            failures = snapshot.failure_count,
            "sink shut down"
        );
    }
}

/// Worker loop: drain the queue into the sink, then flush and close.
///
/// A failed write is counted and logged but never stops the loop; one bad
/// frame must not abort the rest of the export.
async fn sink_worker<S>(mut sink: S, mut rx: mpsc::Receiver<AlignedFrame>, metrics: Arc<SinkMetrics>)
where
    S: AlignedFrameSink,
{
    while let Some(frame) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match sink.write(&frame).await {
            Ok(()) => {
                metrics.inc_write_count();
                record_frame_exported(sink.name(), true);
            }
            Err(e) => {
                metrics.inc_failure_count();
                record_frame_exported(sink.name(), false);
                error!(
                    sink = %sink.name(),
                    frame_index = frame.frame_index,
                    error = %e,
                    "sink write failed, continuing"
                );
            }
        }
    }

    metrics.set_queue_len(0);

    if let Err(e) = sink.flush().await {
        error!(sink = %sink.name(), error = %e, "sink flush failed");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %sink.name(), error = %e, "sink close failed");
    }

    debug!(sink = %sink.name(), "sink worker exited");
}
