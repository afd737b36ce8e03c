//! Dispatcher - fans aligned frames out to every registered sink

use contracts::AlignedFrame;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::handle::SinkHandle;

/// Fan-out task between the alignment loop and the sinks.
///
/// Consumes frames from a bounded input channel and forwards each one to
/// every sink handle. Runs until the input channel closes, then shuts the
/// sinks down in registration order so each one flushes and closes.
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    input_rx: mpsc::Receiver<AlignedFrame>,
}

impl Dispatcher {
    /// Create a dispatcher over already-spawned sink handles.
    pub fn new(handles: Vec<SinkHandle>, input_rx: mpsc::Receiver<AlignedFrame>) -> Self {
        Self { handles, input_rx }
    }

    /// Bounded input channel sized for the alignment loop.
    pub fn channel(capacity: usize) -> (mpsc::Sender<AlignedFrame>, mpsc::Receiver<AlignedFrame>) {
        mpsc::channel(capacity)
    }

    /// Number of registered sinks
    pub fn sink_count(&self) -> usize {
        self.handles.len()
    }

    /// Run the dispatch loop until the input channel closes.
    #[instrument(name = "dispatcher_run", skip(self), fields(sinks = self.handles.len()))]
    pub async fn run(mut self) {
        info!(sinks = self.handles.len(), "dispatcher started");

        let mut frame_count: u64 = 0;

        while let Some(frame) = self.input_rx.recv().await {
            frame_count += 1;

            for handle in &self.handles {
                handle.send(frame.clone()).await;
            }

            if frame_count.is_multiple_of(100) {
                debug!(frames = frame_count, "dispatch progress");
            }
        }

        info!(frames = frame_count, "input channel closed, shutting down sinks");
        Self::shutdown_handles(self.handles).await;
    }

    /// Spawn the dispatch loop onto the runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn shutdown_handles(handles: Vec<SinkHandle>) {
        for handle in handles {
            handle.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{AlignError, AlignedFrameSink, BracketKind, InterpolatedPose, Quat, Vec3};
    use std::sync::{Arc, Mutex};

    struct MockSink {
        name: String,
        written: Arc<Mutex<Vec<u64>>>,
        closed: Arc<Mutex<bool>>,
    }

    impl MockSink {
        fn new(name: &str) -> (Self, Arc<Mutex<Vec<u64>>>, Arc<Mutex<bool>>) {
            let written = Arc::new(Mutex::new(Vec::new()));
            let closed = Arc::new(Mutex::new(false));
            let sink = Self {
                name: name.to_string(),
                written: Arc::clone(&written),
                closed: Arc::clone(&closed),
            };
            (sink, written, closed)
        }
    }

    impl AlignedFrameSink for MockSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(&mut self, frame: &AlignedFrame) -> Result<(), AlignError> {
            self.written.lock().unwrap().push(frame.frame_index);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), AlignError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), AlignError> {
            *self.closed.lock().unwrap() = true;
            Ok(())
        }
    }

    fn make_frame(index: u64) -> AlignedFrame {
        let ts = index as f64 * 0.033;
        AlignedFrame {
            frame_index: index,
            timestamp: ts,
            classification: BracketKind::Matched,
            pose: InterpolatedPose {
                timestamp: ts,
                position: Vec3::new(0.1, 0.2, 0.3),
                rotation: Quat::IDENTITY,
                valid: true,
            },
        }
    }

    #[tokio::test]
    async fn test_fan_out_to_all_sinks() {
        let (sink_a, written_a, closed_a) = MockSink::new("a");
        let (sink_b, written_b, closed_b) = MockSink::new("b");
        let handles = vec![SinkHandle::spawn(sink_a, 8), SinkHandle::spawn(sink_b, 8)];

        let (tx, rx) = Dispatcher::channel(8);
        let dispatcher = Dispatcher::new(handles, rx);
        assert_eq!(dispatcher.sink_count(), 2);
        let task = dispatcher.spawn();

        for i in 0..5 {
            tx.send(make_frame(i)).await.unwrap();
        }
        drop(tx);
        task.await.unwrap();

        let expected: Vec<u64> = (0..5).collect();
        assert_eq!(*written_a.lock().unwrap(), expected);
        assert_eq!(*written_b.lock().unwrap(), expected);
        assert!(*closed_a.lock().unwrap());
        assert!(*closed_b.lock().unwrap());
    }

    #[tokio::test]
    async fn test_closing_input_shuts_sinks_down() {
        let (sink, _, closed) = MockSink::new("only");
        let handles = vec![SinkHandle::spawn(sink, 4)];

        let (tx, rx) = Dispatcher::channel(4);
        let task = Dispatcher::new(handles, rx).spawn();

        drop(tx);
        task.await.unwrap();

        assert!(*closed.lock().unwrap());
    }

    #[tokio::test]
    async fn test_no_sinks_drains_input() {
        let (tx, rx) = Dispatcher::channel(4);
        let task = Dispatcher::new(Vec::new(), rx).spawn();

        for i in 0..3 {
            tx.send(make_frame(i)).await.unwrap();
        }
        drop(tx);
        task.await.unwrap();
    }
}
