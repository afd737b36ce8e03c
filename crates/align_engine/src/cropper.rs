//! Frame-accurate session cropping.
//!
//! Maps absolute session windows onto a video's decoded frame timeline and
//! emits [`ClipSpec`]s with exact frame boundaries. Timeline timestamps are
//! relative to stream start; the cropper carries the calibrated absolute
//! start and does the domain shift itself, so callers never mix the clocks.

use contracts::{AlignError, ClipSpec, FrameTimeline, SessionWindow};
use tracing::{debug, instrument, warn};

/// Result of one crop pass.
///
/// Windows that match no frame are collected as failures instead of aborting
/// the pass; one mis-calibrated session must not sink the rest of the export.
#[derive(Debug, Default)]
pub struct CropOutcome {
    pub clips: Vec<ClipSpec>,
    pub failures: Vec<AlignError>,
}

impl CropOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Selects the frame ranges covered by session windows.
///
/// Pure with respect to its inputs: cropping the same timeline with the same
/// windows yields identical clips, and clips never overlap-extend past their
/// window bounds, so repeated runs are safe.
#[derive(Debug, Clone, Copy)]
pub struct VideoCropper {
    /// Absolute Unix-epoch time of the video's stream start
    start_timestamp: f64,
}

impl VideoCropper {
    pub fn new(start_timestamp: f64) -> Self {
        Self { start_timestamp }
    }

    /// Crop one timeline against a set of session windows.
    ///
    /// An empty or unsorted timeline fails the whole call; a window with no
    /// frames only adds a `NoFramesInWindow` failure to the outcome. Window
    /// bounds are inclusive on both ends: a frame exactly on a bound is in.
    #[instrument(
        level = "debug",
        name = "crop_video",
        skip_all,
        fields(frames = timeline.len(), windows = windows.len())
    )]
    pub fn crop(
        &self,
        timeline: &FrameTimeline,
        windows: &[SessionWindow],
    ) -> Result<CropOutcome, AlignError> {
        if timeline.is_empty() {
            return Err(AlignError::invalid_input("frame timeline is empty"));
        }
        let frames = &timeline.frames;
        if !frames
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
        {
            return Err(AlignError::invalid_input(
                "frame timeline timestamps are not ascending",
            ));
        }

        let mut outcome = CropOutcome::default();

        for window in windows {
            let rel_start = window.start - self.start_timestamp;
            let rel_end = window.end - self.start_timestamp;

            let first = frames.partition_point(|f| f.timestamp < rel_start);
            let end = frames.partition_point(|f| f.timestamp <= rel_end);

            if first >= end {
                warn!(
                    session = %window.session_id,
                    start = window.start,
                    end = window.end,
                    "session window matched no frames"
                );
                metrics::counter!("crop_windows_total", "outcome" => "empty").increment(1);
                outcome.failures.push(AlignError::no_frames_in_window(
                    window.session_id.clone(),
                    window.start,
                    window.end,
                ));
                continue;
            }

            let first_frame = &frames[first];
            let last_frame = &frames[end - 1];
            let clip = ClipSpec {
                session_id: window.session_id.clone(),
                start_frame: first_frame.frame_index,
                end_frame: last_frame.frame_index,
                start_timestamp: self.start_timestamp + first_frame.timestamp,
                end_timestamp: self.start_timestamp + last_frame.timestamp,
                frame_count: (end - first) as u64,
            };
            debug!(
                session = %clip.session_id,
                start_frame = clip.start_frame,
                end_frame = clip.end_frame,
                frame_count = clip.frame_count,
                "session window clipped"
            );
            metrics::counter!("crop_windows_total", "outcome" => "clipped").increment(1);
            metrics::histogram!("crop_clip_frames").record(clip.frame_count as f64);
            outcome.clips.push(clip);
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::VideoFrameRef;

    /// VFR timeline with mixed 0.03 / 0.07 deltas, relative to stream start.
    fn make_vfr_timeline() -> FrameTimeline {
        let stamps = [0.00, 0.03, 0.10, 0.13, 0.20, 0.27];
        let frames = stamps
            .iter()
            .enumerate()
            .map(|(i, ts)| VideoFrameRef::new(i as u64, *ts))
            .collect();
        FrameTimeline::new(frames, 30.0, 0.27)
    }

    fn window(session: &str, start: f64, end: f64) -> SessionWindow {
        SessionWindow::new(session.into(), start, end)
    }

    #[test]
    fn test_vfr_window_selects_decoded_stamps_inclusively() {
        let cropper = VideoCropper::new(0.0);
        let outcome = cropper
            .crop(&make_vfr_timeline(), &[window("take", 0.10, 0.20)])
            .unwrap();

        assert!(outcome.is_clean());
        assert_eq!(outcome.clips.len(), 1);
        let clip = &outcome.clips[0];
        // Frames at 0.10, 0.13, 0.20; frame at 0.27 is out, both bounds in
        assert_eq!(clip.start_frame, 2);
        assert_eq!(clip.end_frame, 4);
        assert_eq!(clip.frame_count, 3);
        assert_eq!(clip.start_timestamp, 0.10);
        assert_eq!(clip.end_timestamp, 0.20);
    }

    #[test]
    fn test_absolute_offset_applies_to_both_domains() {
        let start = 1_766_488_163.738;
        let cropper = VideoCropper::new(start);
        // Mid-gap bounds: epoch-scale rounding moves them by ~1e-7, far less
        // than the 0.03 s between frames, so frame selection is stable
        let outcome = cropper
            .crop(
                &make_vfr_timeline(),
                &[window("take", start + 0.095, start + 0.205)],
            )
            .unwrap();

        let clip = &outcome.clips[0];
        assert_eq!(clip.start_frame, 2);
        assert_eq!(clip.end_frame, 4);
        assert_eq!(clip.frame_count, 3);
        assert_eq!(clip.start_timestamp, start + 0.10);
        assert_eq!(clip.end_timestamp, start + 0.20);
    }

    #[test]
    fn test_crop_is_idempotent() {
        let cropper = VideoCropper::new(0.0);
        let timeline = make_vfr_timeline();
        let windows = [window("a", 0.0, 0.03), window("b", 0.10, 0.27)];

        let first = cropper.crop(&timeline, &windows).unwrap();
        let second = cropper.crop(&timeline, &windows).unwrap();
        assert_eq!(first.clips, second.clips);
    }

    #[test]
    fn test_empty_window_is_collected_not_fatal() {
        let cropper = VideoCropper::new(0.0);
        let windows = [
            window("good", 0.10, 0.20),
            window("dead", 5.0, 6.0),
            window("also_good", 0.0, 0.03),
        ];
        let outcome = cropper.crop(&make_vfr_timeline(), &windows).unwrap();

        assert_eq!(outcome.clips.len(), 2);
        assert_eq!(outcome.clips[0].session_id, "good");
        assert_eq!(outcome.clips[1].session_id, "also_good");
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            &outcome.failures[0],
            AlignError::NoFramesInWindow { session_id, .. } if session_id == "dead"
        ));
    }

    #[test]
    fn test_zero_duration_window_on_frame_stamp() {
        let cropper = VideoCropper::new(0.0);
        let outcome = cropper
            .crop(&make_vfr_timeline(), &[window("take", 0.13, 0.13)])
            .unwrap();

        let clip = &outcome.clips[0];
        assert_eq!(clip.start_frame, 3);
        assert_eq!(clip.end_frame, 3);
        assert_eq!(clip.frame_count, 1);
    }

    #[test]
    fn test_window_between_frames_is_empty() {
        let cropper = VideoCropper::new(0.0);
        let outcome = cropper
            .crop(&make_vfr_timeline(), &[window("take", 0.04, 0.09)])
            .unwrap();
        assert!(outcome.clips.is_empty());
        assert_eq!(outcome.failures.len(), 1);
    }

    #[test]
    fn test_empty_timeline_is_fatal() {
        let cropper = VideoCropper::new(0.0);
        let err = cropper
            .crop(&FrameTimeline::default(), &[window("take", 0.0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, AlignError::InvalidInput { .. }));
    }

    #[test]
    fn test_unsorted_timeline_is_fatal() {
        let timeline = FrameTimeline::new(
            vec![VideoFrameRef::new(0, 0.10), VideoFrameRef::new(1, 0.05)],
            30.0,
            0.10,
        );
        let cropper = VideoCropper::new(0.0);
        let err = cropper
            .crop(&timeline, &[window("take", 0.0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, AlignError::InvalidInput { .. }));
    }
}
