//! Session window derivation.
//!
//! A pose sequence covers one or more recording sessions, and a session can
//! be interrupted and resumed. Both show up in the data the same way: the
//! session label changes, or consecutive timestamps jump further apart than
//! the gap threshold. Each maximal run between such breaks becomes one
//! [`SessionWindow`].

use std::collections::HashMap;

use contracts::{PoseSequence, SessionId, SessionWindow};

/// Split a sequence into contiguous session windows.
///
/// A new window starts whenever the session label changes or the timestamp
/// delta exceeds `gap_threshold`. Repeated runs of the same label get a
/// numeric suffix (`take`, `take-2`, ...) so downstream artifacts stay
/// distinguishable. Window bounds are the first and last sample timestamp of
/// the run; a single-sample run yields a zero-duration window.
pub fn derive_session_windows(sequence: &PoseSequence, gap_threshold: f64) -> Vec<SessionWindow> {
    let samples = sequence.samples();
    let mut windows = Vec::new();
    let mut run_counts: HashMap<SessionId, usize> = HashMap::new();

    let mut run_start = match samples.first() {
        Some(first) => first,
        None => return windows,
    };
    let mut prev = run_start;

    for sample in &samples[1..] {
        let delta = sample.timestamp - prev.timestamp;
        if sample.session_id != prev.session_id || delta > gap_threshold {
            windows.push(close_run(run_start, prev, &mut run_counts));
            run_start = sample;
        }
        prev = sample;
    }
    windows.push(close_run(run_start, prev, &mut run_counts));

    windows
}

fn close_run(
    start: &contracts::PoseSample,
    end: &contracts::PoseSample,
    run_counts: &mut HashMap<SessionId, usize>,
) -> SessionWindow {
    let run = run_counts
        .entry(start.session_id.clone())
        .and_modify(|n| *n += 1)
        .or_insert(1);
    SessionWindow::new(
        start.session_id.run_label(*run),
        start.timestamp,
        end.timestamp,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{PoseSample, Quat, Vec3};

    fn make_sample(ts: f64, session: &str) -> PoseSample {
        PoseSample::new(ts, Vec3::ZERO, Quat::IDENTITY, session.into())
    }

    fn make_sequence(samples: Vec<PoseSample>) -> PoseSequence {
        PoseSequence::new(samples).unwrap()
    }

    #[test]
    fn test_empty_sequence_has_no_windows() {
        let windows = derive_session_windows(&make_sequence(vec![]), 0.2);
        assert!(windows.is_empty());
    }

    #[test]
    fn test_contiguous_session_is_one_window() {
        let seq = make_sequence(vec![
            make_sample(1.0, "take"),
            make_sample(1.1, "take"),
            make_sample(1.2, "take"),
        ]);
        let windows = derive_session_windows(&seq, 0.2);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].session_id, "take");
        assert_eq!(windows[0].start, 1.0);
        assert_eq!(windows[0].end, 1.2);
    }

    #[test]
    fn test_label_change_splits() {
        let seq = make_sequence(vec![
            make_sample(1.0, "take_a"),
            make_sample(1.1, "take_a"),
            make_sample(1.15, "take_b"),
            make_sample(1.25, "take_b"),
        ]);
        let windows = derive_session_windows(&seq, 0.2);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].session_id, "take_a");
        assert_eq!(windows[0].end, 1.1);
        assert_eq!(windows[1].session_id, "take_b");
        assert_eq!(windows[1].start, 1.15);
    }

    #[test]
    fn test_time_gap_splits_and_suffixes_resumed_run() {
        let seq = make_sequence(vec![
            make_sample(1.0, "take"),
            make_sample(1.1, "take"),
            make_sample(5.0, "take"),
            make_sample(5.1, "take"),
        ]);
        let windows = derive_session_windows(&seq, 0.2);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].session_id, "take");
        assert_eq!(windows[1].session_id, "take-2");
        assert_eq!(windows[1].start, 5.0);
        assert_eq!(windows[1].end, 5.1);
    }

    #[test]
    fn test_delta_equal_to_threshold_does_not_split() {
        let seq = make_sequence(vec![make_sample(1.0, "take"), make_sample(1.2, "take")]);
        let windows = derive_session_windows(&seq, 0.2);
        assert_eq!(windows.len(), 1);
    }

    #[test]
    fn test_single_sample_run_is_zero_duration() {
        let seq = make_sequence(vec![
            make_sample(1.0, "take"),
            make_sample(3.0, "take"),
            make_sample(3.1, "take"),
        ]);
        let windows = derive_session_windows(&seq, 0.2);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].start, 1.0);
        assert_eq!(windows[0].end, 1.0);
        assert_eq!(windows[0].duration(), 0.0);
    }

    #[test]
    fn test_interleaved_labels_count_runs_separately() {
        let seq = make_sequence(vec![
            make_sample(1.0, "a"),
            make_sample(2.0, "b"),
            make_sample(3.0, "a"),
            make_sample(4.0, "b"),
        ]);
        let windows = derive_session_windows(&seq, 10.0);
        let labels: Vec<_> = windows.iter().map(|w| w.session_id.as_str()).collect();
        assert_eq!(labels, ["a", "b", "a-2", "b-2"]);
    }
}
