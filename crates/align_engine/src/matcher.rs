//! Bracket location over a sorted pose sequence.

use contracts::{AlignError, Bracket, PoseSample, PoseSequence};

/// Reusable matcher over one pose sequence.
///
/// Validates the sequence once at construction so per-frame `locate` calls
/// stay pure binary search. Borrows the sequence immutably; safe to share
/// across worker threads for independent queries.
#[derive(Debug, Clone, Copy)]
pub struct MotionMatcher<'a> {
    sequence: &'a PoseSequence,
    gap_threshold: f64,
}

impl<'a> MotionMatcher<'a> {
    /// Build a matcher, checking preconditions once.
    ///
    /// # Errors
    /// `InvalidInput` when the sequence is empty or not sorted ascending.
    pub fn new(sequence: &'a PoseSequence, gap_threshold: f64) -> Result<Self, AlignError> {
        if sequence.is_empty() {
            return Err(AlignError::invalid_input("empty pose sequence"));
        }
        if !sequence.is_sorted_ascending() {
            return Err(AlignError::invalid_input(
                "pose sequence not sorted ascending by timestamp",
            ));
        }
        Ok(Self {
            sequence,
            gap_threshold,
        })
    }

    /// Find the bracketing pose pair for one query timestamp.
    ///
    /// Queries outside the sequence classify as `BeforeStart`/`AfterEnd`;
    /// queries between samples further apart than the gap threshold classify
    /// as `InGap`. A query landing exactly on a sample yields that sample's
    /// pose via a fraction of exactly 0 or 1, even at a session edge.
    ///
    /// # Errors
    /// `DegenerateBracket` when the query lands on duplicated timestamps.
    pub fn locate(&self, query_ts: f64) -> Result<Bracket, AlignError> {
        let samples = self.sequence.samples();
        let first = samples[0].timestamp;
        let last = samples[samples.len() - 1].timestamp;

        if query_ts < first {
            return Ok(Bracket::BeforeStart);
        }
        if query_ts > last {
            return Ok(Bracket::AfterEnd);
        }

        // First index with timestamp >= query
        let idx = samples.partition_point(|s| s.timestamp < query_ts);

        if idx < samples.len() && samples[idx].timestamp == query_ts {
            return self.bracket_at_sample(samples, idx);
        }

        // Strict interior bracket: samples[idx-1].ts < query < samples[idx].ts
        let left = &samples[idx - 1];
        let right = &samples[idx];
        let width = right.timestamp - left.timestamp;

        if width > self.gap_threshold {
            return Ok(Bracket::InGap {
                left_session_end: left.timestamp,
                right_session_start: right.timestamp,
            });
        }

        let fraction = ((query_ts - left.timestamp) / width).clamp(0.0, 1.0);
        bracket_pair(left, right, fraction)
    }

    /// Nearest-sample variant of [`locate`](Self::locate), for raw-pose mode.
    ///
    /// Snaps a matched bracket's fraction to exactly 0 (left closer) or 1
    /// (right closer or tie); out-of-range and in-gap classifications pass
    /// through unchanged.
    pub fn locate_nearest(&self, query_ts: f64) -> Result<Bracket, AlignError> {
        match self.locate(query_ts)? {
            Bracket::Matched {
                left,
                right,
                fraction,
            } => {
                let snapped = if fraction < 0.5 { 0.0 } else { 1.0 };
                Ok(Bracket::Matched {
                    left,
                    right,
                    fraction: snapped,
                })
            }
            other => Ok(other),
        }
    }

    /// Bracket for a query that hit a sample timestamp exactly.
    ///
    /// Real data exists at the query, so the gap policy does not suppress
    /// it; the fraction pins the result to the hit sample. Prefers the
    /// neighbor pair inside the same session so session-edge samples pair
    /// with their own run. Duplicated timestamps still surface as malformed
    /// input.
    fn bracket_at_sample(
        &self,
        samples: &[PoseSample],
        idx: usize,
    ) -> Result<Bracket, AlignError> {
        let forward_in_run = idx + 1 < samples.len()
            && samples[idx + 1].timestamp - samples[idx].timestamp <= self.gap_threshold;
        let backward_in_run =
            idx > 0 && samples[idx].timestamp - samples[idx - 1].timestamp <= self.gap_threshold;

        if forward_in_run {
            bracket_pair(&samples[idx], &samples[idx + 1], 0.0)
        } else if backward_in_run {
            bracket_pair(&samples[idx - 1], &samples[idx], 1.0)
        } else if idx + 1 < samples.len() {
            // Isolated sample; the gap-distant pair still pins to it
            bracket_pair(&samples[idx], &samples[idx + 1], 0.0)
        } else if idx > 0 {
            bracket_pair(&samples[idx - 1], &samples[idx], 1.0)
        } else {
            // Single-sample sequence; the sample is its own bracket
            let sample = samples[idx].clone();
            Ok(Bracket::Matched {
                left: sample.clone(),
                right: sample,
                fraction: 0.0,
            })
        }
    }
}

/// One-shot bracket location; validates the sequence on every call.
///
/// Batch callers should construct a [`MotionMatcher`] instead.
pub fn locate(
    sequence: &PoseSequence,
    query_ts: f64,
    gap_threshold: f64,
) -> Result<Bracket, AlignError> {
    MotionMatcher::new(sequence, gap_threshold)?.locate(query_ts)
}

/// One-shot nearest-sample location; see [`MotionMatcher::locate_nearest`].
pub fn locate_nearest(
    sequence: &PoseSequence,
    query_ts: f64,
    gap_threshold: f64,
) -> Result<Bracket, AlignError> {
    MotionMatcher::new(sequence, gap_threshold)?.locate_nearest(query_ts)
}

fn bracket_pair(
    left: &PoseSample,
    right: &PoseSample,
    fraction: f64,
) -> Result<Bracket, AlignError> {
    if right.timestamp == left.timestamp {
        return Err(AlignError::DegenerateBracket {
            timestamp: left.timestamp,
        });
    }
    Ok(Bracket::Matched {
        left: left.clone(),
        right: right.clone(),
        fraction,
    })
}
