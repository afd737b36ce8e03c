//! Video timeline sources.
//!
//! VFR footage makes `frame_index / fps` a lie; the only trustworthy clock
//! is the per-frame decoded timestamp. [`FfprobeSource`] shells out to
//! `ffprobe` for those, [`MockVideoSource`] fabricates them for tests and
//! demos.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use std::time::UNIX_EPOCH;

use contracts::{
    AlignError, FrameTimeline, FrameTimestampSource, Result, VideoFrameRef, VideoInfo,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
struct ProbeFramesDoc {
    #[serde(default)]
    frames: Vec<ProbeFrame>,
}

#[derive(Debug, Deserialize)]
struct ProbeFrame {
    #[serde(default)]
    best_effort_timestamp_time: Option<String>,

    #[serde(default)]
    pts_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStreamsDoc {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    avg_frame_rate: Option<String>,

    #[serde(default)]
    r_frame_rate: Option<String>,

    #[serde(default)]
    duration: Option<String>,

    #[serde(default)]
    nb_frames: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
struct StreamMeta {
    fps: f64,
    duration: Option<f64>,
    frame_count: Option<u64>,
}

/// Per-frame timestamp source backed by the `ffprobe` binary.
///
/// The frame probe decodes the whole container, so its result is cached;
/// repeated `frame_timeline` calls return the same timeline.
#[derive(Debug)]
pub struct FfprobeSource {
    path: PathBuf,
    cache: OnceLock<FrameTimeline>,
}

impl FfprobeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Container metadata plus the mtime-based start-time hint.
    ///
    /// The hint assumes file modification time marks the end of recording;
    /// it is operator guidance only and never feeds alignment or cropping.
    pub fn video_info(&self) -> Result<VideoInfo> {
        let meta = self.stream_meta()?;
        let (frame_count, duration) = match (meta.frame_count, meta.duration) {
            (Some(count), Some(duration)) => (count, duration),
            _ => {
                // Container omitted the counts; fall back to the frame probe
                let timeline = self.frame_timeline()?;
                (
                    meta.frame_count.unwrap_or(timeline.len() as u64),
                    meta.duration
                        .unwrap_or_else(|| timeline.last_timestamp().unwrap_or(0.0)),
                )
            }
        };

        let start_hint = fs::metadata(&self.path)
            .ok()
            .and_then(|m| m.modified().ok())
            .and_then(|mtime| mtime.duration_since(UNIX_EPOCH).ok())
            .map(|since_epoch| since_epoch.as_secs_f64() - duration);

        Ok(VideoInfo {
            path: self.path.clone(),
            nominal_fps: meta.fps,
            duration,
            frame_count,
            start_hint,
        })
    }

    fn stream_meta(&self) -> Result<StreamMeta> {
        let stdout = self.run_ffprobe("stream=avg_frame_rate,r_frame_rate,duration,nb_frames")?;
        parse_stream_meta(&stdout)
    }

    #[instrument(level = "info", name = "probe_frames", skip(self), fields(path = %self.path.display()))]
    fn probe_timeline(&self) -> Result<FrameTimeline> {
        let meta = self.stream_meta()?;
        let stdout = self.run_ffprobe("frame=best_effort_timestamp_time,pts_time")?;
        let frames = parse_frame_stamps(&stdout)?;

        if frames.is_empty() {
            return Err(AlignError::video_probe(format!(
                "no decodable frames in '{}'",
                self.path.display()
            )));
        }

        let duration = meta
            .duration
            .or_else(|| frames.last().map(|f| f.timestamp))
            .unwrap_or(0.0);

        info!(frames = frames.len(), fps = meta.fps, duration, "frame timeline probed");
        metrics::counter!("video_frames_probed_total").increment(frames.len() as u64);

        Ok(FrameTimeline::new(frames, meta.fps, duration))
    }

    fn run_ffprobe(&self, entries: &str) -> Result<Vec<u8>> {
        let output = Command::new("ffprobe")
            .arg("-v")
            .arg("error")
            .arg("-select_streams")
            .arg("v:0")
            .arg("-show_entries")
            .arg(entries)
            .arg("-of")
            .arg("json")
            .arg(&self.path)
            .output()
            .map_err(|e| AlignError::VideoProbe {
                message: "failed to run ffprobe (is it installed?)".to_string(),
                source: Some(Box::new(e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AlignError::video_probe(format!(
                "ffprobe failed on '{}': {}",
                self.path.display(),
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

impl FrameTimestampSource for FfprobeSource {
    fn source_name(&self) -> &str {
        "ffprobe"
    }

    fn frame_timeline(&self) -> Result<FrameTimeline> {
        if let Some(timeline) = self.cache.get() {
            return Ok(timeline.clone());
        }
        let timeline = self.probe_timeline()?;
        Ok(self.cache.get_or_init(|| timeline).clone())
    }
}

/// In-memory timeline source for tests and demos.
#[derive(Debug, Clone)]
pub struct MockVideoSource {
    timeline: FrameTimeline,
}

impl MockVideoSource {
    pub fn new(timeline: FrameTimeline) -> Self {
        Self { timeline }
    }

    /// Fixed-rate timeline: frame i at `i / fps` seconds.
    pub fn constant_rate(fps: f64, frame_count: usize) -> Self {
        let frames = (0..frame_count)
            .map(|i| VideoFrameRef::new(i as u64, i as f64 / fps))
            .collect();
        let duration = frame_count as f64 / fps;
        Self::new(FrameTimeline::new(frames, fps, duration))
    }

    /// VFR timeline: frame 0 at 0.0, then one frame per delta.
    pub fn from_deltas(deltas: &[f64]) -> Self {
        let mut frames = Vec::with_capacity(deltas.len() + 1);
        let mut ts = 0.0;
        frames.push(VideoFrameRef::new(0, ts));
        for (i, delta) in deltas.iter().enumerate() {
            ts += delta;
            frames.push(VideoFrameRef::new(i as u64 + 1, ts));
        }
        let nominal_fps = if deltas.is_empty() || ts <= 0.0 {
            0.0
        } else {
            deltas.len() as f64 / ts
        };
        Self::new(FrameTimeline::new(frames, nominal_fps, ts))
    }
}

impl FrameTimestampSource for MockVideoSource {
    fn source_name(&self) -> &str {
        "mock"
    }

    fn frame_timeline(&self) -> Result<FrameTimeline> {
        if self.timeline.is_empty() {
            return Err(AlignError::video_probe("mock timeline is empty"));
        }
        Ok(self.timeline.clone())
    }
}

fn parse_stream_meta(bytes: &[u8]) -> Result<StreamMeta> {
    let doc: ProbeStreamsDoc = serde_json::from_slice(bytes)
        .map_err(|e| AlignError::video_probe(format!("unparsable stream probe: {e}")))?;

    let Some(stream) = doc.streams.first() else {
        return Err(AlignError::video_probe("no video stream found"));
    };

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rate))
        .unwrap_or(0.0);

    Ok(StreamMeta {
        fps,
        duration: stream.duration.as_deref().and_then(|s| s.parse().ok()),
        frame_count: stream.nb_frames.as_deref().and_then(|s| s.parse().ok()),
    })
}

fn parse_frame_stamps(bytes: &[u8]) -> Result<Vec<VideoFrameRef>> {
    let doc: ProbeFramesDoc = serde_json::from_slice(bytes)
        .map_err(|e| AlignError::video_probe(format!("unparsable frame probe: {e}")))?;

    let mut frames = Vec::with_capacity(doc.frames.len());
    let mut unstamped = 0usize;
    for (index, frame) in doc.frames.iter().enumerate() {
        let stamp = frame
            .best_effort_timestamp_time
            .as_deref()
            .or(frame.pts_time.as_deref())
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|ts| ts.is_finite());

        match stamp {
            Some(ts) => frames.push(VideoFrameRef::new(index as u64, ts)),
            None => unstamped += 1,
        }
    }

    if unstamped > 0 {
        warn!(unstamped, "frames without a usable timestamp were dropped");
    }

    // Decode order differs from presentation order when the encoder
    // reorders frames; the timeline wants presentation order
    frames.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    Ok(frames)
}

/// Parse an ffprobe rate string, either rational ("30000/1001") or plain.
fn parse_rate(raw: &str) -> Option<f64> {
    if let Some((num, den)) = raw.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den == 0.0 || !num.is_finite() || !den.is_finite() {
            return None;
        }
        let rate = num / den;
        (rate > 0.0).then_some(rate)
    } else {
        let rate: f64 = raw.trim().parse().ok()?;
        (rate.is_finite() && rate > 0.0).then_some(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate_forms() {
        assert_eq!(parse_rate("30"), Some(30.0));
        assert!((parse_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_rate("0/0"), None);
        assert_eq!(parse_rate("garbage"), None);
    }

    #[test]
    fn test_parse_stream_meta() {
        let json = br#"{"streams": [{"avg_frame_rate": "30000/1001",
            "r_frame_rate": "30/1", "duration": "12.500000", "nb_frames": "374"}]}"#;
        let meta = parse_stream_meta(json).unwrap();
        assert!((meta.fps - 29.97).abs() < 0.01);
        assert_eq!(meta.duration, Some(12.5));
        assert_eq!(meta.frame_count, Some(374));
    }

    #[test]
    fn test_stream_meta_falls_back_to_r_frame_rate() {
        let json = br#"{"streams": [{"avg_frame_rate": "0/0", "r_frame_rate": "60/1"}]}"#;
        let meta = parse_stream_meta(json).unwrap();
        assert_eq!(meta.fps, 60.0);
        assert_eq!(meta.duration, None);
    }

    #[test]
    fn test_no_video_stream_is_error() {
        let err = parse_stream_meta(br#"{"streams": []}"#).unwrap_err();
        assert!(matches!(err, AlignError::VideoProbe { .. }));
    }

    #[test]
    fn test_parse_frame_stamps_prefers_best_effort() {
        let json = br#"{"frames": [
            {"best_effort_timestamp_time": "0.000000", "pts_time": "0.500000"},
            {"pts_time": "0.033000"},
            {"best_effort_timestamp_time": "0.103000"}
        ]}"#;
        let frames = parse_frame_stamps(json).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].timestamp, 0.0);
        assert_eq!(frames[1].timestamp, 0.033);
        assert_eq!(frames[2].timestamp, 0.103);
    }

    #[test]
    fn test_unstamped_frames_are_dropped() {
        let json = br#"{"frames": [
            {"best_effort_timestamp_time": "0.000000"},
            {},
            {"best_effort_timestamp_time": "0.066000"}
        ]}"#;
        let frames = parse_frame_stamps(json).unwrap();
        assert_eq!(frames.len(), 2);
        // Indexes are decode positions, so the gap stays visible
        assert_eq!(frames[1].frame_index, 2);
    }

    #[test]
    fn test_reordered_stamps_are_sorted_to_presentation_order() {
        let json = br#"{"frames": [
            {"pts_time": "0.066000"},
            {"pts_time": "0.000000"},
            {"pts_time": "0.033000"}
        ]}"#;
        let frames = parse_frame_stamps(json).unwrap();
        assert_eq!(frames[0].timestamp, 0.0);
        assert_eq!(frames[0].frame_index, 1);
        assert_eq!(frames[2].timestamp, 0.066);
    }

    #[test]
    fn test_mock_constant_rate() {
        let source = MockVideoSource::constant_rate(10.0, 4);
        let timeline = source.frame_timeline().unwrap();
        assert_eq!(timeline.len(), 4);
        assert_eq!(timeline.frames[2].timestamp, 0.2);
        assert_eq!(timeline.nominal_fps, 10.0);
    }

    #[test]
    fn test_mock_from_deltas_accumulates() {
        let source = MockVideoSource::from_deltas(&[0.03, 0.07, 0.03]);
        let timeline = source.frame_timeline().unwrap();
        assert_eq!(timeline.len(), 4);
        assert!((timeline.frames[3].timestamp - 0.13).abs() < 1e-12);
    }

    #[test]
    fn test_empty_mock_is_error() {
        let source = MockVideoSource::new(FrameTimeline::default());
        assert!(source.frame_timeline().is_err());
    }
}
