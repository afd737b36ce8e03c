//! # Integration Tests
//!
//! End-to-end tests across the pipeline crates.
//!
//! Responsibilities:
//! - Full mock pipeline runs (no ffprobe/ffmpeg required)
//! - Exported artifact shape checks
//! - Session-window to cropper plumbing
//! - Config file to engine wiring

#[cfg(test)]
mod contract_tests {
    use contracts::BracketKind;

    #[test]
    fn test_shared_contracts() {
        assert_eq!(contracts::DEFAULT_GAP_THRESHOLD, 0.2);
        assert_eq!(BracketKind::Matched.as_str(), "matched");
        assert_eq!(BracketKind::InGap.as_str(), "in_gap");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::Path;

    use align_engine::{derive_session_windows, AlignMode, Aligner, VideoCropper};
    use contracts::VideoFrameRef;
    use exporter::{Dispatcher, JsonFileSink, LogSink, ReportSink, RunContext, SinkHandle};
    use ingestion::{FrameTimestampSource, MockVideoSource, MotionLoader};
    use observability::AlignmentStats;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    /// Absolute Unix-epoch start of the mock video; frame stamps at this
    /// magnitude only resolve to ~0.25 microseconds, which the fixtures
    /// stay far above.
    const START: f64 = 1.7e9;

    /// Write one motion log holding the given sessions.
    ///
    /// Pose position x is the sample's global index in stamp order, so tests
    /// can tell recorded poses (integer x) from interpolated ones.
    fn write_motion_log(path: &Path, sessions: &[(&str, &[f64])]) {
        let mut index = 0u64;
        let trajectories: Vec<Value> = sessions
            .iter()
            .map(|(name, stamps)| {
                let poses: Vec<Vec<f64>> = stamps
                    .iter()
                    .map(|_| {
                        let row = vec![index as f64, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0];
                        index += 1;
                        row
                    })
                    .collect();
                json!({"name": name, "timestamps": stamps, "poses": poses})
            })
            .collect();
        let doc = json!({ "trajectories": trajectories });
        fs::write(path, serde_json::to_string(&doc).unwrap()).unwrap();
    }

    /// Two sessions 0.8 s apart: "pick" with samples every 0.1 s, then
    /// "place" with two samples 0.1 s apart.
    fn write_two_session_dir(dir: &Path) {
        write_motion_log(
            &dir.join("bench_take.json"),
            &[
                ("pick", &[START, START + 0.1, START + 0.2]),
                ("place", &[START + 1.0, START + 1.1]),
            ],
        );
    }

    /// MotionLoader -> Aligner -> Dispatcher -> JSON + report + log sinks,
    /// with both artifacts read back and checked.
    #[tokio::test]
    async fn test_e2e_mock_pipeline() {
        let dir = TempDir::new().unwrap();
        let motion_dir = dir.path().join("poses");
        fs::create_dir(&motion_dir).unwrap();
        write_two_session_dir(&motion_dir);

        let sequence = MotionLoader::load_dir(&motion_dir).unwrap();
        assert_eq!(sequence.len(), 5);

        // 23 frames at 20 fps: offsets 0.00 .. 1.10
        let source = MockVideoSource::from_deltas(&[0.05; 22]);
        let timeline = source.frame_timeline().unwrap();
        assert_eq!(timeline.len(), 23);

        let windows = derive_session_windows(&sequence, 0.2);
        assert_eq!(windows.len(), 2);

        let context = RunContext {
            video_path: dir.path().join("bench.mp4"),
            nominal_fps: timeline.nominal_fps,
            calibrated_start: START,
            gap_threshold: 0.2,
            windows,
        };
        let json_path = dir.path().join("out/synced_poses.json");
        let report_path = dir.path().join("out/alignment_report.md");

        let handles = vec![
            SinkHandle::spawn(JsonFileSink::new(&json_path, context.clone()).unwrap(), 32),
            SinkHandle::spawn(ReportSink::new(&report_path, context.clone()).unwrap(), 32),
            SinkHandle::spawn(LogSink::new(100), 32),
        ];
        let (tx, rx) = Dispatcher::channel(32);
        let dispatcher_handle = Dispatcher::new(handles, rx).spawn();

        let aligner = Aligner::new(&sequence, 0.2, AlignMode::Interpolated).unwrap();
        let mut stats = AlignmentStats::new();

        for frame in &timeline.frames {
            let absolute = VideoFrameRef::new(frame.frame_index, START + frame.timestamp);
            let aligned = aligner.align_frame(&absolute).unwrap();
            stats.update(&aligned);
            tx.send(aligned).await.unwrap();
        }

        drop(tx);
        dispatcher_handle.await.unwrap();

        // Frames 0-4 fall in "pick", 20-22 in "place", the 15 between in the gap
        let summary = stats.summary();
        assert_eq!(summary.total_frames, 23);
        assert_eq!(summary.matched, 8);
        assert_eq!(summary.in_gap, 15);
        assert_eq!(summary.out_of_range, 0);

        // The JSON document mirrors the driver-side totals
        let doc: Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(doc["metadata"]["total_frames"], 23);
        assert_eq!(doc["metadata"]["matched"], 8);
        assert_eq!(doc["metadata"]["in_gap"], 15);
        assert_eq!(doc["metadata"]["session_count"], 2);

        let frames = doc["frames"].as_array().unwrap();
        assert_eq!(frames.len(), 23);

        // Frame 0 sits exactly on the first "pick" sample
        assert_eq!(frames[0]["classification"], "matched");
        assert_eq!(frames[0]["position"]["x"], 0.0);

        // Frame 1 is halfway between samples 0 and 1
        let x = frames[1]["position"]["x"].as_f64().unwrap();
        assert!((x - 0.5).abs() < 1e-6);

        // Gap frames carry no pose at all
        assert_eq!(frames[10]["classification"], "in_gap");
        assert_eq!(frames[10]["valid"], false);
        assert!(frames[10].get("position").is_none());

        // Frame 20 sits exactly on the first "place" sample (global index 3)
        assert_eq!(frames[20]["classification"], "matched");
        assert_eq!(frames[20]["position"]["x"], 3.0);

        // The report counts matched frames per session window
        let report = fs::read_to_string(&report_path).unwrap();
        assert!(report.contains("# Alignment Run Report"));
        assert!(report.contains("| Matched | 8 |"), "report:\n{report}");
        assert!(report.contains("| pick | 1700000000.000 | 1700000000.200 | 0.200 | 5 |"));
        assert!(report.contains("| place | 1700000001.000 | 1700000001.100 | 0.100 | 3 |"));
    }

    /// Raw mode must only ever emit recorded poses; with integer-x fixtures
    /// any fractional x would be a fabricated pose.
    #[test]
    fn test_nearest_raw_end_to_end() {
        let dir = TempDir::new().unwrap();
        write_two_session_dir(dir.path());
        let sequence = MotionLoader::load_dir(dir.path()).unwrap();

        let source = MockVideoSource::from_deltas(&[0.04; 30]);
        let timeline = source.frame_timeline().unwrap();

        let aligner = Aligner::new(&sequence, 0.2, AlignMode::NearestRaw).unwrap();
        let mut valid_frames = 0u64;

        for frame in &timeline.frames {
            let absolute = VideoFrameRef::new(frame.frame_index, START + frame.timestamp);
            let aligned = aligner.align_frame(&absolute).unwrap();
            if aligned.pose.valid {
                valid_frames += 1;
                let x = aligned.pose.position.x;
                assert_eq!(x.fract(), 0.0, "frame {} got interpolated x {x}", frame.frame_index);
            }
        }

        assert!(valid_frames > 0);
    }

    /// Windows derived from the motion log select the matching frame ranges
    /// on the video's own timeline.
    #[test]
    fn test_session_windows_drive_cropper() {
        let dir = TempDir::new().unwrap();
        // Dyadic stamp offsets so the absolute values stay exact
        write_motion_log(
            &dir.path().join("runs.json"),
            &[
                ("pick", &[START, START + 0.125, START + 0.25]),
                ("place", &[START + 1.0, START + 1.125, START + 1.25]),
            ],
        );
        let sequence = MotionLoader::load_dir(dir.path()).unwrap();
        let windows = derive_session_windows(&sequence, 0.2);
        assert_eq!(windows.len(), 2);

        // 24 frames at 16 fps: offsets 0.0 .. 1.4375 in exact 1/16 steps
        let source = MockVideoSource::constant_rate(16.0, 24);
        let timeline = source.frame_timeline().unwrap();

        let outcome = VideoCropper::new(START).crop(&timeline, &windows).unwrap();
        assert!(outcome.is_clean());
        assert_eq!(outcome.clips.len(), 2);

        let pick = &outcome.clips[0];
        assert_eq!(pick.session_id, "pick");
        assert_eq!(pick.start_frame, 0);
        assert_eq!(pick.end_frame, 4);
        assert_eq!(pick.frame_count, 5);

        let place = &outcome.clips[1];
        assert_eq!(place.session_id, "place");
        assert_eq!(place.start_frame, 16);
        assert_eq!(place.end_frame, 20);
        assert_eq!(place.frame_count, 5);
    }

    /// A config file's sync parameters reach the engine unchanged.
    #[test]
    fn test_config_file_drives_engine() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("vidsync.toml");
        fs::write(
            &config_path,
            r#"
video_path = "captures/bench.mp4"
motion_dir = "captures/poses"
output_dir = "out"

[sync]
gap_threshold = 0.25
calibrated_start = 1700000000.0

[export]
write_report = false
log_every = 50
"#,
        )
        .unwrap();

        let config = config_loader::ConfigLoader::load_from_path(&config_path).unwrap();
        assert_eq!(config.sync.gap_threshold, 0.25);
        assert_eq!(config.sync.calibrated_start, Some(1700000000.0));
        assert!(config.export.write_json, "write_json defaults on");
        assert!(!config.export.write_report);

        // A 0.22 s bracket is continuous motion under this config's
        // threshold, though the 0.2 default would call it a gap
        let log_path = dir.path().join("wide.json");
        write_motion_log(&log_path, &[("take", &[START, START + 0.22])]);
        let sequence = MotionLoader::load(&log_path).unwrap();

        let aligner = Aligner::new(
            &sequence,
            config.sync.gap_threshold,
            AlignMode::Interpolated,
        )
        .unwrap();
        let frame = aligner
            .align_frame(&VideoFrameRef::new(0, START + 0.1))
            .unwrap();
        assert!(frame.pose.valid);
    }
}
