//! Configuration validation
//!
//! Rules:
//! - video_path / motion_dir / output_dir non-empty
//! - gap_threshold finite and >= 0
//! - calibrated_start, when set, within plausible Unix-epoch bounds
//! - log_every >= 1
//!
//! Derive-level bounds live on the config structs; cross-cutting checks and
//! report assembly live here.

use contracts::{AlignError, ExportConfig, PipelineConfig, SyncConfig};
use validator::Validate;

/// Validate a PipelineConfig, surfacing the first finding as an error.
pub fn validate(config: &PipelineConfig) -> Result<(), AlignError> {
    if let Some((field, message)) = findings(config).into_iter().next() {
        return Err(AlignError::config_validation(field, message));
    }
    Ok(())
}

/// Every finding as a `field: message` line, for the `validate` command.
///
/// Sorted by field so the report is stable across runs.
pub fn validation_report(config: &PipelineConfig) -> Vec<String> {
    findings(config)
        .into_iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect()
}

fn findings(config: &PipelineConfig) -> Vec<(String, String)> {
    let mut out = Vec::new();
    check_paths(config, &mut out);
    check_sync(&config.sync, &mut out);
    check_export(&config.export, &mut out);
    out.sort();
    out
}

fn check_paths(config: &PipelineConfig, out: &mut Vec<(String, String)>) {
    if config.video_path.as_os_str().is_empty() {
        out.push(("video_path".into(), "path cannot be empty".into()));
    }
    if config.motion_dir.as_os_str().is_empty() {
        out.push(("motion_dir".into(), "path cannot be empty".into()));
    }
    if config.output_dir.as_os_str().is_empty() {
        out.push(("output_dir".into(), "path cannot be empty".into()));
    }
}

fn check_sync(sync: &SyncConfig, out: &mut Vec<(String, String)>) {
    collect_derive_findings("sync", sync, out);
    // range(min) lets +inf through
    if !sync.gap_threshold.is_finite() {
        out.push((
            "sync.gap_threshold".into(),
            format!("must be finite, got {}", sync.gap_threshold),
        ));
    }
}

fn check_export(export: &ExportConfig, out: &mut Vec<(String, String)>) {
    collect_derive_findings("export", export, out);
}

fn collect_derive_findings<T: Validate>(section: &str, value: &T, out: &mut Vec<(String, String)>) {
    if let Err(errors) = value.validate() {
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_deref()
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("failed rule '{}'", error.code));
                out.push((format!("{section}.{field}"), message));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn minimal_config() -> PipelineConfig {
        PipelineConfig {
            video_path: PathBuf::from("captures/session.mp4"),
            motion_dir: PathBuf::from("captures/poses"),
            output_dir: PathBuf::from("output"),
            sync: SyncConfig::default(),
            export: ExportConfig::default(),
            metrics_port: 0,
        }
    }

    #[test]
    fn test_valid_config() {
        let cfg = minimal_config();
        assert!(validate(&cfg).is_ok());
        assert!(validation_report(&cfg).is_empty());
    }

    #[test]
    fn test_empty_video_path() {
        let mut cfg = minimal_config();
        cfg.video_path = PathBuf::new();
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("video_path"), "got: {err}");
    }

    #[test]
    fn test_negative_gap_threshold() {
        let mut cfg = minimal_config();
        cfg.sync.gap_threshold = -1.0;
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("non-negative"), "got: {err}");
    }

    #[test]
    fn test_nan_gap_threshold() {
        let mut cfg = minimal_config();
        cfg.sync.gap_threshold = f64::NAN;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_infinite_gap_threshold() {
        let mut cfg = minimal_config();
        cfg.sync.gap_threshold = f64::INFINITY;
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("finite"), "got: {err}");
    }

    #[test]
    fn test_implausible_calibrated_start() {
        let mut cfg = minimal_config();
        // Relative seconds, not epoch
        cfg.sync.calibrated_start = Some(12.5);
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("Unix-epoch"), "got: {err}");
    }

    #[test]
    fn test_zero_log_every() {
        let mut cfg = minimal_config();
        cfg.export.log_every = 0;
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("log_every"), "got: {err}");
    }

    #[test]
    fn test_report_collects_all_findings() {
        let mut cfg = minimal_config();
        cfg.video_path = PathBuf::new();
        cfg.sync.gap_threshold = -1.0;
        cfg.export.log_every = 0;
        let report = validation_report(&cfg);
        assert_eq!(report.len(), 3, "got: {report:?}");
    }
}
