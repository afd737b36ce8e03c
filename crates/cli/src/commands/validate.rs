//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{AlignError, PipelineConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    video: String,
    motion_dir: String,
    output_dir: String,
    gap_threshold: f64,
    calibrated_start: Option<f64>,
    write_json: bool,
    write_report: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        Err(AlignError::config_validation("config", "validation failed, see findings").into())
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            errors: Some(vec![format!(
                "File not found: {}",
                args.config.display()
            )]),
            warnings: None,
            summary: None,
        };
    }

    // Parse first, then collect every validation finding at once
    match config_loader::ConfigLoader::parse_from_path(&args.config) {
        Ok(config) => {
            let findings = config_loader::validation_report(&config);
            let warnings = collect_warnings(&config);
            let valid = findings.is_empty();

            ValidationResult {
                valid,
                config_path,
                errors: if valid { None } else { Some(findings) },
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    video: config.video_path.display().to_string(),
                    motion_dir: config.motion_dir.display().to_string(),
                    output_dir: config.output_dir.display().to_string(),
                    gap_threshold: config.sync.gap_threshold,
                    calibrated_start: config.sync.calibrated_start,
                    write_json: config.export.write_json,
                    write_report: config.export.write_report,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            errors: Some(vec![e.to_string()]),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &PipelineConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.sync.calibrated_start.is_none() {
        warnings.push(
            "sync.calibrated_start is unset - `run` and `crop` will refuse to start".to_string(),
        );
    }

    // Input paths are resolved at run time, but a typo is worth flagging now
    if !config.video_path.exists() {
        warnings.push(format!(
            "video file does not exist: {}",
            config.video_path.display()
        ));
    }
    if !config.motion_dir.is_dir() {
        warnings.push(format!(
            "motion dir does not exist: {}",
            config.motion_dir.display()
        ));
    }

    if !config.export.write_json && !config.export.write_report {
        warnings.push("both export outputs disabled - run will only log progress".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Video: {}", summary.video);
            println!("  Motion dir: {}", summary.motion_dir);
            println!("  Output dir: {}", summary.output_dir);
            println!("  Gap threshold: {:.3} s", summary.gap_threshold);
            match summary.calibrated_start {
                Some(start) => println!("  Calibrated start: {start:.6}"),
                None => println!("  Calibrated start: (unset)"),
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref errors) = result.errors {
            println!("\n  Findings:");
            for error in errors {
                println!("  - {}", error);
            }
        }
    }

    if let Some(ref warnings) = result.warnings {
        println!("\n⚠ Warnings:");
        for warning in warnings {
            println!("  - {}", warning);
        }
    }
}
