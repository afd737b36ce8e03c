//! `run` command implementation.

use align_engine::AlignMode;
use anyhow::{Context, Result};
use contracts::AlignError;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineOptions};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        return Err(AlignError::config_parse(format!(
            "configuration file not found: {}",
            args.config.display()
        ))
        .into());
    }

    // Load and parse configuration
    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref video) = args.video {
        info!(video = %video.display(), "Overriding video path from CLI");
        config.video_path = video.clone();
    }
    if let Some(ref motion_dir) = args.motion_dir {
        info!(motion_dir = %motion_dir.display(), "Overriding motion dir from CLI");
        config.motion_dir = motion_dir.clone();
    }
    if let Some(ref output_dir) = args.output_dir {
        info!(output_dir = %output_dir.display(), "Overriding output dir from CLI");
        config.output_dir = output_dir.clone();
    }
    if let Some(port) = args.metrics_port {
        config.metrics_port = port;
    }
    if args.no_report {
        config.export.write_report = false;
    }

    info!(
        video = %config.video_path.display(),
        motion_dir = %config.motion_dir.display(),
        output_dir = %config.output_dir.display(),
        gap_threshold = config.sync.gap_threshold,
        calibrated_start = ?config.sync.calibrated_start,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    // Build pipeline options
    let options = PipelineOptions {
        config,
        max_frames: if args.limit == 0 {
            None
        } else {
            Some(args.limit)
        },
        buffer_size: args.buffer_size,
        mode: if args.raw {
            AlignMode::NearestRaw
        } else {
            AlignMode::Interpolated
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(options);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting alignment pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        frames = stats.alignment.total_frames,
                        matched = stats.alignment.matched,
                        duration_secs = stats.duration.as_secs_f64(),
                        fps = format!("{:.2}", stats.fps()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("vidsync finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &contracts::PipelineConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Inputs:");
    println!("  Video: {}", config.video_path.display());
    println!("  Motion dir: {}", config.motion_dir.display());
    println!("  Output dir: {}", config.output_dir.display());

    println!("\nSync:");
    println!("  Gap threshold: {:.3} s", config.sync.gap_threshold);
    match config.sync.calibrated_start {
        Some(start) => println!("  Calibrated start: {start:.6}"),
        None => println!("  Calibrated start: (unset - run will refuse to start)"),
    }

    println!("\nExport:");
    println!("  Synced JSON: {}", config.export.write_json);
    println!("  Report: {}", config.export.write_report);
    println!("  Log every: {} frames", config.export.log_every);

    if config.metrics_port != 0 {
        println!("\nMetrics port: {}", config.metrics_port);
    }

    println!();
}
