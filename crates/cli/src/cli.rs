//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Vidsync - temporal alignment of VFR video and 3D motion logs
#[derive(Parser, Debug)]
#[command(
    name = "vidsync",
    author,
    version,
    about = "Video / motion-log temporal alignment pipeline",
    long_about = "Aligns variable-frame-rate video with recorded 3D pose logs.\n\n\
                  Loads per-frame decoded timestamps and hand-pose trajectories, \n\
                  matches and interpolates a pose for every frame, and exports \n\
                  synced-pose documents, run reports and per-session clips."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "VIDSYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "VIDSYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full alignment pipeline
    Run(RunArgs),

    /// Derive session clip boundaries (optionally extract with ffmpeg)
    Crop(CropArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration and input information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "vidsync.toml", env = "VIDSYNC_CONFIG")]
    pub config: PathBuf,

    /// Override video file from configuration
    #[arg(long, env = "VIDSYNC_VIDEO")]
    pub video: Option<PathBuf>,

    /// Override motion-log directory from configuration
    #[arg(long, env = "VIDSYNC_MOTION_DIR")]
    pub motion_dir: Option<PathBuf>,

    /// Override output directory from configuration
    #[arg(long, env = "VIDSYNC_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum number of frames to align (0 = unlimited)
    #[arg(long, default_value = "0", env = "VIDSYNC_LIMIT")]
    pub limit: u64,

    /// Snap to the nearest recorded sample instead of interpolating
    #[arg(long)]
    pub raw: bool,

    /// Skip the Markdown run report
    #[arg(long)]
    pub no_report: bool,

    /// Validate configuration and inputs, then exit without aligning
    #[arg(long)]
    pub dry_run: bool,

    /// Channel buffer size for internal queues
    #[arg(long, default_value = "100", env = "VIDSYNC_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Override metrics server port from configuration (0 = disabled)
    #[arg(long, env = "VIDSYNC_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for the `crop` command
#[derive(Parser, Debug, Clone)]
pub struct CropArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "vidsync.toml", env = "VIDSYNC_CONFIG")]
    pub config: PathBuf,

    /// Override output directory from configuration
    #[arg(long, env = "VIDSYNC_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Extract the clips with ffmpeg in addition to writing the manifest
    #[arg(long)]
    pub extract: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "vidsync.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "vidsync.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Probe the video file (runs ffprobe)
    #[arg(long)]
    pub video: bool,

    /// Scan the motion-log directory
    #[arg(long)]
    pub motion: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
