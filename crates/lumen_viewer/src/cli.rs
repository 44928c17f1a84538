use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Headless Lumen host: traces the demo room progressively and writes a PNG.
#[derive(Debug, Parser)]
#[command(name = "lumen_viewer")]
#[command(about = "Progressive ray tracer for a small object scene")]
pub struct Args {
    /// JSON settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,

    /// Image width in pixels
    #[arg(long, default_value = "512")]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "512")]
    pub height: u32,

    /// Number of progressive passes (overrides the settings file)
    #[arg(short, long)]
    pub passes: Option<u32>,

    /// Stop after this many seconds even if passes remain
    #[arg(long)]
    pub time_limit: Option<f64>,

    /// OBJ model to use in place of the octahedron
    #[arg(long)]
    pub obj: Option<PathBuf>,

    /// Image for the floor in place of the checkerboard
    #[arg(long)]
    pub texture: Option<PathBuf>,

    /// Write linear radiance instead of gamma-encoded values
    #[arg(long)]
    pub linear: bool,

    /// Trace with an orthographic camera
    #[arg(long)]
    pub orthographic: bool,

    /// Seconds of held forward motion to apply before tracing
    #[arg(long, default_value = "0")]
    pub walk: f64,

    #[arg(long, default_value = "0")]
    pub seed: u64,

    #[arg(short, long, default_value = "lumen.png")]
    pub output: PathBuf,
}
