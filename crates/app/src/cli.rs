//! Command-line arguments.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use stage_resources::{MediaCapture, SyntheticCapture, UnsupportedCapture};

#[derive(Debug, Parser)]
#[command(name = "stage")]
#[command(about = "Run small animated 3D demos in a window or headless", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Demo to run (see --list)
    #[arg(short, long)]
    pub demo: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Render off-screen and write a PNG snapshot instead of opening a window
    #[arg(long)]
    pub headless: bool,

    /// Frames to run in headless mode
    #[arg(long, default_value = "60")]
    pub frames: u32,

    /// Surface size as WIDTHxHEIGHT (defaults to the configured window size)
    #[arg(long, value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Snapshot path (headless output, or the S key in a window)
    #[arg(short, long, default_value = "stage.png")]
    pub out: PathBuf,

    /// Capture device behind the video demo
    #[arg(long, value_enum, default_value_t = CaptureKind::Synthetic)]
    pub capture: CaptureKind,

    /// Print the available demos and exit
    #[arg(long)]
    pub list: bool,
}

/// Which media-capture collaborator to install.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CaptureKind {
    /// Moving color bars
    Synthetic,
    /// No media devices
    None,
}

impl CaptureKind {
    pub fn device(self) -> Arc<dyn MediaCapture> {
        match self {
            CaptureKind::Synthetic => Arc::new(SyntheticCapture),
            CaptureKind::None => Arc::new(UnsupportedCapture),
        }
    }
}

/// Parse `WIDTHxHEIGHT` with both dimensions non-zero.
pub fn parse_size(text: &str) -> Result<(u32, u32), String> {
    let (width, height) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{text}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid dimension '{part}': {e}"))
    };
    let (width, height) = (parse(width)?, parse(height)?);
    if width == 0 || height == 0 {
        return Err(format!("size must be non-zero, got {width}x{height}"));
    }
    Ok((width, height))
}
