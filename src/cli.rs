//! Command line interface
//!
//! Every option here overrides the corresponding config file value.

use crate::config::{DisplayMode, ViewerConfig};
use crate::session::RenderPolicy;
use std::path::PathBuf;

/// Live viewer for line-scan sensors streaming CSV frames over serial
#[derive(Debug, Default, clap::Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Serial port (e.g. COM3, /dev/ttyUSB0, /dev/ttyACM0); auto-detected if omitted
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    pub baudrate: Option<u32>,

    /// Samples per frame
    #[arg(short = 'n', long)]
    pub pixels: Option<usize>,

    /// Display mode
    #[arg(short, long, value_enum)]
    pub mode: Option<DisplayMode>,

    /// Config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Poll interval in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Render only on new frames, or on every tick
    #[arg(long, value_enum)]
    pub render_policy: Option<RenderPolicy>,

    /// Non-data line prefix; repeat to give several (replaces the configured list)
    #[arg(long = "marker", value_name = "PREFIX")]
    pub markers: Vec<String>,

    /// Do not treat any line as a marker
    #[arg(long, conflicts_with = "markers")]
    pub no_markers: bool,

    /// Emit one JSON object per frame (headless mode)
    #[arg(long)]
    pub json: bool,

    /// Write logs to this file instead of the terminal
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// List serial ports and exit
    #[arg(long)]
    pub list_ports: bool,

    /// Use a synthetic sensor instead of a serial port
    #[cfg(feature = "mock-sensor")]
    #[arg(long)]
    pub mock: bool,
}

impl Cli {
    /// Apply command line overrides on top of a loaded config
    pub fn apply(&self, config: &mut ViewerConfig) {
        if let Some(port) = &self.port {
            config.serial.port = Some(port.clone());
        }
        if let Some(baud) = self.baudrate {
            config.serial.baud_rate = baud;
        }
        if let Some(pixels) = self.pixels {
            config.frame.pixels = pixels;
        }
        if let Some(mode) = self.mode {
            config.display.mode = mode;
        }
        if let Some(interval) = self.interval_ms {
            config.display.tick_interval_ms = interval;
        }
        if let Some(policy) = self.render_policy {
            config.display.render_policy = policy;
        }
        if self.no_markers {
            config.frame.marker_prefixes.clear();
        } else if !self.markers.is_empty() {
            config.frame.marker_prefixes = self.markers.clone();
        }
        if self.json {
            config.display.json = true;
        }
    }
}
