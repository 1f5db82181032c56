//! Configuration module for the line-scan viewer
//!
//! All settings are fixed when a session starts. They come from, in order of
//! increasing precedence:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config <path>`, or the default file if it exists)
//! 3. Command line overrides
//!
//! # Config Location
//!
//! The default file lives in the platform config directory under
//! `dev.linescan-viewer`:
//!
//! - **Linux**: `~/.config/dev.linescan-viewer/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.linescan-viewer/config.toml`
//! - **Windows**: `%APPDATA%\dev.linescan-viewer\config.toml`
//!
//! # Example
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyACM0"
//! baud_rate = 115200
//!
//! [frame]
//! pixels = 128
//! marker_prefixes = ["Sharpness"]
//!
//! [display]
//! mode = "console"
//! tick_interval_ms = 100
//! render_policy = "on-new-frame"
//! ```

use crate::decoder::{DEFAULT_DELIMITER, DEFAULT_MARKER_PREFIX};
use crate::error::{Result, ViewerError};
use crate::render::{ConsoleOptions, HeadlessFormat};
use crate::session::RenderPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for config directories
pub const APP_ID: &str = "dev.linescan-viewer";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default serial speed
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default samples per frame (TSL1401)
pub const DEFAULT_PIXELS: usize = 128;

/// Default bounded read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

/// Default tick interval in milliseconds
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Get the path of the default config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID).join(CONFIG_FILE))
}

/// How frames are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    /// Plot window
    #[default]
    Gui,
    /// ANSI art in the terminal
    Console,
    /// Text records on stdout
    Headless,
}

/// Serial transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Port path; auto-detected when absent
    pub port: Option<String>,
    /// Baud rate
    pub baud_rate: u32,
    /// Longest a single line read may block, in milliseconds
    pub read_timeout_ms: u64,
    /// Delay after opening before reading, in milliseconds
    pub settle_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            settle_ms: 0,
        }
    }
}

impl SerialConfig {
    /// Read timeout as a Duration
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Settle delay as a Duration
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Frame format settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Samples per frame
    pub pixels: usize,
    /// Field delimiter
    pub delimiter: char,
    /// Lines starting with any of these are not data
    pub marker_prefixes: Vec<String>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            pixels: DEFAULT_PIXELS,
            delimiter: DEFAULT_DELIMITER,
            marker_prefixes: vec![DEFAULT_MARKER_PREFIX.to_string()],
        }
    }
}

/// Presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Which renderer to use
    pub mode: DisplayMode,
    /// Poll interval in milliseconds
    pub tick_interval_ms: u64,
    /// When to re-render
    pub render_policy: RenderPolicy,
    /// Console graph rows
    pub graph_height: usize,
    /// Console heatmap rows
    pub heatmap_rows: usize,
    /// Emit JSON lines in headless mode
    pub json: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let console = ConsoleOptions::default();
        Self {
            mode: DisplayMode::default(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            render_policy: RenderPolicy::default(),
            graph_height: console.graph_height,
            heatmap_rows: console.heatmap_rows,
            json: false,
        }
    }
}

impl DisplayConfig {
    /// Tick interval as a Duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Console layout derived from these settings
    pub fn console_options(&self) -> ConsoleOptions {
        ConsoleOptions {
            graph_height: self.graph_height,
            heatmap_rows: self.heatmap_rows,
            clear_screen: true,
        }
    }

    /// Headless output format
    pub fn headless_format(&self) -> HeadlessFormat {
        if self.json {
            HeadlessFormat::JsonLines
        } else {
            HeadlessFormat::StatsLine
        }
    }
}

/// Complete viewer configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Serial transport
    pub serial: SerialConfig,
    /// Frame format
    pub frame: FrameConfig,
    /// Presentation
    pub display: DisplayConfig,
}

impl ViewerConfig {
    /// Parse a config from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| ViewerError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Serialize to TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ViewerError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ViewerError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        let config = Self::from_toml(&content)
            .map_err(|e| e.with_context(format!("In {:?}", path)))?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load an explicit config file, or the default file if present, or defaults
    ///
    /// An explicit path that cannot be read is an error; a broken default
    /// file is logged and ignored.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Ok(Self::load(&path).unwrap_or_else(|e| {
                tracing::warn!("Ignoring default config: {}", e);
                Self::default()
            })),
            _ => Ok(Self::default()),
        }
    }

    /// Save config to disk as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ViewerError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }
        std::fs::write(path, self.to_toml()?)
            .map_err(|e| ViewerError::Config(format!("Failed to write config: {}", e)))
    }

    /// Check that the settings can drive a session
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(ViewerError::Config(msg.to_string()));

        if self.frame.pixels == 0 {
            return fail("frame.pixels must be at least 1");
        }
        if self.frame.delimiter.is_ascii_digit() || self.frame.delimiter.is_whitespace() {
            return fail("frame.delimiter must not be a digit or whitespace");
        }
        if self.serial.baud_rate == 0 {
            return fail("serial.baud_rate must be positive");
        }
        if self.serial.read_timeout_ms == 0 {
            return fail("serial.read_timeout_ms must be positive");
        }
        if self.display.tick_interval_ms == 0 {
            return fail("display.tick_interval_ms must be positive");
        }
        if self.display.graph_height == 0 {
            return fail("display.graph_height must be at least 1");
        }
        if self.display.heatmap_rows == 0 {
            return fail("display.heatmap_rows must be at least 1");
        }
        Ok(())
    }
}
