//! Integration tests for configuration
//!
//! These tests validate the path from a config file to a running session:
//! - Partial files fall back to defaults
//! - Command line flags override file values
//! - The frame section drives the decoder

mod common;

use clap::Parser;
use linescan_viewer::cli::Cli;
use linescan_viewer::config::{DisplayMode, ViewerConfig};
use linescan_viewer::render::RecordingSink;
use linescan_viewer::session::{RenderPolicy, Session, TickOutcome};
use linescan_viewer::transport::ScriptedTransport;
use linescan_viewer::Rejection;
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn test_partial_file_uses_defaults() {
    let file = config_file(
        r#"
[serial]
port = "/dev/ttyUSB3"
"#,
    );
    let config = ViewerConfig::load_or_default(Some(file.path())).unwrap();

    assert_eq!(config.serial.port.as_deref(), Some("/dev/ttyUSB3"));
    assert_eq!(config.serial.baud_rate, 115_200);
    assert_eq!(config.frame.pixels, 128);
    assert_eq!(config.display.mode, DisplayMode::Gui);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_explicit_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(ViewerConfig::load_or_default(Some(&missing)).is_err());
}

#[test]
fn test_cli_overrides_file() {
    let file = config_file(
        r#"
[serial]
baud_rate = 9600

[display]
mode = "headless"
render_policy = "every-tick"
"#,
    );
    let mut config = ViewerConfig::load_or_default(Some(file.path())).unwrap();
    let cli = Cli::parse_from(["linescan-viewer", "-b", "230400", "-m", "console"]);
    cli.apply(&mut config);

    assert_eq!(config.serial.baud_rate, 230_400);
    assert_eq!(config.display.mode, DisplayMode::Console);
    assert_eq!(config.display.render_policy, RenderPolicy::EveryTick);
}

#[test]
fn test_frame_section_drives_decoder() {
    let file = config_file(
        r#"
[frame]
pixels = 3
delimiter = ";"
marker_prefixes = ["DBG"]
"#,
    );
    let config = ViewerConfig::load_or_default(Some(file.path())).unwrap();
    let mut session = Session::from_config(&config);
    let mut transport = ScriptedTransport::from_lines(["DBG;1;2;3", "Sharpness;1;2;3", "4,5,6"]);
    let mut sink = RecordingSink::default();

    assert_eq!(
        session.tick(&mut transport, &mut sink).unwrap(),
        TickOutcome::Rejected(Rejection::Marker)
    );
    assert_eq!(session.tick(&mut transport, &mut sink).unwrap(), TickOutcome::Accepted);
    assert_eq!(session.state().frame().unwrap().samples(), &[1, 2, 3]);
    assert_eq!(
        session.tick(&mut transport, &mut sink).unwrap(),
        TickOutcome::Rejected(Rejection::InsufficientSamples {
            found: 0,
            expected: 3
        })
    );
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = ViewerConfig::default();
    config.frame.pixels = 256;
    config.display.json = true;
    config.save(&path).unwrap();

    let loaded = ViewerConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_invalid_values_rejected() {
    let file = config_file("[frame]\npixels = 0\n");
    let config = ViewerConfig::load_or_default(Some(file.path())).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_example_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.toml");
    let config = ViewerConfig::load(path).unwrap();
    assert_eq!(config, ViewerConfig::default());
}
