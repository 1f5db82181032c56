//! Line-scan viewer - Main Entry Point
//!
//! Opens the sensor link, then shows frames in a window, on the terminal, or
//! as plain text records, depending on the display mode.

use anyhow::Context;
use clap::Parser;
use linescan_viewer::{
    cli::Cli,
    config::{DisplayMode, ViewerConfig},
    frontend::ViewerApp,
    render::{ConsoleRenderer, HeadlessRenderer, RenderSink},
    session::{self, Session},
    transport::{describe_port, find_serial_port, list_ports, SerialTransport, Transport},
    ViewerError,
};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const WINDOW_TITLE: &str = "Line-Scan Sensor Viewer";
const DEFAULT_LOG_FILTER: &str = "info,linescan_viewer=debug";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list_ports {
        return print_ports();
    }

    let mut config = ViewerConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(config.display.mode, cli.log_file.as_deref())?;

    tracing::info!(
        "Starting line-scan viewer ({} px, {} mode)",
        config.frame.pixels,
        match config.display.mode {
            DisplayMode::Gui => "gui",
            DisplayMode::Console => "console",
            DisplayMode::Headless => "headless",
        }
    );

    let transport = open_transport(&cli, &config)?;

    match config.display.mode {
        DisplayMode::Gui => {
            if let Err(e) = run_gui(&config, transport) {
                tracing::warn!("GUI unavailable ({}), falling back to console mode", e);
                // The window owned the first transport and closed it on drop
                let transport = open_transport(&cli, &config)?;
                let sink = ConsoleRenderer::new(std::io::stdout(), config.display.console_options());
                run_terminal(&config, transport, sink)?;
            }
        }
        DisplayMode::Console => {
            let sink = ConsoleRenderer::new(std::io::stdout(), config.display.console_options());
            run_terminal(&config, transport, sink)?;
        }
        DisplayMode::Headless => {
            let sink = HeadlessRenderer::new(std::io::stdout(), config.display.headless_format());
            run_terminal(&config, transport, sink)?;
        }
    }

    tracing::info!("Shutting down...");
    Ok(())
}

fn init_logging(mode: DisplayMode, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    if let Some(path) = log_file {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .with_context(|| format!("Log file path {:?} has no file name", path))?;
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

        tracing_subscriber::registry()
            .with(env_filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .init();
        return Ok(Some(guard));
    }

    // The console renderer owns the terminal; only let problems through
    let filter = if mode == DisplayMode::Console {
        EnvFilter::new("warn")
    } else {
        env_filter()
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(None)
}

fn print_ports() -> anyhow::Result<()> {
    let ports = list_ports().context("Failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in &ports {
        println!("{}", describe_port(port));
    }
    Ok(())
}

fn open_transport(cli: &Cli, config: &ViewerConfig) -> anyhow::Result<Box<dyn Transport>> {
    if let Some(mock) = mock_transport(cli, config) {
        return Ok(mock);
    }

    let port = match &config.serial.port {
        Some(port) => port.clone(),
        None => find_serial_port()?,
    };
    let transport = SerialTransport::open(&port, config.serial.baud_rate, config.serial.settle())
        .with_context(|| format!("Cannot open serial port {}", port))?;
    Ok(Box::new(transport))
}

#[cfg(feature = "mock-sensor")]
fn mock_transport(cli: &Cli, config: &ViewerConfig) -> Option<Box<dyn Transport>> {
    use linescan_viewer::transport::MockSensor;

    cli.mock.then(|| {
        tracing::info!("Using synthetic sensor ({} px)", config.frame.pixels);
        Box::new(MockSensor::new(
            config.frame.pixels,
            config.display.tick_interval(),
        )) as Box<dyn Transport>
    })
}

#[cfg(not(feature = "mock-sensor"))]
fn mock_transport(_cli: &Cli, _config: &ViewerConfig) -> Option<Box<dyn Transport>> {
    None
}

fn run_gui(config: &ViewerConfig, transport: Box<dyn Transport>) -> Result<(), ViewerError> {
    let app = ViewerApp::new(
        Session::from_config(config),
        transport,
        config.display.tick_interval(),
    )?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([640.0, 420.0])
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| ViewerError::Gui(e.to_string()))
}

/// Run a terminal sink on a single-threaded runtime until Ctrl+C
fn run_terminal<S: RenderSink>(
    config: &ViewerConfig,
    mut transport: Box<dyn Transport>,
    mut sink: S,
) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let mut session = Session::from_config(config);
    let counters = runtime.block_on(session::run(
        &mut session,
        &mut *transport,
        &mut sink,
        config.display.tick_interval(),
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Cannot listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        },
    ))?;

    eprintln!(
        "Stopped: {} frames accepted, {} lines rejected",
        counters.accepted, counters.rejected
    );
    Ok(())
}
