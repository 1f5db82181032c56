//! # linescan-viewer: live viewer for line-scan sensors
//!
//! Reads frames from a line-scan sensor (such as a TSL1401 on a
//! microcontroller) that streams one comma-separated line of pixel
//! intensities per frame over a serial link. Lines are validated and decoded
//! into frames, reduced to summary statistics, and handed to a render sink at
//! a fixed cadence. Malformed, partial and non-data lines are dropped without
//! disturbing the frame on screen.
//!
//! ## Architecture
//!
//! - **Transport**: Line-oriented byte source ([`transport::Transport`]); serial
//!   port via tokio-serial, scripted source for tests, synthetic sensor
//!   behind the `mock-sensor` feature
//! - **Decoder**: Line validation and frame decoding ([`decoder::FrameDecoder`])
//! - **Session**: Awaiting/streaming state machine driven one tick at a time
//!   ([`session::Session`]), with a tokio timer loop in [`session::run`]
//! - **Render**: Console, headless and GUI sinks ([`render::RenderSink`])
//!
//! ## Configuration
//!
//! Settings are read from `config.toml` under the platform config directory
//! (`dev.linescan-viewer`), then overridden by command line flags.
//!
//! ## Example
//!
//! ```
//! use linescan_viewer::{FrameDecoder, Rejection};
//!
//! let decoder = FrameDecoder::new(4);
//! let frame = decoder.try_decode(b"0,255,128,128,77\r\n").unwrap();
//! assert_eq!(frame.samples(), &[0, 255, 128, 128]);
//!
//! let stats = frame.stats();
//! assert_eq!(stats.range(), 255);
//!
//! assert_eq!(
//!     decoder.try_decode(b"Sharpness,42"),
//!     Err(Rejection::Marker)
//! );
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod decoder;
pub mod error;
pub mod frontend;
pub mod render;
pub mod session;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use config::ViewerConfig;
pub use decoder::{FrameDecoder, Rejection};
pub use error::{Result, ViewerError};
pub use render::RenderSink;
pub use session::{RenderPolicy, Session, SessionCounters};
pub use transport::Transport;
pub use types::{Frame, FrameStats, SessionState};
