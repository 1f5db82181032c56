//! Acquisition session
//!
//! A [`Session`] owns the decoder, the last known good frame and the
//! accept/reject counters. It is driven one tick at a time: each tick asks the
//! transport for at most one line, decodes it, and hands the result to a
//! [`RenderSink`] according to the session's [`RenderPolicy`].
//!
//! # States
//!
//! ```text
//! AwaitingFirstFrame --(first accepted frame)--> Streaming
//! Streaming --(accepted frame)--> Streaming (frame replaced)
//! Streaming --(rejected / idle / read error)--> Streaming (frame kept)
//! ```
//!
//! # Failure handling
//!
//! - Malformed lines are counted as rejections; they never fail a tick.
//! - Transient read errors are counted and logged; the tick is skipped.
//! - A disconnected transport, or a long run of consecutive read errors,
//!   fails the tick with [`ViewerError::Disconnected`] and ends the session.
//!
//! The async loop that drives ticks on a timer lives in [`runner`].

pub mod runner;

pub use runner::run;

use crate::config::ViewerConfig;
use crate::decoder::{FrameDecoder, PrefixFilter, Rejection};
use crate::error::{Result, ResultExt, ViewerError};
use crate::render::RenderSink;
use crate::transport::{LineRead, Transport, TransportError};
use crate::types::SessionState;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Consecutive transient read errors tolerated before the transport is
/// considered lost
pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 50;

/// When the render sink is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RenderPolicy {
    /// Render only when a new frame was accepted on this tick
    #[default]
    OnNewFrame,
    /// Render on every tick, repeating the held frame (or the waiting state)
    EveryTick,
}

impl RenderPolicy {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            RenderPolicy::OnNewFrame => "on-new-frame",
            RenderPolicy::EveryTick => "every-tick",
        }
    }
}

/// Monotonic session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounters {
    /// Ticks processed
    pub ticks: u64,
    /// Frames accepted
    pub accepted: u64,
    /// Lines rejected (malformed, marker, incomplete)
    pub rejected: u64,
    /// Transient transport read errors
    pub read_errors: u64,
    /// Ticks with nothing to read
    pub idle_ticks: u64,
}

impl SessionCounters {
    /// Fraction of read lines that produced a frame, as a percentage
    pub fn acceptance_rate(&self) -> f64 {
        let total = self.accepted + self.rejected;
        if total == 0 {
            100.0
        } else {
            (self.accepted as f64 / total as f64) * 100.0
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No bytes were waiting
    Idle,
    /// Bytes were reported but nothing arrived before the read timeout
    Timeout,
    /// A new frame replaced the held one
    Accepted,
    /// A line was read and rejected
    Rejected(Rejection),
    /// A transient transport error; the tick was skipped
    ReadError,
}

/// Acquisition session state plus the decoder that feeds it
#[derive(Debug)]
pub struct Session {
    decoder: FrameDecoder,
    state: SessionState,
    counters: SessionCounters,
    policy: RenderPolicy,
    read_timeout: Duration,
    consecutive_errors: u32,
    max_consecutive_errors: u32,
}

impl Session {
    /// Create a session around a decoder
    pub fn new(decoder: FrameDecoder, read_timeout: Duration) -> Self {
        Self {
            decoder,
            state: SessionState::AwaitingFirstFrame,
            counters: SessionCounters::default(),
            policy: RenderPolicy::default(),
            read_timeout,
            consecutive_errors: 0,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
        }
    }

    /// Build a session from the viewer configuration
    pub fn from_config(config: &ViewerConfig) -> Self {
        let decoder = FrameDecoder::new(config.frame.pixels)
            .with_delimiter(config.frame.delimiter)
            .with_filter(PrefixFilter::new(config.frame.marker_prefixes.iter().cloned()));
        Self::new(decoder, config.serial.read_timeout())
            .with_render_policy(config.display.render_policy)
    }

    /// Set the render policy
    pub fn with_render_policy(mut self, policy: RenderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set how many consecutive read errors end the session (0 = never)
    pub fn with_max_consecutive_errors(mut self, max: u32) -> Self {
        self.max_consecutive_errors = max;
        self
    }

    /// Current state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current counters
    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    /// Render policy in effect
    pub fn render_policy(&self) -> RenderPolicy {
        self.policy
    }

    /// Samples per frame
    pub fn pixels(&self) -> usize {
        self.decoder.expected()
    }

    /// Show the initial "no data" state on a sink
    pub fn start<S: RenderSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        tracing::info!(
            "Session started: {} px, read timeout {:?}, render policy {}",
            self.decoder.expected(),
            self.read_timeout,
            self.policy.display_name()
        );
        self.present(&TickOutcome::Idle, sink, true)
    }

    /// Decode one raw line and update the session state
    ///
    /// On success the held frame is replaced; on rejection the state is left
    /// untouched and only the rejection counter moves.
    pub fn accept_line(&mut self, raw: &[u8]) -> std::result::Result<(), Rejection> {
        match self.decoder.try_decode(raw) {
            Ok(frame) => {
                let stats = frame.stats();
                if !self.state.is_streaming() {
                    tracing::info!("First frame received, streaming ({} px)", frame.len());
                }
                self.state = SessionState::Streaming { frame, stats };
                self.counters.accepted += 1;
                Ok(())
            }
            Err(rejection) => {
                self.reject(rejection.clone());
                Err(rejection)
            }
        }
    }

    fn reject(&mut self, rejection: Rejection) {
        tracing::trace!("Line rejected: {}", rejection);
        self.counters.rejected += 1;
    }

    /// Run one poll of the transport
    ///
    /// Returns an error only when the session cannot continue: the transport
    /// disconnected, or the render sink failed.
    pub fn tick<T, S>(&mut self, transport: &mut T, sink: &mut S) -> Result<TickOutcome>
    where
        T: Transport + ?Sized,
        S: RenderSink + ?Sized,
    {
        self.counters.ticks += 1;

        let outcome = match transport.bytes_available() {
            Ok(false) => TickOutcome::Idle,
            Ok(true) => match transport.read_line(self.read_timeout) {
                Ok(LineRead::Line(bytes)) => match self.accept_line(&bytes) {
                    Ok(()) => TickOutcome::Accepted,
                    Err(rejection) => TickOutcome::Rejected(rejection),
                },
                Ok(LineRead::Partial(bytes)) => {
                    let rejection = Rejection::Incomplete { bytes: bytes.len() };
                    self.reject(rejection.clone());
                    TickOutcome::Rejected(rejection)
                }
                Ok(LineRead::Timeout) => TickOutcome::Timeout,
                Err(e) => self.transport_error(e, &transport.describe())?,
            },
            Err(e) => self.transport_error(e, &transport.describe())?,
        };

        if outcome != TickOutcome::ReadError {
            self.consecutive_errors = 0;
        }
        if matches!(outcome, TickOutcome::Idle | TickOutcome::Timeout) {
            self.counters.idle_ticks += 1;
        }

        self.present(&outcome, sink, false)?;
        Ok(outcome)
    }

    fn transport_error(&mut self, err: TransportError, name: &str) -> Result<TickOutcome> {
        if err.is_fatal() {
            tracing::error!("{}: {}", name, err);
            return Err(ViewerError::Disconnected(err.to_string()));
        }

        self.counters.read_errors += 1;
        self.consecutive_errors += 1;
        tracing::warn!("{}: {} (tick skipped)", name, err);

        if self.max_consecutive_errors > 0 && self.consecutive_errors >= self.max_consecutive_errors {
            return Err(ViewerError::Disconnected(format!(
                "{} consecutive read errors, last: {}",
                self.consecutive_errors, err
            )));
        }
        Ok(TickOutcome::ReadError)
    }

    fn present<S: RenderSink + ?Sized>(
        &self,
        outcome: &TickOutcome,
        sink: &mut S,
        force: bool,
    ) -> Result<()> {
        let render = force
            || *outcome == TickOutcome::Accepted
            || self.policy == RenderPolicy::EveryTick;
        if !render {
            return Ok(());
        }

        match &self.state {
            SessionState::Streaming { frame, stats } => sink
                .render(frame, stats, &self.counters)
                .context("Failed to render frame"),
            SessionState::AwaitingFirstFrame => sink
                .waiting(&self.counters)
                .context("Failed to render waiting state"),
        }
    }
}
