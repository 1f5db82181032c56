//! Render sinks
//!
//! A [`RenderSink`] receives the held frame with its statistics whenever the
//! session decides to render, and the "waiting for data" state before the
//! first frame. Presentation is entirely up to the sink.
//!
//! # Implementations
//!
//! - [`ConsoleRenderer`] - ANSI-art column graph and heatmap on a terminal
//! - [`HeadlessRenderer`] - One stats line or JSON object per frame
//! - [`RecordingSink`] - Keeps everything it is given (tests)
//! - The GUI window in [`crate::frontend`]

pub mod console;
pub mod headless;

pub use console::{ConsoleOptions, ConsoleRenderer};
pub use headless::{HeadlessFormat, HeadlessRenderer};

use crate::error::{Result, ViewerError};
use crate::session::SessionCounters;
use crate::types::{Frame, FrameStats};

/// Consumer of decoded frames
pub trait RenderSink {
    /// Present a frame and its statistics
    fn render(
        &mut self,
        frame: &Frame,
        stats: &FrameStats,
        counters: &SessionCounters,
    ) -> Result<()>;

    /// Present the "no frame yet" state
    fn waiting(&mut self, _counters: &SessionCounters) -> Result<()> {
        Ok(())
    }
}

impl<S: RenderSink + ?Sized> RenderSink for Box<S> {
    fn render(
        &mut self,
        frame: &Frame,
        stats: &FrameStats,
        counters: &SessionCounters,
    ) -> Result<()> {
        (**self).render(frame, stats, counters)
    }

    fn waiting(&mut self, counters: &SessionCounters) -> Result<()> {
        (**self).waiting(counters)
    }
}

/// Sink that records every call
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Rendered frames with their statistics, in order
    pub frames: Vec<(Frame, FrameStats)>,
    /// Number of `waiting` calls
    pub waiting_calls: usize,
    /// Counters seen on the most recent call
    pub last_counters: Option<SessionCounters>,
    fail: bool,
}

impl RecordingSink {
    /// A sink whose every call fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Total number of calls received
    pub fn calls(&self) -> usize {
        self.frames.len() + self.waiting_calls
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            Err(ViewerError::Render("recording sink set to fail".to_string()))
        } else {
            Ok(())
        }
    }
}

impl RenderSink for RecordingSink {
    fn render(
        &mut self,
        frame: &Frame,
        stats: &FrameStats,
        counters: &SessionCounters,
    ) -> Result<()> {
        self.check()?;
        self.frames.push((frame.clone(), *stats));
        self.last_counters = Some(*counters);
        Ok(())
    }

    fn waiting(&mut self, counters: &SessionCounters) -> Result<()> {
        self.check()?;
        self.waiting_calls += 1;
        self.last_counters = Some(*counters);
        Ok(())
    }
}
