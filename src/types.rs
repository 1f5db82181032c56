//! Core data types for the line-scan viewer
//!
//! - [`Frame`] - One fixed-length scan of sensor samples
//! - [`FrameStats`] - Summary statistics handed to render sinks with each frame
//! - [`SessionState`] - Whether a session has produced a frame yet

use crate::analysis::stats;
use serde::{Deserialize, Serialize};

/// A single sensor sample
///
/// The sensor reports 8-bit intensities, but the decoder does not clamp:
/// any all-digit token that fits is kept as-is. Use [`Frame::display_value`]
/// when a value has to be squeezed into the 0..=255 display range.
pub type Sample = u32;

/// Upper bound of the sensor's intensity range, used for display scaling
pub const MAX_INTENSITY: Sample = 255;

/// One scan worth of samples
///
/// A frame produced by the decoder always has exactly the configured number
/// of samples; there is no way to build a shorter "partial" frame from a
/// line that was missing data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    samples: Vec<Sample>,
}

impl Frame {
    /// Create a frame from already validated samples
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Samples in pixel order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples (pixels)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the frame has no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at `index`, clamped to the display range
    pub fn display_value(&self, index: usize) -> u8 {
        self.samples
            .get(index)
            .map(|&v| v.min(MAX_INTENSITY) as u8)
            .unwrap_or(0)
    }

    /// Compute summary statistics over this frame
    pub fn stats(&self) -> FrameStats {
        stats::compute(&self.samples)
    }

    /// Consume the frame, returning its samples
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

/// Summary statistics over one frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameStats {
    /// Smallest sample
    pub min: Sample,
    /// Largest sample
    pub max: Sample,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub stddev: f64,
}

impl FrameStats {
    /// Spread between the brightest and darkest pixel
    pub fn range(&self) -> Sample {
        self.max - self.min
    }
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Min: {}  Max: {}  Mean: {:.1}  Std: {:.1}",
            self.min, self.max, self.mean, self.stddev
        )
    }
}

/// Session state machine
///
/// A session starts in `AwaitingFirstFrame` and moves to `Streaming` on the
/// first accepted frame. There is no way back: rejected lines leave the held
/// frame untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// No frame has been accepted yet
    #[default]
    AwaitingFirstFrame,
    /// At least one frame has been accepted; holds the most recent one
    Streaming {
        /// Last known good frame
        frame: Frame,
        /// Statistics of `frame`
        stats: FrameStats,
    },
}

impl SessionState {
    /// The held frame, if any
    pub fn frame(&self) -> Option<&Frame> {
        match self {
            SessionState::AwaitingFirstFrame => None,
            SessionState::Streaming { frame, .. } => Some(frame),
        }
    }

    /// Statistics of the held frame, if any
    pub fn stats(&self) -> Option<&FrameStats> {
        match self {
            SessionState::AwaitingFirstFrame => None,
            SessionState::Streaming { stats, .. } => Some(stats),
        }
    }

    /// Whether at least one frame has been accepted
    pub fn is_streaming(&self) -> bool {
        matches!(self, SessionState::Streaming { .. })
    }

    /// Short name for logs and status lines
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::AwaitingFirstFrame => "AwaitingFirstFrame",
            SessionState::Streaming { .. } => "Streaming",
        }
    }
}
