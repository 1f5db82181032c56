//! Frame decoder
//!
//! Turns one raw line from the transport into a validated [`Frame`] or a
//! [`Rejection`]. The decoder is a pure function of its input: it does not
//! log, keep counters or touch any shared state. Callers (the
//! [`Session`](crate::session::Session)) do the bookkeeping.
//!
//! # Wire format
//!
//! ASCII text, one frame per line, samples separated by a delimiter (comma by
//! default):
//!
//! ```text
//! 12,15,18,240,251,...,9
//! ```
//!
//! # Decode steps
//!
//! 1. Bytes that are not valid UTF-8 reject the line.
//! 2. A line matching the [`LineFilter`] (e.g. a `Sharpness,...` header) is rejected.
//! 3. The line is split on the delimiter.
//! 4. Each token is trimmed and counts as valid only if it is a non-empty run
//!    of ASCII digits. Anything else (`-3`, `1.5`, `abc`, empty) is dropped,
//!    not coerced.
//! 5. A valid token among the first `expected` that does not fit a [`Sample`]
//!    rejects the whole line, so no later pixel shifts into its place.
//! 6. Fewer valid tokens than expected rejects the line. Otherwise the first
//!    `expected` tokens, in order, form the frame; trailing extras (checksums,
//!    metadata) are ignored.
//!
//! # Example
//!
//! ```
//! use linescan_viewer::decoder::FrameDecoder;
//!
//! let decoder = FrameDecoder::new(3);
//! let frame = decoder.try_decode(b"10,20,30,999\r\n").unwrap();
//! assert_eq!(frame.samples(), &[10, 20, 30]);
//! assert!(decoder.try_decode(b"10,,x,20").is_err());
//! ```

pub mod filter;

pub use filter::{LineFilter, PrefixFilter, DEFAULT_MARKER_PREFIX};

use crate::types::{Frame, Sample};
use thiserror::Error;

/// Default field delimiter
pub const DEFAULT_DELIMITER: char = ',';

/// Why a line did not produce a frame
///
/// Rejections carry no partial sample data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The bytes were not valid UTF-8 text
    #[error("line is not valid text")]
    NotText,

    /// The line is a known non-data marker
    #[error("non-data marker line")]
    Marker,

    /// Not enough numeric tokens to fill a frame
    #[error("insufficient samples: found {found}, expected {expected}")]
    InsufficientSamples { found: usize, expected: usize },

    /// A sample token is all digits but too large for a sample
    #[error("sample {index} is too large")]
    SampleOverflow { index: usize },

    /// The transport returned bytes without a line terminator
    #[error("incomplete line ({bytes} bytes before timeout)")]
    Incomplete { bytes: usize },
}

/// Decodes delimiter-separated sample lines into fixed-length frames
pub struct FrameDecoder {
    expected: usize,
    delimiter: char,
    filter: Box<dyn LineFilter>,
}

impl std::fmt::Debug for FrameDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDecoder")
            .field("expected", &self.expected)
            .field("delimiter", &self.delimiter)
            .finish_non_exhaustive()
    }
}

impl FrameDecoder {
    /// Create a decoder for `expected` samples per frame with the default
    /// delimiter and marker filter
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            delimiter: DEFAULT_DELIMITER,
            filter: Box::new(PrefixFilter::new([DEFAULT_MARKER_PREFIX])),
        }
    }

    /// Use a different field delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Replace the marker filter
    pub fn with_filter(mut self, filter: impl LineFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    /// Number of samples in every accepted frame
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Attempt to decode one raw line
    ///
    /// Line terminators and surrounding whitespace are ignored.
    pub fn try_decode(&self, raw: &[u8]) -> Result<Frame, Rejection> {
        let text = std::str::from_utf8(raw).map_err(|_| Rejection::NotText)?;
        let line = text.trim();

        if self.filter.is_marker(line) {
            return Err(Rejection::Marker);
        }

        let mut samples = Vec::with_capacity(self.expected);
        let mut found = 0;
        for digits in line.split(self.delimiter).filter_map(digit_token) {
            if found < self.expected {
                let value = digits
                    .parse()
                    .map_err(|_| Rejection::SampleOverflow { index: found })?;
                samples.push(value);
            }
            found += 1;
        }

        if found < self.expected {
            return Err(Rejection::InsufficientSamples {
                found,
                expected: self.expected,
            });
        }

        Ok(Frame::new(samples))
    }
}

/// Trimmed token if it is a plain unsigned integer
fn digit_token(token: &str) -> Option<&str> {
    let token = token.trim();
    (!token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())).then_some(token)
}
