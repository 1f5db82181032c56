//! Transport boundary
//!
//! The session only needs three things from a byte source: whether unread
//! bytes are waiting, a line read with a bounded timeout, and a way to
//! release the device. This module defines that contract as the
//! [`Transport`] trait so the session can run against real hardware, the
//! scripted transport used in tests, or the synthetic mock sensor.
//!
//! # Components
//!
//! - [`SerialTransport`] - Serial port via `tokio-serial`
//! - [`ScriptedTransport`] - Replays a fixed list of reads (tests, demos)
//! - [`MockSensor`] - Synthetic line-scan sensor (feature-gated)

#[cfg(feature = "mock-sensor")]
pub mod mock_sensor;
pub mod scripted;
pub mod serial;

#[cfg(feature = "mock-sensor")]
pub use mock_sensor::MockSensor;
pub use scripted::{ScriptStep, ScriptedTransport};
pub use serial::{describe_port, find_serial_port, list_ports, SerialTransport, MAX_LINE_BYTES};

use std::time::Duration;
use thiserror::Error;

/// Result of one bounded line read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    /// A complete line, terminator stripped
    Line(Vec<u8>),
    /// Bytes arrived but the terminator did not before the timeout
    Partial(Vec<u8>),
    /// Nothing arrived before the timeout
    Timeout,
}

/// Errors raised by a transport
#[derive(Error, Debug)]
pub enum TransportError {
    /// The device is gone (unplugged, closed, EOF); the session cannot continue
    #[error("device disconnected: {0}")]
    Disconnected(String),

    /// A read failed but the device may still be usable
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Whether this error ends the session
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransportError::Disconnected(_))
    }
}

/// A line-oriented byte source
///
/// Implementations must never block longer than the timeout passed to
/// [`Transport::read_line`], so a session tick always completes in bounded time.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Whether unread bytes are waiting
    fn bytes_available(&mut self) -> Result<bool, TransportError>;

    /// Read up to and including the next line terminator, waiting at most `timeout`
    fn read_line(&mut self, timeout: Duration) -> Result<LineRead, TransportError>;

    /// Release the underlying device. Calling it more than once is harmless.
    fn close(&mut self);

    /// Human readable name for logs and status lines
    fn describe(&self) -> String {
        "transport".to_string()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn bytes_available(&mut self) -> Result<bool, TransportError> {
        (**self).bytes_available()
    }

    fn read_line(&mut self, timeout: Duration) -> Result<LineRead, TransportError> {
        (**self).read_line(timeout)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
