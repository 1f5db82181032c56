//! Scripted transport
//!
//! Plays back a fixed sequence of reads. Each call to
//! [`Transport::read_line`] consumes one step; idle steps make
//! [`Transport::bytes_available`] report false for one poll. Used to drive
//! sessions deterministically without hardware.

use super::{LineRead, Transport, TransportError};
use std::collections::VecDeque;
use std::time::Duration;

/// One scripted transport event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// A complete line
    Line(Vec<u8>),
    /// An unterminated read cut off by the timeout
    Partial(Vec<u8>),
    /// Bytes were reported available but the read timed out empty
    Timeout,
    /// No bytes available on this poll
    Idle,
    /// A transient read error
    ReadError(String),
    /// The device goes away; every later call also fails
    Disconnect,
}

impl ScriptStep {
    /// Convenience constructor for a text line
    pub fn line(text: impl AsRef<str>) -> Self {
        ScriptStep::Line(text.as_ref().as_bytes().to_vec())
    }
}

/// Transport replaying a list of [`ScriptStep`]s
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    steps: VecDeque<ScriptStep>,
    name: String,
    disconnected: bool,
    closed: bool,
    close_calls: usize,
    reads: usize,
}

impl ScriptedTransport {
    /// Create a transport from a list of steps
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            name: "scripted".to_string(),
            ..Default::default()
        }
    }

    /// Build a transport that delivers each text line in order
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(lines.into_iter().map(ScriptStep::line))
    }

    /// Append a step to the end of the script
    pub fn push(&mut self, step: ScriptStep) {
        self.steps.push_back(step);
    }

    /// Set the name reported by [`Transport::describe`]
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Steps not yet consumed
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    /// Whether [`Transport::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// How many times [`Transport::close`] has been called
    pub fn close_calls(&self) -> usize {
        self.close_calls
    }

    /// Number of `read_line` calls made so far
    pub fn reads(&self) -> usize {
        self.reads
    }

    fn check_open(&self) -> Result<(), TransportError> {
        if self.disconnected {
            return Err(TransportError::Disconnected(format!("{} disconnected", self.name)));
        }
        if self.closed {
            return Err(TransportError::Disconnected(format!("{} closed", self.name)));
        }
        Ok(())
    }
}

impl Transport for ScriptedTransport {
    fn bytes_available(&mut self) -> Result<bool, TransportError> {
        self.check_open()?;
        match self.steps.front() {
            None => Ok(false),
            Some(ScriptStep::Idle) => {
                self.steps.pop_front();
                Ok(false)
            }
            Some(ScriptStep::Disconnect) => {
                self.steps.pop_front();
                self.disconnected = true;
                self.check_open().map(|_| false)
            }
            Some(_) => Ok(true),
        }
    }

    fn read_line(&mut self, _timeout: Duration) -> Result<LineRead, TransportError> {
        self.check_open()?;
        self.reads += 1;
        match self.steps.pop_front() {
            None | Some(ScriptStep::Idle) | Some(ScriptStep::Timeout) => Ok(LineRead::Timeout),
            Some(ScriptStep::Line(bytes)) => Ok(LineRead::Line(bytes)),
            Some(ScriptStep::Partial(bytes)) => Ok(LineRead::Partial(bytes)),
            Some(ScriptStep::ReadError(msg)) => Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                msg,
            ))),
            Some(ScriptStep::Disconnect) => {
                self.disconnected = true;
                self.check_open().map(|_| LineRead::Timeout)
            }
        }
    }

    fn close(&mut self) {
        self.closed = true;
        self.close_calls += 1;
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Duration = Duration::from_millis(10);

    #[test]
    fn test_lines_in_order() {
        let mut t = ScriptedTransport::from_lines(["1,2", "3,4"]);
        assert!(t.bytes_available().unwrap());
        assert_eq!(t.read_line(T).unwrap(), LineRead::Line(b"1,2".to_vec()));
        assert_eq!(t.read_line(T).unwrap(), LineRead::Line(b"3,4".to_vec()));
        assert!(!t.bytes_available().unwrap());
        assert_eq!(t.reads(), 2);
    }

    #[test]
    fn test_idle_consumes_one_poll() {
        let mut t = ScriptedTransport::new([ScriptStep::Idle, ScriptStep::line("5")]);
        assert!(!t.bytes_available().unwrap());
        assert!(t.bytes_available().unwrap());
        assert_eq!(t.remaining(), 1);
    }

    #[test]
    fn test_disconnect_is_sticky() {
        let mut t = ScriptedTransport::new([ScriptStep::Disconnect, ScriptStep::line("5")]);
        assert!(t.bytes_available().unwrap_err().is_fatal());
        assert!(t.read_line(T).unwrap_err().is_fatal());
    }

    #[test]
    fn test_read_error_is_transient() {
        let mut t = ScriptedTransport::new([ScriptStep::ReadError("noise".into()), ScriptStep::line("1")]);
        assert!(!t.read_line(T).unwrap_err().is_fatal());
        assert_eq!(t.read_line(T).unwrap(), LineRead::Line(b"1".to_vec()));
    }

    #[test]
    fn test_close_tracking() {
        let mut t = ScriptedTransport::default();
        assert!(!t.is_closed());
        t.close();
        t.close();
        assert!(t.is_closed());
        assert_eq!(t.close_calls(), 2);
        assert!(t.bytes_available().is_err());
    }
}
