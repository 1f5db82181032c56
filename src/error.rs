//! Error handling for the line-scan viewer
//!
//! This module defines the crate error type and a Result alias. Per-line
//! decode failures are not errors; they are reported as
//! [`Rejection`](crate::decoder::Rejection) values by the decoder. Only
//! conditions that end a session (or stop it from starting) surface here.

use thiserror::Error;

/// Main error type for viewer operations
#[derive(Error, Debug)]
pub enum ViewerError {
    /// The transport could not be opened, so the session never started
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// The transport went away while the session was running
    #[error("Transport disconnected: {0}")]
    Disconnected(String),

    /// Errors from the serial port layer
    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// Errors related to configuration loading/validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// A render sink failed to present a frame
    #[error("Render error: {0}")]
    Render(String),

    /// The GUI window could not be created or crashed
    #[error("GUI error: {0}")]
    Gui(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ViewerError>,
    },
}

impl ViewerError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ViewerError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error means the transport is gone for good
    pub fn is_disconnect(&self) -> bool {
        match self {
            ViewerError::Disconnected(_) => true,
            ViewerError::WithContext { source, .. } => source.is_disconnect(),
            _ => false,
        }
    }
}

/// Result type alias for viewer operations
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ViewerError::Io(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| ViewerError::Io(e).with_context(f()))
    }
}
