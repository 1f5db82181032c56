//! Non-data line filters
//!
//! Sensor firmware often interleaves header or diagnostic lines (for example
//! a `Sharpness,...` line) with the sample stream. A [`LineFilter`] decides
//! which lines are such markers before any tokenizing happens.

/// Default marker prefix emitted by the reference TSL1401 firmware
pub const DEFAULT_MARKER_PREFIX: &str = "Sharpness";

/// Policy hook deciding whether a decoded text line is a non-data marker
pub trait LineFilter: Send {
    /// Return true if `line` (already whitespace-trimmed) must be rejected
    fn is_marker(&self, line: &str) -> bool;
}

impl<F> LineFilter for F
where
    F: Fn(&str) -> bool + Send,
{
    fn is_marker(&self, line: &str) -> bool {
        self(line)
    }
}

/// Rejects lines starting with any of a list of prefixes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixFilter {
    prefixes: Vec<String>,
}

impl PrefixFilter {
    /// Create a filter from a list of prefixes
    ///
    /// Empty prefixes are ignored; they would otherwise match every line.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// A filter that lets every line through
    pub fn none() -> Self {
        Self::default()
    }

    /// The configured prefixes
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl LineFilter for PrefixFilter {
    fn is_marker(&self, line: &str) -> bool {
        self.prefixes.iter().any(|p| line.starts_with(p.as_str()))
    }
}
