//! Test data builders for sensor lines

use linescan_viewer::types::Sample;

/// Builder for raw sensor lines as the firmware would print them
pub struct LineBuilder {
    samples: Vec<Sample>,
    trailing: Vec<String>,
    delimiter: char,
    terminator: &'static str,
}

impl LineBuilder {
    pub fn new(samples: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            trailing: Vec::new(),
            delimiter: ',',
            terminator: "",
        }
    }

    /// A ramp `0, step, 2*step, ...` of `pixels` samples
    pub fn ramp(pixels: usize, step: Sample) -> Self {
        Self::new((0..pixels as Sample).map(|i| i * step))
    }

    /// Append an extra token after the samples (e.g. a checksum)
    pub fn trailing(mut self, token: impl Into<String>) -> Self {
        self.trailing.push(token.into());
        self
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// End the line with `\r\n`
    pub fn crlf(mut self) -> Self {
        self.terminator = "\r\n";
        self
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn build(&self) -> String {
        let sep = self.delimiter.to_string();
        let mut tokens: Vec<String> = self.samples.iter().map(|s| s.to_string()).collect();
        tokens.extend(self.trailing.iter().cloned());
        format!("{}{}", tokens.join(&sep), self.terminator)
    }

    pub fn build_bytes(&self) -> Vec<u8> {
        self.build().into_bytes()
    }
}
