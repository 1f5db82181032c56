//! Mock Line-Scan Sensor for Testing
//!
//! This module provides a synthetic sensor that behaves like a TSL1401 board
//! streaming CSV frames, so the viewer can be run without hardware.
//!
//! # Generated stream
//!
//! - A Gaussian bright spot drifting back and forth over a dark floor, with noise
//! - A `Sharpness,...` marker line every `marker_every` frames
//! - A truncated frame every `glitch_every` frames
//!
//! # Enabling
//!
//! The mock sensor is only available when the `mock-sensor` feature is enabled:
//!
//! ```bash
//! cargo run --features mock-sensor -- --mock --mode console
//! ```

use super::{LineRead, Transport, TransportError};
use std::time::{Duration, Instant};

/// Synthetic line-scan sensor
#[derive(Debug)]
pub struct MockSensor {
    pixels: usize,
    frame_period: Duration,
    marker_every: u64,
    glitch_every: u64,
    start: Instant,
    last_emit: Option<Instant>,
    emitted: u64,
    seed: u64,
    closed: bool,
}

impl MockSensor {
    /// Create a sensor emitting `pixels` samples per frame every `frame_period`
    pub fn new(pixels: usize, frame_period: Duration) -> Self {
        Self {
            pixels,
            frame_period,
            marker_every: 10,
            glitch_every: 25,
            start: Instant::now(),
            last_emit: None,
            emitted: 0,
            seed: 12345,
            closed: false,
        }
    }

    /// Emit a marker line every `n` lines (0 disables markers)
    pub fn with_marker_every(mut self, n: u64) -> Self {
        self.marker_every = n;
        self
    }

    /// Emit a truncated frame every `n` lines (0 disables glitches)
    pub fn with_glitch_every(mut self, n: u64) -> Self {
        self.glitch_every = n;
        self
    }

    /// Generate the samples of one frame at `elapsed_secs`
    pub fn generate_frame(&mut self, elapsed_secs: f64) -> Vec<u32> {
        let n = self.pixels.max(1) as f64;
        // Triangle sweep of the spot center across the array, 4 s per pass
        let phase = (elapsed_secs / 4.0).fract();
        let sweep = if phase < 0.5 { phase * 2.0 } else { 2.0 - phase * 2.0 };
        let center = sweep * (n - 1.0);
        let width = n / 16.0;

        (0..self.pixels)
            .map(|i| {
                let d = (i as f64 - center) / width;
                let spot = 220.0 * (-0.5 * d * d).exp();
                let noise = (self.next_random() - 0.5) * 12.0;
                (20.0 + spot + noise).clamp(0.0, 255.0).round() as u32
            })
            .collect()
    }

    fn next_random(&mut self) -> f64 {
        let mut s = self.seed;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.seed = s;
        (s as f64) / (u64::MAX as f64)
    }

    fn next_line(&mut self) -> Vec<u8> {
        self.emitted += 1;
        let elapsed = self.start.elapsed().as_secs_f64();

        if self.marker_every > 0 && self.emitted % self.marker_every == 0 {
            return format!("Sharpness,{}", (self.next_random() * 1000.0) as u32).into_bytes();
        }

        let samples = self.generate_frame(elapsed);
        let keep = if self.glitch_every > 0 && self.emitted % self.glitch_every == 0 {
            samples.len() / 2
        } else {
            samples.len()
        };

        samples[..keep]
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
            .into_bytes()
    }

    fn frame_due(&self) -> bool {
        self.last_emit
            .map(|t| t.elapsed() >= self.frame_period)
            .unwrap_or(true)
    }

    fn check_open(&self) -> Result<(), TransportError> {
        if self.closed {
            Err(TransportError::Disconnected("mock sensor closed".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Transport for MockSensor {
    fn bytes_available(&mut self) -> Result<bool, TransportError> {
        self.check_open()?;
        Ok(self.frame_due())
    }

    fn read_line(&mut self, _timeout: Duration) -> Result<LineRead, TransportError> {
        self.check_open()?;
        if !self.frame_due() {
            return Ok(LineRead::Timeout);
        }
        self.last_emit = Some(Instant::now());
        Ok(LineRead::Line(self.next_line()))
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn describe(&self) -> String {
        format!("mock sensor ({} px)", self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{FrameDecoder, Rejection};

    #[test]
    fn test_frames_decode() {
        let mut sensor = MockSensor::new(128, Duration::ZERO)
            .with_marker_every(0)
            .with_glitch_every(0);
        let decoder = FrameDecoder::new(128);
        for _ in 0..5 {
            match sensor.read_line(Duration::from_millis(10)).unwrap() {
                LineRead::Line(bytes) => {
                    let frame = decoder.try_decode(&bytes).unwrap();
                    assert!(frame.samples().iter().all(|&v| v <= 255));
                }
                other => panic!("unexpected read {:?}", other),
            }
        }
    }

    #[test]
    fn test_markers_and_glitches_are_rejected() {
        let mut sensor = MockSensor::new(32, Duration::ZERO)
            .with_marker_every(2)
            .with_glitch_every(3);
        let decoder = FrameDecoder::new(32);
        let mut results = Vec::new();
        for _ in 0..6 {
            if let LineRead::Line(bytes) = sensor.read_line(Duration::ZERO).unwrap() {
                results.push(decoder.try_decode(&bytes));
            }
        }
        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(Rejection::Marker));
        assert!(matches!(
            results[2],
            Err(Rejection::InsufficientSamples { found: 16, expected: 32 })
        ));
        assert_eq!(results[3], Err(Rejection::Marker));
    }

    #[test]
    fn test_rate_limited() {
        let mut sensor = MockSensor::new(8, Duration::from_secs(3600));
        assert!(sensor.bytes_available().unwrap());
        assert!(matches!(sensor.read_line(Duration::ZERO).unwrap(), LineRead::Line(_)));
        assert!(!sensor.bytes_available().unwrap());
        assert_eq!(sensor.read_line(Duration::ZERO).unwrap(), LineRead::Timeout);
    }

    #[test]
    fn test_close() {
        let mut sensor = MockSensor::new(8, Duration::ZERO);
        sensor.close();
        assert!(sensor.bytes_available().unwrap_err().is_fatal());
    }
}
