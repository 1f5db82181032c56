//! Summary statistics over a frame's samples
//!
//! Statistics are recomputed from scratch for every accepted frame using a
//! two-pass mean/variance.

use crate::types::{FrameStats, Sample};

/// Compute min, max, mean and population standard deviation
///
/// An empty slice yields all-zero statistics.
pub fn compute(samples: &[Sample]) -> FrameStats {
    if samples.is_empty() {
        return FrameStats::default();
    }

    let mut min = Sample::MAX;
    let mut max = Sample::MIN;
    let mut sum = 0u64;
    for &s in samples {
        min = min.min(s);
        max = max.max(s);
        sum += u64::from(s);
    }

    let n = samples.len() as f64;
    let mean = sum as f64 / n;
    let variance = samples
        .iter()
        .map(|&s| (f64::from(s) - mean).powi(2))
        .sum::<f64>()
        / n;

    FrameStats {
        min,
        max,
        mean,
        stddev: variance.sqrt(),
    }
}
