//! Analysis module for frame data
//!
//! This module provides the summary statistics shown next to every frame:
//! - Minimum / maximum intensity
//! - Arithmetic mean
//! - Population standard deviation

pub mod stats;

pub use stats::compute;
