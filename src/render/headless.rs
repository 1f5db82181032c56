//! Headless renderer
//!
//! Writes one record per rendered frame, either as a compact stats line or as
//! a JSON object (for piping into other tools). Records carry no history: each
//! line describes only the frame being rendered.

use super::RenderSink;
use crate::error::{Result, ResultExt, ViewerError};
use crate::session::SessionCounters;
use crate::types::{Frame, FrameStats, Sample};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Output format for headless mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadlessFormat {
    /// `Min: ..  Max: ..  Mean: ..  Std: ..` per frame
    #[default]
    StatsLine,
    /// One JSON object per frame
    JsonLines,
}

/// JSON record for one frame
#[derive(Debug, Serialize)]
struct FrameRecord<'a> {
    received_at: DateTime<Utc>,
    sequence: u64,
    samples: &'a [Sample],
    stats: &'a FrameStats,
    rejected: u64,
}

/// Writes frames as text records
pub struct HeadlessRenderer<W: Write> {
    out: W,
    format: HeadlessFormat,
}

impl<W: Write> HeadlessRenderer<W> {
    /// Create a renderer writing to `out`
    pub fn new(out: W, format: HeadlessFormat) -> Self {
        Self { out, format }
    }

    /// Access the underlying writer
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn stats_line(stats: &FrameStats, counters: &SessionCounters) -> String {
        format!(
            "Min:{:3} Max:{:3} Mean:{:5.1} Std:{:5.1}  [{} ok / {} rejected]",
            stats.min, stats.max, stats.mean, stats.stddev, counters.accepted, counters.rejected
        )
    }
}

impl<W: Write> RenderSink for HeadlessRenderer<W> {
    fn render(
        &mut self,
        frame: &Frame,
        stats: &FrameStats,
        counters: &SessionCounters,
    ) -> Result<()> {
        tracing::debug!(
            "Frame {}: {} (range {})",
            counters.accepted,
            stats,
            stats.range()
        );

        let line = match self.format {
            HeadlessFormat::StatsLine => Self::stats_line(stats, counters),
            HeadlessFormat::JsonLines => {
                let record = FrameRecord {
                    received_at: Utc::now(),
                    sequence: counters.accepted,
                    samples: frame.samples(),
                    stats,
                    rejected: counters.rejected,
                };
                serde_json::to_string(&record)
                    .map_err(|e| ViewerError::Render(format!("Failed to encode frame: {}", e)))?
            }
        };

        writeln!(self.out, "{}", line)
            .and_then(|_| self.out.flush())
            .context("Failed to write frame record")
    }

    fn waiting(&mut self, counters: &SessionCounters) -> Result<()> {
        tracing::info!(
            "Waiting for first frame ({} lines rejected so far)",
            counters.rejected
        );
        Ok(())
    }
}
