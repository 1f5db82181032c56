//! Terminal renderer
//!
//! Draws a full-screen text view of the latest frame:
//!
//! - Header and statistics box (min / max / mean / std, frame counters)
//! - Column graph: x = pixel position, y = intensity 0..255, colored by intensity
//! - Heatmap of the whole array using background colors
//! - Color legend
//!
//! The screen is assembled into one string and written with a single call so
//! the terminal repaints without flicker.

use super::RenderSink;
use crate::error::{Result, ResultExt};
use crate::session::SessionCounters;
use crate::types::{Frame, FrameStats, MAX_INTENSITY};
use colored::{Color, ColoredString, Colorize};
use std::io::Write;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Width of the header and statistics boxes
const BOX_WIDTH: usize = 78;

/// Pixels between x-axis labels
const X_LABEL_STEP: usize = 16;

/// Layout options for the console view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleOptions {
    /// Rows used by the column graph
    pub graph_height: usize,
    /// Rows the heatmap is split into
    pub heatmap_rows: usize,
    /// Clear the terminal before each screen
    pub clear_screen: bool,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            graph_height: 18,
            heatmap_rows: 4,
            clear_screen: true,
        }
    }
}

/// Renders frames as ANSI art to a writer (normally stdout)
pub struct ConsoleRenderer<W: Write> {
    out: W,
    options: ConsoleOptions,
}

impl<W: Write> ConsoleRenderer<W> {
    /// Create a renderer writing to `out`
    pub fn new(out: W, options: ConsoleOptions) -> Self {
        Self { out, options }
    }

    /// Access the underlying writer
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Build the full screen for a frame
    pub fn frame_screen(
        &self,
        frame: &Frame,
        stats: &FrameStats,
        counters: &SessionCounters,
    ) -> String {
        let mut lines = self.header();

        lines.push(
            format!("┌─ Statistics {}┐", "─".repeat(BOX_WIDTH - 15))
                .blue()
                .to_string(),
        );
        lines.push(box_line(&[
            "Min:".bright_red(),
            format!(" {:6.1}   ", stats.min as f64).bright_white(),
            "Max:".bright_green(),
            format!(" {:6.1}   ", stats.max as f64).bright_white(),
            "Mean:".bright_yellow(),
            format!(" {:6.1}   ", stats.mean).bright_white(),
            "Std:".bright_magenta(),
            format!(" {:6.1}", stats.stddev).bright_white(),
        ]));
        lines.push(box_line(&[format!(
            "Frames: {} accepted, {} rejected, {} read errors",
            counters.accepted, counters.rejected, counters.read_errors
        )
        .bright_black()]));
        lines.push(format!("└{}┘", "─".repeat(BOX_WIDTH - 2)).blue().to_string());
        lines.push(String::new());

        lines.push(
            format!("Pixel Value (0-{MAX_INTENSITY})")
                .bright_magenta()
                .to_string(),
        );
        lines.push("     ↑".bright_black().to_string());
        lines.extend(line_graph(frame, self.options.graph_height));
        lines.push(String::new());

        lines.extend(heatmap(frame, self.options.heatmap_rows));
        lines.push(format!(
            "{} {}{}{}{}{}{}",
            "Color Legend:".bright_black(),
            " Low ".on_black(),
            " ░ ".on_blue(),
            " ▒ ".on_cyan(),
            " ▓ ".on_green(),
            " █ ".on_yellow(),
            " High ".on_red()
        ));

        lines.extend(self.footer());
        self.finish(lines)
    }

    /// Build the screen shown before the first frame
    pub fn waiting_screen(&self, counters: &SessionCounters) -> String {
        let mut lines = self.header();
        lines.push("⏳ Waiting for data...".bright_yellow().to_string());
        if counters.rejected > 0 || counters.read_errors > 0 {
            lines.push(
                format!(
                    "   {} lines rejected, {} read errors so far",
                    counters.rejected, counters.read_errors
                )
                .bright_black()
                .to_string(),
            );
        }
        lines.extend(self.footer());
        self.finish(lines)
    }

    fn header(&self) -> Vec<String> {
        let title = format!("{:^width$}", " Line Scan Camera - Real-time Data", width = BOX_WIDTH);
        vec![
            format!("┌{}┐", "─".repeat(BOX_WIDTH)).bright_cyan().to_string(),
            format!(
                "{}{}{}",
                "│".bright_cyan(),
                title.bright_white(),
                "│".bright_cyan()
            ),
            format!("└{}┘", "─".repeat(BOX_WIDTH)).bright_cyan().to_string(),
            String::new(),
        ]
    }

    fn footer(&self) -> Vec<String> {
        vec![
            String::new(),
            "Press Ctrl+C to quit".bright_black().to_string(),
        ]
    }

    fn finish(&self, lines: Vec<String>) -> String {
        let mut screen = String::new();
        if self.options.clear_screen {
            screen.push_str(CLEAR_SCREEN);
        }
        for line in lines {
            screen.push_str(&line);
            screen.push('\n');
        }
        screen
    }

    fn write_screen(&mut self, screen: &str) -> Result<()> {
        self.out
            .write_all(screen.as_bytes())
            .and_then(|_| self.out.flush())
            .context("Failed to write console frame")
    }
}

impl<W: Write> RenderSink for ConsoleRenderer<W> {
    fn render(
        &mut self,
        frame: &Frame,
        stats: &FrameStats,
        counters: &SessionCounters,
    ) -> Result<()> {
        let screen = self.frame_screen(frame, stats, counters);
        self.write_screen(&screen)
    }

    fn waiting(&mut self, counters: &SessionCounters) -> Result<()> {
        let screen = self.waiting_screen(counters);
        self.write_screen(&screen)
    }
}

/// One line inside the statistics box, padded to the box width
fn box_line(segments: &[ColoredString]) -> String {
    let visible: usize = segments.iter().map(|s| s.chars().count()).sum();
    let mut line = format!("{} ", "│".blue());
    for segment in segments {
        line.push_str(&segment.to_string());
    }
    line.push_str(&" ".repeat(BOX_WIDTH.saturating_sub(visible + 3)));
    line.push_str(&"│".blue().to_string());
    line
}

/// Foreground color for a column in the graph
fn intensity_color(value: u8) -> Color {
    let intensity = f64::from(value) / f64::from(MAX_INTENSITY);
    if intensity > 0.8 {
        Color::BrightRed
    } else if intensity > 0.6 {
        Color::BrightYellow
    } else if intensity > 0.4 {
        Color::BrightGreen
    } else if intensity > 0.2 {
        Color::BrightCyan
    } else {
        Color::BrightBlue
    }
}

/// Background color for a heatmap cell
fn heatmap_color(value: u8) -> Color {
    let intensity = f64::from(value) / f64::from(MAX_INTENSITY);
    if intensity > 0.9 {
        Color::Red
    } else if intensity > 0.7 {
        Color::Yellow
    } else if intensity > 0.5 {
        Color::Green
    } else if intensity > 0.3 {
        Color::Cyan
    } else if intensity > 0.1 {
        Color::Blue
    } else {
        Color::Black
    }
}

/// Column graph of a frame, top row first, followed by the x axis
pub fn line_graph(frame: &Frame, height: usize) -> Vec<String> {
    let width = frame.len();
    let height = height.max(1);
    let max = MAX_INTENSITY as usize;
    let mut lines = Vec::with_capacity(height + 3);

    // Column heights in rows, scaled from the display range
    let columns: Vec<(usize, u8)> = (0..width)
        .map(|i| {
            let v = frame.display_value(i);
            (usize::from(v) * height / max, v)
        })
        .collect();

    for row in (1..=height).rev() {
        let y_val = row * max / height;
        let mut line = format!("{:3}│", y_val).bright_black().to_string();
        for &(column_height, value) in &columns {
            if column_height >= row {
                let glyph = if column_height == row { "●" } else { "│" };
                line.push_str(&glyph.color(intensity_color(value)).to_string());
            } else {
                line.push(' ');
            }
        }
        lines.push(line);
    }

    lines.push(
        format!("  0└{}", "─".repeat(width))
            .bright_black()
            .to_string(),
    );

    let mut labels = String::from("    ");
    for i in (0..width).step_by(X_LABEL_STEP) {
        if i == 0 {
            labels.push_str(&format!("{:3}", i));
        } else {
            labels.push_str(&format!("{:13}{:3}", "", i));
        }
    }
    lines.push(labels.bright_black().to_string());
    lines.push(
        format!("    Pixel Position (0-{})", width.saturating_sub(1))
            .bright_cyan()
            .to_string(),
    );

    lines
}

/// Heatmap of a frame split into `rows` rows
pub fn heatmap(frame: &Frame, rows: usize) -> Vec<String> {
    let pixels = frame.len();
    let rows = rows.max(1);
    let per_row = pixels.div_ceil(rows).max(1);
    let mut lines = Vec::with_capacity(rows + 2);

    lines.push(
        format!(
            "┌─ Intensity Heatmap (Pixel 0-{}) {}┐",
            pixels.saturating_sub(1),
            "─".repeat(BOX_WIDTH.saturating_sub(32))
        )
        .blue()
        .to_string(),
    );

    for row in 0..rows {
        let start = row * per_row;
        if start >= pixels {
            break;
        }
        let end = (start + per_row).min(pixels);
        let mut line = format!(
            "{}{} ",
            "│".blue(),
            format!("{:3}-{:3}:", start, end - 1).bright_black()
        );
        for i in start..end {
            line.push_str(&" ".on_color(heatmap_color(frame.display_value(i))).to_string());
        }
        line.push_str(&" ".repeat(per_row - (end - start)));
        line.push_str(&format!(" {}", "│".blue()));
        lines.push(line);
    }

    lines.push(format!("└{}┘", "─".repeat(BOX_WIDTH - 2)).blue().to_string());
    lines
}
