//! What the window shows between repaints.
//!
//! [`FrameView`] is the GUI's render sink: the session pushes frames into it,
//! and the panels read it back on the next repaint.

use crate::error::Result;
use crate::render::RenderSink;
use crate::session::SessionCounters;
use crate::types::{Frame, FrameStats};

/// Latest frame, statistics and counters handed over by the session
#[derive(Debug, Clone, Default)]
pub struct FrameView {
    frame: Option<Frame>,
    stats: Option<FrameStats>,
    counters: SessionCounters,
    renders: u64,
}

impl FrameView {
    /// Frame currently on screen, if any
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Statistics of the frame on screen
    pub fn stats(&self) -> Option<&FrameStats> {
        self.stats.as_ref()
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    /// Number of frames rendered since startup
    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// `(pixel, value)` pairs for the line plot
    pub fn plot_points(&self) -> Vec<[f64; 2]> {
        self.frame
            .as_ref()
            .map(|frame| {
                frame
                    .samples()
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| [i as f64, v as f64])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Status line text, e.g. `Min: 0  Max: 255  Mean: 127.8  Std: 90.2  Range: 255`
    pub fn stats_text(&self) -> Option<String> {
        self.stats
            .as_ref()
            .map(|stats| format!("{}  Range: {}", stats, stats.range()))
    }
}

impl RenderSink for FrameView {
    fn render(
        &mut self,
        frame: &Frame,
        stats: &FrameStats,
        counters: &SessionCounters,
    ) -> Result<()> {
        self.frame = Some(frame.clone());
        self.stats = Some(*stats);
        self.counters = *counters;
        self.renders += 1;
        Ok(())
    }

    fn waiting(&mut self, counters: &SessionCounters) -> Result<()> {
        self.counters = *counters;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_view() {
        let view = FrameView::default();
        assert!(view.frame().is_none());
        assert!(view.plot_points().is_empty());
        assert!(view.stats_text().is_none());
    }

    #[test]
    fn test_render_replaces_frame() {
        let mut view = FrameView::default();
        let first = Frame::new(vec![1, 2, 3]);
        let second = Frame::new(vec![0, 255, 128, 128]);
        let counters = SessionCounters {
            accepted: 2,
            ..Default::default()
        };

        view.render(&first, &first.stats(), &SessionCounters::default())
            .unwrap();
        view.render(&second, &second.stats(), &counters).unwrap();

        assert_eq!(view.frame(), Some(&second));
        assert_eq!(view.renders(), 2);
        assert_eq!(view.counters().accepted, 2);
        assert_eq!(
            view.plot_points(),
            vec![[0.0, 0.0], [1.0, 255.0], [2.0, 128.0], [3.0, 128.0]]
        );
        assert_eq!(
            view.stats_text().unwrap(),
            "Min: 0  Max: 255  Mean: 127.8  Std: 90.2  Range: 255"
        );
    }

    #[test]
    fn test_waiting_keeps_frame() {
        let mut view = FrameView::default();
        let frame = Frame::new(vec![5; 4]);
        view.render(&frame, &frame.stats(), &SessionCounters::default())
            .unwrap();

        let counters = SessionCounters {
            rejected: 9,
            ..Default::default()
        };
        view.waiting(&counters).unwrap();
        assert!(view.frame().is_some());
        assert_eq!(view.counters().rejected, 9);
    }
}
