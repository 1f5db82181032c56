//! Stats bar above the plots: frame statistics, counters and source.

use egui::{Color32, RichText, Ui};

use super::state::FrameView;
use crate::session::SessionCounters;

/// Context needed to render the stats bar.
pub struct StatusBarContext<'a> {
    pub view: &'a FrameView,
    /// Live session counters, updated on every tick
    pub counters: &'a SessionCounters,
    pub source: &'a str,
    pub fatal: Option<&'a str>,
}

/// Render the stats bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let (dot_color, state) = match (ctx.fatal, ctx.view.frame()) {
            (Some(_), _) => (Color32::RED, "Stopped"),
            (None, Some(_)) => (Color32::GREEN, "Streaming"),
            (None, None) => (Color32::YELLOW, "Waiting"),
        };
        ui.colored_label(dot_color, "●");
        ui.label(RichText::new(format!("{}: {}", state, ctx.source)).small());

        ui.separator();

        match ctx.view.stats_text() {
            Some(text) => {
                ui.colored_label(Color32::YELLOW, RichText::new(text).monospace());
            }
            None => {
                ui.label(RichText::new("No frame yet").small().color(Color32::GRAY));
            }
        }

        ui.separator();

        let counters = ctx.counters;
        ui.label(RichText::new(format!("Frames: {}", counters.accepted)).small());
        let rejected_color = if counters.rejected > 0 {
            Color32::LIGHT_RED
        } else {
            Color32::GRAY
        };
        ui.colored_label(
            rejected_color,
            RichText::new(format!("Rejected: {}", counters.rejected)).small(),
        );

        if let Some(err) = ctx.fatal {
            ui.separator();
            ui.colored_label(Color32::RED, RichText::new(err).small());
        }
    });
}
