//! Intensity plots for the central panel.
//!
//! Two stacked plots of the same frame: a line plot of intensity against
//! pixel position, and a per-pixel bar chart. Both keep the full sample range
//! (0 to 255) in view so frames can be compared by eye.

use egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};

use super::state::FrameView;
use crate::types::MAX_INTENSITY;

const LINE_COLOR: Color32 = Color32::from_rgb(0, 200, 80);
const BAR_COLOR: Color32 = Color32::from_rgb(0, 190, 210);

/// Render both plots, or a placeholder while no frame has arrived
pub fn render_frame_plots(ui: &mut Ui, view: &FrameView) {
    let Some(frame) = view.frame() else {
        ui.centered_and_justified(|ui| {
            ui.label("Waiting for data...");
        });
        return;
    };

    let last_pixel = frame.len().saturating_sub(1) as f64;
    let line_height = ui.available_height() * 0.6;

    Plot::new("intensity_plot")
        .height(line_height)
        .x_axis_label("Pixel Position")
        .y_axis_label("Pixel Value (0-255)")
        .include_x(0.0)
        .include_x(last_pixel)
        .include_y(0.0)
        .include_y(MAX_INTENSITY as f64)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let line = Line::new("Intensity", PlotPoints::from(view.plot_points()))
                .color(LINE_COLOR)
                .width(2.0);
            plot_ui.line(line);
        });

    ui.add_space(4.0);

    let bars: Vec<Bar> = frame
        .samples()
        .iter()
        .enumerate()
        .map(|(i, &v)| Bar::new(i as f64, v as f64).width(0.8))
        .collect();

    Plot::new("pixel_bars")
        .x_axis_label("Pixel")
        .include_x(-0.5)
        .include_x(last_pixel + 0.5)
        .include_y(0.0)
        .include_y(MAX_INTENSITY as f64)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new("Pixels", bars).color(BAR_COLOR));
        });
}
