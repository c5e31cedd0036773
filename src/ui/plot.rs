use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::figure::{Figure, LineStyle};

// ---------------------------------------------------------------------------
// Figure plot (central panel)
// ---------------------------------------------------------------------------

/// Render a figure as an interactive plot in the central panel.
pub fn figure_plot(ui: &mut Ui, figure: &Figure) {
    let mut plot = Plot::new("figure_plot")
        .x_axis_label(figure.x_label.as_str())
        .y_axis_label(figure.y_label.as_str())
        .show_grid(figure.grid_alpha.is_some())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if figure.legend {
        plot = plot.legend(Legend::default());
    }
    if let Some(range) = &figure.x_range {
        plot = plot.include_x(range.start).include_x(range.end);
    }

    plot.show(ui, |plot_ui| {
        for series in &figure.series {
            let color = Color32::from_rgb(series.color.0, series.color.1, series.color.2);

            let points: PlotPoints = series.points.iter().map(|&(x, y)| [x, y]).collect();
            let mut line = Line::new(points)
                .color(color)
                .width(series.line_width as f32);
            if series.line_style == LineStyle::Dashed {
                line = line.style(egui_plot::LineStyle::dashed_loose());
            }
            if let Some(label) = &series.label {
                line = line.name(label);
            }
            plot_ui.line(line);

            if let Some(size) = series.marker_size {
                let markers: PlotPoints = series.points.iter().map(|&(x, y)| [x, y]).collect();
                plot_ui.points(
                    Points::new(markers)
                        .radius(size as f32 * 0.75)
                        .color(color),
                );
            }
        }
    });
}
