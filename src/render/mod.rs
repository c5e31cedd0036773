//! Static chart rendering.
//!
//! A [`Figure`] is drawn once with plotters into an SVG document; the SVG is
//! the single source for every file format written to disk (see [`export`]).

pub mod export;

use anyhow::Result;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use crate::figure::{Figure, LineStyle, CANVAS_DPI};

const POINTS_PER_INCH: f64 = 72.0;
const GRID_COLOR: RGBColor = RGBColor(176, 176, 176);

/// Convert a size in typographic points to canvas pixels.
fn points_to_px(points: f64) -> u32 {
    ((points * CANVAS_DPI / POINTS_PER_INCH).round() as u32).max(1)
}

/// Render a figure to an SVG document.
pub fn render_svg(figure: &Figure) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, figure.canvas_size()).into_drawing_area();
        root.fill(&WHITE)?;

        let x_range = figure.effective_x_range();
        let y_range = figure.effective_y_range();

        let mut chart = ChartBuilder::on(&root)
            .caption(figure.title.as_str(), ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range.clone(), y_range)?;

        let mut mesh = chart.configure_mesh();
        mesh.x_desc(figure.x_label.as_str())
            .y_desc(figure.y_label.as_str())
            .label_style(("sans-serif", 14))
            .axis_desc_style(("sans-serif", 16));
        match figure.grid_alpha {
            Some(alpha) => {
                mesh.bold_line_style(&GRID_COLOR.mix(alpha))
                    .light_line_style(&WHITE);
            }
            None => {
                mesh.disable_mesh();
            }
        }
        mesh.draw()?;

        for series in &figure.series {
            let width = points_to_px(series.line_width);
            let style = series.color.stroke_width(width);
            let color = series.color;
            let legend = move |(x, y): (i32, i32)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width))
            };

            let runs: Vec<_> = series
                .visible_runs(&x_range)
                .into_iter()
                .filter(|run| run.len() > 1)
                .collect();
            let mut label = series.label.as_deref();

            if runs.is_empty() {
                if let Some(text) = label.take() {
                    chart
                        .draw_series(LineSeries::new(std::iter::empty::<(f64, f64)>(), style))?
                        .label(text)
                        .legend(legend);
                }
            }
            for run in &runs {
                let points = run.iter().copied();
                let anno = match series.line_style {
                    LineStyle::Solid => chart.draw_series(LineSeries::new(points, style))?,
                    LineStyle::Dashed => chart.draw_series(DashedLineSeries::new(
                        points,
                        4 * width,
                        2 * width,
                        style,
                    ))?,
                };
                if let Some(text) = label.take() {
                    anno.label(text).legend(legend);
                }
            }

            if let Some(size) = series.marker_size {
                let radius = (points_to_px(size) / 2).max(1);
                let fill = series.color.filled();
                chart.draw_series(
                    series
                        .visible_points(&x_range)
                        .map(|p| Circle::new(p, radius, fill)),
                )?;
            }
        }

        if figure.legend && figure.labelled_series() > 0 {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .label_font(("sans-serif", 14))
                .draw()?;
        }

        root.present()?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::Series;

    fn figure() -> Figure {
        let mut fig = Figure::new("VIN vs Current", "Current (A)", "VIN");
        fig.x_range = Some(0.0..10.0);
        fig.legend = true;
        fig.series.push(Series {
            label: Some("CB position 1".into()),
            points: vec![(1.0, 1.6), (2.0, 1.7), (3.0, 1.8)],
            color: RGBColor(200, 30, 30),
            line_width: 2.0,
            line_style: LineStyle::Solid,
            marker_size: Some(4.0),
        });
        fig.series.push(Series {
            label: Some("VIN expected (2x2 HDI V3)".into()),
            points: vec![(1.0, 1.5), (3.0, 1.9)],
            color: RGBColor(64, 64, 64),
            line_width: 3.0,
            line_style: LineStyle::Dashed,
            marker_size: None,
        });
        fig
    }

    #[test]
    fn svg_carries_title_and_legend() {
        let svg = render_svg(&figure()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("VIN vs Current"));
        assert!(svg.contains("CB position 1"));
        assert!(svg.contains("VIN expected (2x2 HDI V3)"));
    }

    #[test]
    fn empty_figure_still_renders() {
        let fig = Figure::new("nothing", "x", "y");
        let svg = render_svg(&fig).unwrap();
        assert!(svg.contains("nothing"));
    }

    /// Every `points="..."` list in the document, as pixel pairs.
    fn polylines(svg: &str) -> Vec<Vec<(i32, i32)>> {
        svg.split("points=\"")
            .skip(1)
            .map(|rest| {
                rest[..rest.find('"').unwrap()]
                    .split_whitespace()
                    .map(|pair| {
                        let (x, y) = pair.split_once(',').unwrap();
                        (x.parse().unwrap(), y.parse().unwrap())
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn samples_beyond_x_range_are_not_drawn() {
        let mut fig = Figure::new("clipped", "x", "y");
        fig.x_range = Some(0.0..10.0);
        fig.series.push(Series {
            label: None,
            points: vec![(1.0, 1.0), (5.0, 2.0), (20.0, 3.0), (40.0, 4.0)],
            color: RGBColor(0, 0, 0),
            line_width: 1.5,
            line_style: LineStyle::Solid,
            marker_size: Some(4.0),
        });
        let svg = render_svg(&fig).unwrap();

        assert_eq!(svg.matches("<circle").count(), 2);
        for line in polylines(&svg) {
            assert!(
                line.windows(2).all(|w| w[0] != w[1]),
                "polyline piles points onto one pixel: {line:?}"
            );
        }
    }

    #[test]
    fn label_survives_a_series_outside_the_range() {
        let mut fig = figure();
        fig.series[1].points = vec![(20.0, 1.0), (30.0, 2.0)];
        let svg = render_svg(&fig).unwrap();
        assert!(svg.contains("VIN expected (2x2 HDI V3)"));
    }

    #[test]
    fn point_sizes_scale_to_canvas() {
        assert_eq!(points_to_px(72.0), 100);
        assert_eq!(points_to_px(0.1), 1);
    }
}
