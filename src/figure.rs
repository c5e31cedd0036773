use std::ops::Range;

use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Backend-neutral chart description
// ---------------------------------------------------------------------------

/// Pixels per inch of the SVG canvas. Raster output is scaled from this to
/// the requested dpi.
pub const CANVAS_DPI: f64 = 100.0;

/// How a series' line is stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

/// One curve on a chart.
#[derive(Debug, Clone)]
pub struct Series {
    /// Legend entry. `None` keeps the series out of the legend.
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
    pub line_width: f64,
    pub line_style: LineStyle,
    /// Circle marker size in points; `None` draws the line only.
    pub marker_size: Option<f64>,
}

/// A single chart: axes, labels and the series drawn on it.
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Figure size in inches.
    pub size_in: (f64, f64),
    /// Fixed X range; derived from the data when `None`.
    pub x_range: Option<Range<f64>>,
    /// Fixed Y range; derived from the data when `None`.
    pub y_range: Option<Range<f64>>,
    /// Grid line opacity; `None` hides the grid.
    pub grid_alpha: Option<f64>,
    pub legend: bool,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            size_in: (10.0, 6.0),
            x_range: None,
            y_range: None,
            grid_alpha: Some(1.0),
            legend: false,
            series: Vec::new(),
        }
    }

    /// Canvas size in SVG pixels.
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            (self.size_in.0 * CANVAS_DPI).round() as u32,
            (self.size_in.1 * CANVAS_DPI).round() as u32,
        )
    }

    /// Number of series that carry a legend entry.
    pub fn labelled_series(&self) -> usize {
        self.series.iter().filter(|s| s.label.is_some()).count()
    }

    /// X range to draw: the fixed range, or the padded data extent.
    pub fn effective_x_range(&self) -> Range<f64> {
        self.x_range
            .clone()
            .unwrap_or_else(|| padded_extent(self.series.iter().flat_map(|s| s.points.iter().map(|p| p.0))))
    }

    /// Y range to draw: the fixed range, or the padded extent of what is
    /// visible inside the X range, including where lines cross its edges.
    pub fn effective_y_range(&self) -> Range<f64> {
        if let Some(range) = &self.y_range {
            return range.clone();
        }
        let x = self.effective_x_range();
        let runs: Vec<Vec<(f64, f64)>> = self.series.iter().flat_map(|s| s.visible_runs(&x)).collect();
        padded_extent(runs.iter().flatten().map(|p| p.1))
    }
}

impl Series {
    /// Pieces of the polyline that lie inside `x`, with lines cut where they
    /// cross the range edges.
    pub fn visible_runs(&self, x: &Range<f64>) -> Vec<Vec<(f64, f64)>> {
        clip_to_x(&self.points, x)
    }

    /// Sample points inside `x`, for markers.
    pub fn visible_points<'a>(&'a self, x: &'a Range<f64>) -> impl Iterator<Item = (f64, f64)> + 'a {
        self.points
            .iter()
            .copied()
            .filter(move |p| p.0 >= x.start && p.0 <= x.end)
    }
}

/// Split a polyline into the runs that fall inside `x`.
///
/// Each segment is cut against both edges; consecutive visible segments that
/// share an endpoint join into one run. A lone point is kept when it is inside.
pub fn clip_to_x(points: &[(f64, f64)], x: &Range<f64>) -> Vec<Vec<(f64, f64)>> {
    let inside = |p: &(f64, f64)| p.0 >= x.start && p.0 <= x.end;

    if points.len() == 1 {
        return points.iter().filter(|p| inside(*p)).map(|&p| vec![p]).collect();
    }

    let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let Some((from, to)) = clip_segment(a, b, x) else {
            continue;
        };

        if current.last() != Some(&from) {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
            current.push(from);
        }
        if to != from {
            current.push(to);
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Part of segment `a`-`b` inside `x`, or `None` when it misses the range.
/// Cut points sit exactly on the range edge.
fn clip_segment(a: (f64, f64), b: (f64, f64), x: &Range<f64>) -> Option<((f64, f64), (f64, f64))> {
    let dx = b.0 - a.0;
    if dx == 0.0 {
        return (a.0 >= x.start && a.0 <= x.end).then_some((a, b));
    }

    let t_start = (x.start - a.0) / dx;
    let t_end = (x.end - a.0) / dx;
    let ((t_in, x_in), (t_out, x_out)) = if t_start <= t_end {
        ((t_start, x.start), (t_end, x.end))
    } else {
        ((t_end, x.end), (t_start, x.start))
    };
    if t_in.max(0.0) > t_out.min(1.0) {
        return None;
    }

    let dy = b.1 - a.1;
    let from = if t_in <= 0.0 { a } else { (x_in, a.1 + t_in * dy) };
    let to = if t_out >= 1.0 { b } else { (x_out, a.1 + t_out * dy) };
    Some((from, to))
}

/// Data extent with 5% padding either side, or `0..1` when there is no data.
pub fn padded_extent(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let span = max - min;
    let padding = if span.abs() < 1e-12 {
        if min.abs() < 1e-12 { 0.5 } else { min.abs() * 0.05 }
    } else {
        span * 0.05
    };
    (min - padding)..(max + padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: Vec<(f64, f64)>) -> Series {
        Series {
            label: Some("s".into()),
            points,
            color: RGBColor(0, 0, 0),
            line_width: 1.0,
            line_style: LineStyle::Solid,
            marker_size: None,
        }
    }

    #[test]
    fn extent_is_padded() {
        let r = padded_extent([0.0, 10.0].into_iter());
        assert!((r.start + 0.5).abs() < 1e-9);
        assert!((r.end - 10.5).abs() < 1e-9);
    }

    #[test]
    fn degenerate_extents_do_not_collapse() {
        let r = padded_extent(std::iter::empty());
        assert_eq!(r, 0.0..1.0);
        let r = padded_extent([0.0, 0.0].into_iter());
        assert!(r.end > r.start);
        let r = padded_extent([3.0].into_iter());
        assert!(r.start < 3.0 && r.end > 3.0);
    }

    #[test]
    fn y_range_only_considers_visible_x() {
        let mut fig = Figure::new("t", "x", "y");
        fig.x_range = Some(0.0..10.0);
        fig.series.push(series(vec![(1.0, 1.0), (2.0, 2.0), (50.0, 1000.0)]));
        // Only the part of the last segment up to x = 10 counts.
        let y = fig.effective_y_range();
        assert!(y.end < 200.0);
    }

    #[test]
    fn y_range_includes_edge_crossings() {
        let mut fig = Figure::new("t", "x", "y");
        fig.x_range = Some(0.0..10.0);
        fig.series.push(series(vec![(5.0, 0.0), (15.0, 10.0)]));
        // The line leaves the range at (10, 5).
        let y = fig.effective_y_range();
        assert!((y.start + 0.25).abs() < 1e-9);
        assert!((y.end - 5.25).abs() < 1e-9);
    }

    #[test]
    fn runs_are_cut_at_range_edge() {
        let points = [(1.0, 1.0), (5.0, 2.0), (20.0, 3.0), (40.0, 4.0)];
        let runs = clip_to_x(&points, &(0.0..10.0));
        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        assert_eq!(run.len(), 3);
        assert_eq!(run[0], (1.0, 1.0));
        assert_eq!(run[1], (5.0, 2.0));
        assert!((run[2].0 - 10.0).abs() < 1e-12);
        assert!((run[2].1 - 7.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn excursions_split_runs() {
        let points = [(1.0, 0.0), (12.0, 0.0), (14.0, 0.0), (9.0, 1.0), (-5.0, 1.0)];
        let runs = clip_to_x(&points, &(0.0..10.0));
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], vec![(1.0, 0.0), (10.0, 0.0)]);
        assert_eq!(runs[1].first().map(|p| p.0), Some(10.0));
        assert_eq!(runs[1].last().map(|p| p.0), Some(0.0));
        assert_eq!(runs[1].len(), 3);
    }

    #[test]
    fn descending_sweeps_clip_too() {
        let runs = clip_to_x(&[(20.0, 2.0), (0.0, 0.0)], &(0.0..10.0));
        assert_eq!(runs, vec![vec![(10.0, 1.0), (0.0, 0.0)]]);
    }

    #[test]
    fn lone_points_follow_range() {
        assert_eq!(clip_to_x(&[(3.0, 1.0)], &(0.0..10.0)), vec![vec![(3.0, 1.0)]]);
        assert!(clip_to_x(&[(30.0, 1.0)], &(0.0..10.0)).is_empty());
        assert!(clip_to_x(&[(20.0, 1.0), (30.0, 2.0)], &(0.0..10.0)).is_empty());
    }

    #[test]
    fn markers_only_inside_range() {
        let s = series(vec![(1.0, 1.0), (5.0, 2.0), (20.0, 3.0)]);
        let x = 0.0..10.0;
        assert_eq!(s.visible_points(&x).count(), 2);
    }

    #[test]
    fn canvas_size_follows_inches() {
        let mut fig = Figure::new("t", "x", "y");
        fig.size_in = (7.5, 5.0);
        assert_eq!(fig.canvas_size(), (750, 500));
    }
}
