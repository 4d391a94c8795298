//! SVG rendering of occupation curves, spectra, phase-space maps, and Bloch
//! vectors.
//!
//! Nothing here keeps a "current figure": every routine draws onto the
//! [`DrawingArea`] it is handed, and multi-panel figures are composed by
//! splitting a root area with [`split_panels`].

use plotters::{ coord::Shift, prelude::* };

pub mod phase_space;
pub use phase_space::{ heatmap, surface };

pub mod bloch;
pub use bloch::bloch_sphere;

/// Result of a drawing operation on backend `DB`.
pub type PlotResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

pub const FONT: &str = "sans-serif";

/// Arrangement of panels within a figure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Layout {
    /// All panels side by side.
    Row,
    /// All panels on top of each other.
    Stacked,
    /// Row-major grid with a fixed number of columns.
    Grid { cols: usize },
}

/// Split `area` into exactly `n` panels, returned in row-major order so that
/// the `k`-th panel receives the `k`-th plot.
pub fn split_panels<DB>(area: &DrawingArea<DB, Shift>, layout: Layout, n: usize)
    -> Vec<DrawingArea<DB, Shift>>
where DB: DrawingBackend
{
    if n == 0 { return Vec::new(); }
    let (rows, cols) = match layout {
        Layout::Row => (1, n),
        Layout::Stacked => (n, 1),
        Layout::Grid { cols } => {
            let cols = cols.clamp(1, n);
            ((n + cols - 1) / cols, cols)
        },
    };
    let mut panels = area.split_evenly((rows, cols));
    panels.truncate(n);
    panels
}

/// File name of the `k`-th figure in a series of snapshots taken at time `t`.
///
/// The request index keeps repeated times apart and makes the files sort in
/// request order.
pub fn snapshot_file(stem: &str, k: usize, t: f64) -> String {
    format!("{stem}_{k:02}_t={t}.svg")
}

/// Title and axis labels of a plot.
#[derive(Copy, Clone, Debug, Default)]
pub struct Labels<'a> {
    pub title: &'a str,
    pub x: &'a str,
    pub y: &'a str,
}

/// Line style of a plotted series.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stroke {
    Solid,
    Dashed,
}

/// A single labeled curve.
#[derive(Clone, Debug)]
pub struct Series<'a> {
    pub label: String,
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub stroke: Stroke,
}

// smallest interval containing all finite values, never degenerate
pub(crate) fn data_range<I>(values: I) -> (f64, f64)
where I: IntoIterator<Item = f64>
{
    let (lo, hi)
        = values.into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        (0.0, 1.0)
    } else if lo == hi {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    }
}

pub(crate) fn pad((lo, hi): (f64, f64), frac: f64) -> (f64, f64) {
    let d = frac * (hi - lo);
    (lo - d, hi + d)
}

/// Diverging red-white-blue color map, from red at `t = 0` to blue at
/// `t = 1`.
pub fn rdbu(t: f64) -> RGBColor {
    const STOPS: [(f64, (f64, f64, f64)); 5] = [
        (0.00, (103.0,   0.0,  31.0)),
        (0.25, (214.0,  96.0,  77.0)),
        (0.50, (247.0, 247.0, 247.0)),
        (0.75, ( 67.0, 147.0, 195.0)),
        (1.00, (  5.0,  48.0,  97.0)),
    ];
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let k = STOPS.iter().position(|(s, _)| *s >= t).unwrap_or(4).max(1);
    let (s0, c0) = STOPS[k - 1];
    let (s1, c1) = STOPS[k];
    let u = (t - s0) / (s1 - s0);
    let lerp = |a: f64, b: f64| (a + u * (b - a)).round() as u8;
    RGBColor(lerp(c0.0, c1.0), lerp(c0.1, c1.1), lerp(c0.2, c1.2))
}

/// Draw a set of curves with a legend.
///
/// Only points with `x` inside `xlim` (if given) are drawn, and the vertical
/// range is fitted to them.
pub fn line_plot<DB>(
    area: &DrawingArea<DB, Shift>,
    labels: Labels,
    xlim: Option<(f64, f64)>,
    series: &[Series],
) -> PlotResult<DB>
where DB: DrawingBackend
{
    let (x0, x1)
        = xlim.unwrap_or_else(|| {
            data_range(series.iter().flat_map(|s| s.x.iter().copied()))
        });
    let visible = move |x: &f64| (x0..=x1).contains(x);
    let (y0, y1)
        = pad(
            data_range(
                series.iter()
                .flat_map(|s| s.x.iter().zip(s.y))
                .filter(|(x, _)| visible(*x))
                .map(|(_, y)| *y)
            ),
            0.05,
        );

    let mut chart
        = ChartBuilder::on(area)
        .caption(labels.title, (FONT, 18))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)?;
    chart.configure_mesh()
        .x_desc(labels.x)
        .y_desc(labels.y)
        .draw()?;

    for (k, s) in series.iter().enumerate() {
        let color = Palette99::pick(k).to_rgba();
        let points
            = s.x.iter().copied()
            .zip(s.y.iter().copied())
            .filter(move |(x, _)| visible(x));
        let anno = match s.stroke {
            Stroke::Solid => chart.draw_series(
                LineSeries::new(points, color.stroke_width(2)))?,
            Stroke::Dashed => chart.draw_series(
                DashedLineSeries::new(points, 8, 5, color.stroke_width(2)))?,
        };
        anno.label(s.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }
    chart.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}
