//! Plot rendering for the scored shot table.
//!
//! Each plot is a PNG written with plotters' bitmap backend. Data preparation
//! lives in [`data`]; the functions here only draw.

pub mod data;

use std::path::{Path, PathBuf};

use plotters::prelude::*;
use polars::prelude::{DataFrame, PolarsError};
use thiserror::Error;

use crate::pipeline::{CorrelationMatrix, ShotColumns, DISTANCE, XG};

pub use data::*;

/// Errors that can occur while preparing or rendering plots.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Nothing to plot: {0}")]
    EmptyData(String),

    #[error("Column '{0}' not found in the scored table")]
    MissingColumn(String),

    #[error("Data error: {0}")]
    Data(String),
}

impl From<PolarsError> for VisualizationError {
    fn from(e: PolarsError) -> Self {
        VisualizationError::Data(e.to_string())
    }
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

pub const XG_VS_DISTANCE_FILE: &str = "xg_vs_distance.png";
pub const XG_VS_REFERENCE_FILE: &str = "xg_vs_reference.png";
pub const XG_DISTRIBUTION_FILE: &str = "xg_distribution.png";
pub const MATCH_COMPARISON_FILE: &str = "team_match_comparison.png";
pub const CORRELATION_HEATMAP_FILE: &str = "correlation_heatmap.png";

/// Every file a full run writes into the output directory
pub const PLOT_FILES: [&str; 5] = [
    XG_VS_DISTANCE_FILE,
    XG_VS_REFERENCE_FILE,
    XG_DISTRIBUTION_FILE,
    MATCH_COMPARISON_FILE,
    CORRELATION_HEATMAP_FILE,
];

/// Default plot width in pixels.
const DEFAULT_WIDTH: u32 = 1280;

/// Default plot height in pixels.
const DEFAULT_HEIGHT: u32 = 800;

/// Evaluation points of the smoothing curve
const CURVE_POINTS: usize = 100;

const SHOT_COLOR: RGBColor = RGBColor(55, 126, 184);
const CURVE_COLOR: RGBColor = RGBColor(228, 26, 28);
const GOALS_COLOR: RGBColor = RGBColor(77, 175, 74);
const PREDICTED_COLOR: RGBColor = RGBColor(255, 127, 0);

/// Rendering settings for a full plot run
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub output_dir: PathBuf,
    /// Team for the match comparison; the team with the most shots when `None`
    pub team: Option<String>,
    pub xg_threshold: f64,
    pub histogram_bins: usize,
    pub smoothing_frac: f64,
}

/// Paths written by [`render_all`] and the team used for the comparison
#[derive(Debug, Clone)]
pub struct RenderedPlots {
    pub files: Vec<PathBuf>,
    pub team: String,
}

/// Output files that already exist in `output_dir`
pub fn existing_plot_files(output_dir: &Path) -> Vec<PathBuf> {
    PLOT_FILES
        .iter()
        .map(|name| output_dir.join(name))
        .filter(|path| path.exists())
        .collect()
}

/// Render every plot for the scored table into `options.output_dir`.
pub fn render_all(
    scored: &DataFrame,
    columns: &ShotColumns,
    correlations: &CorrelationMatrix,
    options: &PlotOptions,
) -> Result<RenderedPlots> {
    std::fs::create_dir_all(&options.output_dir)?;
    let out = |name: &str| options.output_dir.join(name);

    let mut files = Vec::with_capacity(PLOT_FILES.len());

    let distance_points = paired_values(scored, DISTANCE, XG)?;
    let (xs, ys): (Vec<f64>, Vec<f64>) = distance_points.iter().copied().unzip();
    let curve = lowess(&xs, &ys, options.smoothing_frac, CURVE_POINTS);
    plot_xg_vs_distance(&out(XG_VS_DISTANCE_FILE), &distance_points, &curve)?;
    files.push(out(XG_VS_DISTANCE_FILE));

    let reference_points = paired_values(scored, &columns.reference_xg, XG)?;
    plot_xg_vs_reference(&out(XG_VS_REFERENCE_FILE), &reference_points)?;
    files.push(out(XG_VS_REFERENCE_FILE));

    let bins = histogram(&ys, options.histogram_bins, 0.0, 1.0);
    plot_xg_histogram(&out(XG_DISTRIBUTION_FILE), &bins)?;
    files.push(out(XG_DISTRIBUTION_FILE));

    let team = match &options.team {
        Some(team) => team.clone(),
        None => team_with_most_shots(scored, &columns.team)?
            .ok_or_else(|| VisualizationError::EmptyData("no team names in shot table".into()))?,
    };
    let comparison = match_comparison(
        scored,
        &columns.team,
        &columns.match_id,
        &team,
        options.xg_threshold,
    )?;
    plot_match_comparison(&out(MATCH_COMPARISON_FILE), &comparison)?;
    files.push(out(MATCH_COMPARISON_FILE));

    plot_correlation_heatmap(&out(CORRELATION_HEATMAP_FILE), correlations)?;
    files.push(out(CORRELATION_HEATMAP_FILE));

    Ok(RenderedPlots { files, team })
}

/// Scatter of xG against distance with the smoothing curve on top.
pub fn plot_xg_vs_distance(
    output_path: &Path,
    points: &[(f64, f64)],
    curve: &[(f64, f64)],
) -> Result<()> {
    if points.is_empty() {
        return Err(VisualizationError::EmptyData("xG vs distance".into()));
    }

    let (x_min, x_max) = padded_range(points.iter().map(|p| p.0));

    let root = BitMapBackend::new(output_path, (DEFAULT_WIDTH, DEFAULT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(plotting_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("xG vs distance to goal", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 0.0..1.0)
        .map_err(plotting_error)?;

    chart
        .configure_mesh()
        .x_desc("Distance")
        .y_desc("xG")
        .draw()
        .map_err(plotting_error)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 3, SHOT_COLOR.mix(0.4).filled())),
        )
        .map_err(plotting_error)?;

    chart
        .draw_series(LineSeries::new(curve.iter().copied(), CURVE_COLOR.stroke_width(3)))
        .map_err(plotting_error)?;

    root.present().map_err(plotting_error)?;
    Ok(())
}

/// Scatter of xG against the provider's xG with the identity line.
pub fn plot_xg_vs_reference(output_path: &Path, points: &[(f64, f64)]) -> Result<()> {
    if points.is_empty() {
        return Err(VisualizationError::EmptyData("xG vs reference xG".into()));
    }

    let root = BitMapBackend::new(output_path, (DEFAULT_WIDTH, DEFAULT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(plotting_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("xG vs reference xG", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)
        .map_err(plotting_error)?;

    chart
        .configure_mesh()
        .x_desc("Reference xG")
        .y_desc("Model xG")
        .draw()
        .map_err(plotting_error)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 3, SHOT_COLOR.mix(0.4).filled())),
        )
        .map_err(plotting_error)?;

    chart
        .draw_series(LineSeries::new(
            vec![(0.0, 0.0), (1.0, 1.0)],
            BLACK.stroke_width(2),
        ))
        .map_err(plotting_error)?;

    root.present().map_err(plotting_error)?;
    Ok(())
}

/// Bar chart of the xG distribution.
pub fn plot_xg_histogram(output_path: &Path, bins: &[HistogramBin]) -> Result<()> {
    if bins.is_empty() {
        return Err(VisualizationError::EmptyData("xG distribution".into()));
    }

    let x_min = bins[0].lower;
    let x_max = bins[bins.len() - 1].upper;
    let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64 * 1.05;

    let root = BitMapBackend::new(output_path, (DEFAULT_WIDTH, DEFAULT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(plotting_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distribution of xG", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .map_err(plotting_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("xG")
        .y_desc("Shots")
        .draw()
        .map_err(plotting_error)?;

    chart
        .draw_series(bins.iter().map(|b| {
            Rectangle::new(
                [(b.lower, 0.0), (b.upper, b.count as f64)],
                SHOT_COLOR.filled(),
            )
        }))
        .map_err(plotting_error)?;

    root.present().map_err(plotting_error)?;
    Ok(())
}

/// Grouped bars of actual vs. predicted goals per match.
pub fn plot_match_comparison(output_path: &Path, rows: &[MatchComparison]) -> Result<()> {
    if rows.is_empty() {
        return Err(VisualizationError::EmptyData("team match comparison".into()));
    }

    let y_max = rows
        .iter()
        .map(|r| r.goals.max(r.expected_goals))
        .max()
        .unwrap_or(0)
        .max(1) as f64
        + 1.0;

    let root = BitMapBackend::new(output_path, (DEFAULT_WIDTH, DEFAULT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(plotting_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Goals vs predicted goals per match", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..rows.len() as f64, 0.0..y_max)
        .map_err(plotting_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(rows.len().min(30))
        .x_label_formatter(&|x| {
            rows.get(x.floor() as usize)
                .map(|r| r.match_id.clone())
                .unwrap_or_default()
        })
        .x_desc("Match")
        .y_desc("Count")
        .draw()
        .map_err(plotting_error)?;

    chart
        .draw_series(rows.iter().enumerate().map(|(i, r)| {
            let x = i as f64;
            Rectangle::new([(x + 0.1, 0.0), (x + 0.5, r.goals as f64)], GOALS_COLOR.filled())
        }))
        .map_err(plotting_error)?
        .label("Goals")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], GOALS_COLOR.filled()));

    chart
        .draw_series(rows.iter().enumerate().map(|(i, r)| {
            let x = i as f64;
            Rectangle::new(
                [(x + 0.5, 0.0), (x + 0.9, r.expected_goals as f64)],
                PREDICTED_COLOR.filled(),
            )
        }))
        .map_err(plotting_error)?
        .label("Predicted goals")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], PREDICTED_COLOR.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plotting_error)?;

    root.present().map_err(plotting_error)?;
    Ok(())
}

/// Heatmap of the correlation matrix, blue for negative and red for positive.
pub fn plot_correlation_heatmap(output_path: &Path, matrix: &CorrelationMatrix) -> Result<()> {
    if matrix.is_empty() {
        return Err(VisualizationError::EmptyData("correlation matrix".into()));
    }

    let k = matrix.len();

    let root = BitMapBackend::new(output_path, (DEFAULT_HEIGHT, DEFAULT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(plotting_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation matrix", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(120)
        .y_label_area_size(160)
        .build_cartesian_2d(0.0..k as f64, 0.0..k as f64)
        .map_err(plotting_error)?;

    let label = |v: &f64| {
        let idx = v.floor() as usize;
        matrix.columns.get(idx).cloned().unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(k)
        .y_labels(k)
        .x_label_formatter(&label)
        .y_label_formatter(&label)
        .draw()
        .map_err(plotting_error)?;

    chart
        .draw_series((0..k).flat_map(|i| (0..k).map(move |j| (i, j))).map(|(i, j)| {
            // Row 0 at the top
            let y = (k - 1 - i) as f64;
            let x = j as f64;
            Rectangle::new(
                [(x, y), (x + 1.0, y + 1.0)],
                diverging_color(matrix.values[(i, j)]).filled(),
            )
        }))
        .map_err(plotting_error)?;

    root.present().map_err(plotting_error)?;
    Ok(())
}

/// White at 0, saturating to blue at -1 and red at +1
fn diverging_color(r: f64) -> RGBColor {
    let t = if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 };
    let fade = |c: u8, t: f64| (255.0 - (255.0 - c as f64) * t.abs()).round() as u8;
    if t >= 0.0 {
        RGBColor(fade(CURVE_COLOR.0, t), fade(CURVE_COLOR.1, t), fade(CURVE_COLOR.2, t))
    } else {
        RGBColor(fade(SHOT_COLOR.0, t), fade(SHOT_COLOR.1, t), fade(SHOT_COLOR.2, t))
    }
}

/// Range of the values with 5% padding on each side
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut lo, mut hi) = values.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

fn plotting_error<E: std::fmt::Display>(e: E) -> VisualizationError {
    VisualizationError::PlottingError(e.to_string())
}
