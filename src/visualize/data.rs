//! Plot data preparation, kept apart from rendering so it can be tested

use std::collections::HashMap;

use polars::prelude::*;

use super::{Result, VisualizationError};
use crate::pipeline::{column_as_f64, GOAL, XG};

/// One histogram bar
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Actual vs. predicted goals for one match of one team
#[derive(Debug, Clone, PartialEq)]
pub struct MatchComparison {
    pub match_id: String,
    pub goals: usize,
    /// Shots with xG at or above the threshold
    pub expected_goals: usize,
}

/// LOWESS smoothing: local linear fits with tricube weights.
///
/// Each fit uses the `ceil(frac * n)` nearest observations. The curve is
/// evaluated at `points` evenly spaced x values across the data range. Pairs
/// with a non-finite coordinate are ignored.
pub fn lowess(xs: &[f64], ys: &[f64], frac: f64, points: usize) -> Vec<(f64, f64)> {
    let data: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();

    let n = data.len();
    if n == 0 || points == 0 {
        return Vec::new();
    }

    let span = ((frac.clamp(0.0, 1.0) * n as f64).ceil() as usize).clamp(1, n);

    let x_min = data.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_max = data.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);

    let grid: Vec<f64> = if points == 1 || x_max == x_min {
        vec![x_min]
    } else {
        let last = (points - 1) as f64;
        (0..points)
            .map(|i| x_min + (x_max - x_min) * (i as f64 / last))
            .collect()
    };

    let mut distances = vec![0.0; n];
    grid.into_iter()
        .map(|x0| {
            for (d, (x, _)) in distances.iter_mut().zip(&data) {
                *d = (x - x0).abs();
            }
            let mut sorted = distances.clone();
            let (_, bandwidth, _) =
                sorted.select_nth_unstable_by(span - 1, |a, b| a.total_cmp(b));
            let bandwidth = *bandwidth;

            (x0, local_linear(&data, &distances, bandwidth, x0))
        })
        .collect()
}

/// Tricube-weighted linear fit evaluated at `x0`
fn local_linear(data: &[(f64, f64)], distances: &[f64], bandwidth: f64, x0: f64) -> f64 {
    let weights: Vec<f64> = distances
        .iter()
        .map(|&d| {
            if bandwidth <= 0.0 {
                if d == 0.0 {
                    1.0
                } else {
                    0.0
                }
            } else if d < bandwidth {
                let u = d / bandwidth;
                let t = 1.0 - u * u * u;
                t * t * t
            } else {
                0.0
            }
        })
        .collect();

    let sum_w: f64 = weights.iter().sum();
    if sum_w <= 0.0 {
        // Every neighbour sits exactly on the bandwidth: plain mean of them
        let near: Vec<f64> = data
            .iter()
            .zip(distances)
            .filter(|(_, &d)| d <= bandwidth)
            .map(|((_, y), _)| *y)
            .collect();
        return near.iter().sum::<f64>() / near.len().max(1) as f64;
    }

    let mean_x = weights.iter().zip(data).map(|(w, (x, _))| w * x).sum::<f64>() / sum_w;
    let mean_y = weights.iter().zip(data).map(|(w, (_, y))| w * y).sum::<f64>() / sum_w;

    let (sxy, sxx) = weights
        .iter()
        .zip(data)
        .fold((0.0, 0.0), |(sxy, sxx), (w, (x, y))| {
            let dx = x - mean_x;
            (sxy + w * dx * (y - mean_y), sxx + w * dx * dx)
        });

    if sxx.abs() < 1e-12 {
        return mean_y;
    }
    mean_y + (sxy / sxx) * (x0 - mean_x)
}

/// Count values into `bins` equal-width bins over `[lo, hi]`.
///
/// The last bin is closed on the right. Values outside the range are dropped.
pub fn histogram(values: &[f64], bins: usize, lo: f64, hi: f64) -> Vec<HistogramBin> {
    if bins == 0 || !(hi > lo) {
        return Vec::new();
    }

    let width = (hi - lo) / bins as f64;
    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: lo + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for &v in values {
        if !(lo..=hi).contains(&v) {
            continue;
        }
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        result[idx].count += 1;
    }

    result
}

/// Paired columns as points, skipping rows where either is null
pub fn paired_values(df: &DataFrame, x: &str, y: &str) -> Result<Vec<(f64, f64)>> {
    let xs = column_as_f64(df, x).map_err(|e| VisualizationError::Data(e.to_string()))?;
    let ys = column_as_f64(df, y).map_err(|e| VisualizationError::Data(e.to_string()))?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .filter_map(|(x, y)| Some((x?, y?)))
        .collect())
}

/// Team with the most rows in `team_column`; ties go to the team seen first
pub fn team_with_most_shots(df: &DataFrame, team_column: &str) -> Result<Option<String>> {
    let teams = text_column(df, team_column)?;

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for team in teams.into_iter().flatten() {
        let count = counts.entry(team.clone()).or_insert_with(|| {
            order.push(team.clone());
            0
        });
        *count += 1;
    }

    let mut best: Option<(String, usize)> = None;
    for team in order {
        let count = counts[&team];
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((team, count));
        }
    }
    Ok(best.map(|(team, _)| team))
}

/// Per-match goals and thresholded predicted goals for `team`, in first-seen match order
pub fn match_comparison(
    df: &DataFrame,
    team_column: &str,
    match_column: &str,
    team: &str,
    threshold: f64,
) -> Result<Vec<MatchComparison>> {
    let teams = text_column(df, team_column)?;
    let matches = text_column(df, match_column)?;
    let goals = column_as_f64(df, GOAL).map_err(|e| VisualizationError::Data(e.to_string()))?;
    let scores = column_as_f64(df, XG).map_err(|e| VisualizationError::Data(e.to_string()))?;

    let mut rows: Vec<MatchComparison> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for i in 0..df.height() {
        if teams[i].as_deref() != Some(team) {
            continue;
        }
        let match_id = matches[i].clone().unwrap_or_default();
        let slot = *index.entry(match_id.clone()).or_insert_with(|| {
            rows.push(MatchComparison {
                match_id,
                goals: 0,
                expected_goals: 0,
            });
            rows.len() - 1
        });

        if goals[i] == Some(1.0) {
            rows[slot].goals += 1;
        }
        if scores[i].is_some_and(|s| s >= threshold) {
            rows[slot].expected_goals += 1;
        }
    }

    Ok(rows)
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| VisualizationError::MissingColumn(name.to_string()))?
        .cast(&DataType::String)?;
    Ok(column.str()?.iter().map(|v| v.map(str::to_string)).collect())
}
