//! Hold-out evaluation of the fitted xG model

use anyhow::Result;
use polars::prelude::*;

use super::columns::{GOAL, XG};
use super::error::ModelError;
use super::model::extract_predictors;

/// Probability clipping for log loss
const PROB_EPS: f64 = 1e-15;

/// Discrimination and calibration metrics for one partition
#[derive(Debug, Clone)]
pub struct ModelEvaluation {
    pub n_shots: usize,
    pub goals: usize,
    pub expected_goals: f64,
    pub auc: f64,
    /// 2 * AUC - 1
    pub gini: f64,
    pub log_loss: f64,
    pub brier_score: f64,
}

/// Evaluate scored rows (`xg` and `goal` columns present)
pub fn evaluate_scored(df: &DataFrame) -> Result<ModelEvaluation> {
    let mut columns = extract_predictors(df, &[XG, GOAL])?;
    let outcomes = columns.pop().unwrap_or_default();
    let scores = columns.pop().unwrap_or_default();
    let evaluation = evaluate(&scores, &outcomes)?;
    Ok(evaluation)
}

/// Evaluate probabilities against 0/1 outcomes
pub fn evaluate(scores: &[f64], outcomes: &[f64]) -> Result<ModelEvaluation, ModelError> {
    if scores.is_empty() {
        return Err(ModelError::EmptyData);
    }
    if scores.len() != outcomes.len() {
        return Err(ModelError::DimensionMismatch {
            expected: scores.len(),
            actual: outcomes.len(),
        });
    }

    let n = scores.len() as f64;
    let goals = outcomes.iter().filter(|&&y| y == 1.0).count();
    let expected_goals: f64 = scores.iter().sum();

    let log_loss = -scores
        .iter()
        .zip(outcomes)
        .map(|(&p, &y)| {
            let p = p.clamp(PROB_EPS, 1.0 - PROB_EPS);
            y * p.ln() + (1.0 - y) * (1.0 - p).ln()
        })
        .sum::<f64>()
        / n;

    let brier_score = scores
        .iter()
        .zip(outcomes)
        .map(|(&p, &y)| (p - y) * (p - y))
        .sum::<f64>()
        / n;

    let mut pairs: Vec<(f64, i32)> = scores
        .iter()
        .zip(outcomes)
        .map(|(&p, &y)| (p, if y == 1.0 { 1 } else { 0 }))
        .collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let auc = calculate_auc(&pairs);

    Ok(ModelEvaluation {
        n_shots: scores.len(),
        goals,
        expected_goals,
        auc,
        gini: 2.0 * auc - 1.0,
        log_loss,
        brier_score,
    })
}

/// AUC from the Mann-Whitney U statistic.
///
/// `sorted_pairs` must be sorted by score ascending. Tied scores share their
/// average rank. Returns 0.5 when either class is absent.
fn calculate_auc(sorted_pairs: &[(f64, i32)]) -> f64 {
    let total_pos = sorted_pairs.iter().filter(|(_, t)| *t == 1).count() as f64;
    let total_neg = sorted_pairs.len() as f64 - total_pos;

    if total_pos <= 0.0 || total_neg <= 0.0 {
        return 0.5;
    }

    let n = sorted_pairs.len();
    let mut rank_sum_pos = 0.0;
    let mut i = 0;

    while i < n {
        let current_value = sorted_pairs[i].0;
        let mut j = i;

        // Find all ties with same value
        while j < n && (sorted_pairs[j].0 - current_value).abs() < 1e-10 {
            j += 1;
        }

        // Ranks i+1..=j share their average
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let positives_in_group = sorted_pairs[i..j].iter().filter(|(_, t)| *t == 1).count();
        rank_sum_pos += avg_rank * positives_in_group as f64;

        i = j;
    }

    let u = rank_sum_pos - total_pos * (total_pos + 1.0) / 2.0;
    (u / (total_pos * total_neg)).clamp(0.0, 1.0)
}
