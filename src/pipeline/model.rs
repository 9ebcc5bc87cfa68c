//! Logistic regression for the xG model
//!
//! Fits `P(goal) = 1 / (1 + exp(-(b0 + b·x)))` by iteratively reweighted least
//! squares (Newton-Raphson on the log-likelihood). Each step solves the normal
//! equations `(Xᵀ W X) δ = Xᵀ (y - μ)` with faer's partial-pivot LU.

use anyhow::{Context, Result};
use faer::prelude::*;
use faer::Mat;
use polars::prelude::*;

use super::columns::{GOAL, PREDICTORS, XG};
use super::error::ModelError;

/// Lower bound on IRLS weights so separated data keeps a solvable system
const MIN_WEIGHT: f64 = 1e-10;

/// Probability clipping used for the log-likelihood
const PROB_EPS: f64 = 1e-15;

/// IRLS stopping rules
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    pub max_iterations: usize,
    /// Convergence when the largest coefficient update falls below this
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-8,
        }
    }
}

/// A fitted coefficient with its Wald statistics
#[derive(Debug, Clone)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    /// estimate / std_error
    pub z_value: f64,
}

/// Fitted binomial model
#[derive(Debug, Clone)]
pub struct LogisticModel {
    pub intercept: Coefficient,
    /// One coefficient per predictor, in predictor order
    pub coefficients: Vec<Coefficient>,
    pub iterations: usize,
    pub converged: bool,
    pub log_likelihood: f64,
    pub n_observations: usize,
}

impl LogisticModel {
    /// Names of the predictors in coefficient order
    pub fn predictor_names(&self) -> Vec<&str> {
        self.coefficients.iter().map(|c| c.name.as_str()).collect()
    }

    /// `b0 + Σ bᵢ·xᵢ` for one row of predictor values
    pub fn linear_predictor(&self, values: &[f64]) -> Result<f64, ModelError> {
        if values.len() != self.coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coefficients.len(),
                actual: values.len(),
            });
        }
        Ok(self.intercept.estimate
            + self
                .coefficients
                .iter()
                .zip(values)
                .map(|(c, x)| c.estimate * x)
                .sum::<f64>())
    }

    /// Probability of a goal for one row of predictor values
    pub fn predict_proba(&self, values: &[f64]) -> Result<f64, ModelError> {
        Ok(sigmoid(self.linear_predictor(values)?))
    }
}

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Fit a logistic regression by IRLS.
///
/// `columns` holds one vector per predictor (all of length `y.len()`), `names`
/// the matching predictor names. `y` must contain only 0 and 1.
pub fn fit_logistic(
    columns: &[Vec<f64>],
    names: &[&str],
    y: &[f64],
    options: FitOptions,
) -> Result<LogisticModel, ModelError> {
    let n = y.len();
    if n == 0 {
        return Err(ModelError::EmptyData);
    }
    if columns.len() != names.len() {
        return Err(ModelError::DimensionMismatch {
            expected: names.len(),
            actual: columns.len(),
        });
    }
    for (values, name) in columns.iter().zip(names) {
        if values.len() != n {
            return Err(ModelError::DimensionMismatch {
                expected: n,
                actual: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinitePredictor(name.to_string()));
        }
    }

    let positives = y.iter().filter(|&&v| v == 1.0).count();
    if positives == 0 || positives == n {
        return Err(ModelError::DegenerateTarget(GOAL.to_string()));
    }

    // Design matrix with a leading intercept column
    let k = columns.len() + 1;
    let x = Mat::<f64>::from_fn(n, k, |i, j| if j == 0 { 1.0 } else { columns[j - 1][i] });

    let mut beta = vec![0.0; k];
    let mut converged = false;
    let mut iterations = 0;

    while iterations < options.max_iterations {
        iterations += 1;

        let mu = fitted_probabilities(&x, &beta);
        let hessian = weighted_gram(&x, &mu);
        let gradient = Mat::<f64>::from_fn(k, 1, |j, _| {
            (0..n).map(|i| x[(i, j)] * (y[i] - mu[i])).sum::<f64>()
        });

        let delta = hessian.partial_piv_lu().solve(gradient.as_ref());

        let mut max_step = 0.0f64;
        for (j, b) in beta.iter_mut().enumerate() {
            let step = delta[(j, 0)];
            if !step.is_finite() {
                return Err(ModelError::SingularHessian(iterations));
            }
            *b += step;
            max_step = max_step.max(step.abs());
        }

        if max_step < options.tolerance {
            converged = true;
            break;
        }
    }

    // Standard errors from the inverse Hessian at the solution
    let mu = fitted_probabilities(&x, &beta);
    let hessian = weighted_gram(&x, &mu);
    let identity = Mat::<f64>::from_fn(k, k, |i, j| if i == j { 1.0 } else { 0.0 });
    let covariance = hessian.partial_piv_lu().solve(identity.as_ref());

    let log_likelihood = y
        .iter()
        .zip(&mu)
        .map(|(&yi, &p)| {
            let p = p.clamp(PROB_EPS, 1.0 - PROB_EPS);
            yi * p.ln() + (1.0 - yi) * (1.0 - p).ln()
        })
        .sum();

    let coefficient = |j: usize, name: &str| {
        let estimate = beta[j];
        let std_error = covariance[(j, j)].max(0.0).sqrt();
        Coefficient {
            name: name.to_string(),
            estimate,
            std_error,
            z_value: if std_error > 0.0 {
                estimate / std_error
            } else {
                f64::NAN
            },
        }
    };

    Ok(LogisticModel {
        intercept: coefficient(0, "intercept"),
        coefficients: names
            .iter()
            .enumerate()
            .map(|(j, name)| coefficient(j + 1, name))
            .collect(),
        iterations,
        converged,
        log_likelihood,
        n_observations: n,
    })
}

/// μ = sigmoid(Xβ)
fn fitted_probabilities(x: &Mat<f64>, beta: &[f64]) -> Vec<f64> {
    (0..x.nrows())
        .map(|i| {
            let eta: f64 = beta.iter().enumerate().map(|(j, b)| x[(i, j)] * b).sum();
            sigmoid(eta)
        })
        .collect()
}

/// Xᵀ W X with W = diag(μ(1-μ))
fn weighted_gram(x: &Mat<f64>, mu: &[f64]) -> Mat<f64> {
    let xw = Mat::<f64>::from_fn(x.nrows(), x.ncols(), |i, j| {
        x[(i, j)] * (mu[i] * (1.0 - mu[i])).max(MIN_WEIGHT)
    });
    x.transpose() * &xw
}

/// Read predictor columns as dense `f64` vectors. Nulls become NaN.
pub fn extract_predictors(df: &DataFrame, names: &[&str]) -> Result<Vec<Vec<f64>>> {
    names
        .iter()
        .map(|name| {
            let column = df
                .column(name)
                .with_context(|| format!("Predictor column '{}' not found", name))?
                .cast(&DataType::Float64)
                .with_context(|| format!("Predictor column '{}' must be numeric", name))?;
            Ok(column
                .f64()?
                .iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect())
        })
        .collect()
}

/// Fit the xG model on `train`: `goal` against the five engineered predictors
pub fn fit_xg_model(train: &DataFrame, options: FitOptions) -> Result<LogisticModel> {
    let columns = extract_predictors(train, &PREDICTORS)?;
    let y: Vec<f64> = extract_predictors(train, &[GOAL])?.remove(0);
    let model = fit_logistic(&columns, &PREDICTORS, &y, options)?;
    Ok(model)
}

/// Score every row of `df` with the model and store the result as `xg`.
pub fn score_dataset(mut df: DataFrame, model: &LogisticModel) -> Result<DataFrame> {
    let names = model.predictor_names();
    let columns = extract_predictors(&df, &names)?;

    let mut row = vec![0.0; names.len()];
    let mut scores: Vec<f64> = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        for (slot, column) in row.iter_mut().zip(&columns) {
            *slot = column[i];
        }
        scores.push(model.predict_proba(&row)?);
    }

    df.with_column(Column::new(XG.into(), scores))?;
    Ok(df)
}
