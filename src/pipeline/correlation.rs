//! Correlation matrix over the numeric columns of the engineered table

use anyhow::Result;
use faer::Mat;
use polars::prelude::*;
use rayon::prelude::*;

/// Pearson correlation matrix with the names of its columns
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Mat<f64>,
}

impl CorrelationMatrix {
    /// Correlation between two named columns, if both are present
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[(i, j)])
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Represents a correlated pair of features
#[derive(Debug, Clone)]
pub struct CorrelatedPair {
    pub feature1: String,
    pub feature2: String,
    pub correlation: f64,
}

/// Compute the correlation matrix of all numeric columns.
///
/// Algorithm:
/// 1. Standardize each column: z = (x - mean) / (std * sqrt(n))
/// 2. Correlation matrix: R = Z^T * Z
///
/// Nulls contribute 0 after standardization. Constant or all-null columns are
/// left out of the matrix.
pub fn compute_correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix> {
    // Get numeric columns only - cast all to Float64 for correlation calculation
    let float_columns: Vec<(String, Column)> = df
        .get_columns()
        .iter()
        .filter(|col| col.dtype().is_primitive_numeric())
        .filter_map(|col| {
            col.cast(&DataType::Float64)
                .ok()
                .map(|c| (col.name().to_string(), c))
        })
        .collect();

    let n_rows = df.height();

    let standardized_cols: Vec<Option<Vec<f64>>> = float_columns
        .par_iter()
        .map(|(_, col)| standardize(col))
        .collect();

    // Filter out columns that failed (constant or all null)
    let valid_cols: Vec<(String, Vec<f64>)> = float_columns
        .iter()
        .zip(standardized_cols)
        .filter_map(|((name, _), opt)| opt.map(|v| (name.clone(), v)))
        .collect();

    let n_valid_cols = valid_cols.len();

    // Build the standardized data matrix Z (n_rows x n_valid_cols)
    let mut z = Mat::<f64>::zeros(n_rows, n_valid_cols);
    for (col_idx, (_, col_data)) in valid_cols.iter().enumerate() {
        for (row_idx, &val) in col_data.iter().enumerate() {
            z[(row_idx, col_idx)] = val;
        }
    }

    let values = z.transpose() * &z;

    Ok(CorrelationMatrix {
        columns: valid_cols.into_iter().map(|(name, _)| name).collect(),
        values,
    })
}

/// Scale a column so that the dot product of two scaled columns is their correlation
fn standardize(col: &Column) -> Option<Vec<f64>> {
    let ca = col.f64().ok()?;

    let (sum, count) = ca
        .iter()
        .flatten()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));

    if count == 0 {
        return None;
    }
    let mean = sum / count as f64;

    let sum_sq_dev: f64 = ca
        .iter()
        .flatten()
        .filter(|x| x.is_finite())
        .map(|x| (x - mean) * (x - mean))
        .sum();

    let std = (sum_sq_dev / count as f64).sqrt();
    if std == 0.0 {
        return None; // Constant column - skip
    }

    let scale = std * (count as f64).sqrt();
    Some(
        ca.iter()
            .map(|val| match val {
                Some(x) if x.is_finite() => (x - mean) / scale,
                _ => 0.0,
            })
            .collect(),
    )
}

/// Extract the `limit` strongest off-diagonal pairs, sorted by |r| descending
pub fn strongest_correlations(matrix: &CorrelationMatrix, limit: usize) -> Vec<CorrelatedPair> {
    let n = matrix.len();
    let mut pairs = Vec::new();

    // Extract upper triangle
    for i in 0..n {
        for j in (i + 1)..n {
            let corr = matrix.values[(i, j)];
            if !corr.is_nan() {
                pairs.push(CorrelatedPair {
                    feature1: matrix.columns[i].clone(),
                    feature2: matrix.columns[j].clone(),
                    correlation: corr,
                });
            }
        }
    }

    // Sort by absolute correlation descending
    pairs.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pairs.truncate(limit);

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardize_constant_column_is_skipped() {
        let col = Column::new("c".into(), vec![3.0f64; 5]);
        assert!(standardize(&col).is_none());
    }

    #[test]
    fn test_standardized_column_has_unit_norm() {
        let col = Column::new("c".into(), vec![1.0f64, 2.0, 3.0, 4.0]);
        let z = standardize(&col).unwrap();
        let norm: f64 = z.iter().map(|v| v * v).sum();
        assert!((norm - 1.0).abs() < 1e-12);
    }
}
