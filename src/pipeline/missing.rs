//! Missing value analysis and filling

use anyhow::Result;
use polars::prelude::*;

/// Text written into string columns by [`fill_missing_values`]
pub const MISSING_TEXT_FILL: &str = "False";

/// Analyze missing values in the dataset.
///
/// Returns `(column, missing_ratio)` pairs sorted by ratio descending.
pub fn analyze_missing_values(df: &DataFrame) -> Result<Vec<(String, f64)>> {
    // Handle empty DataFrame
    if df.height() == 0 {
        return Ok(Vec::new());
    }

    let total = df.height() as f64;

    let mut missing_ratios: Vec<(String, f64)> = df
        .get_columns()
        .iter()
        .map(|col| (col.name().to_string(), col.null_count() as f64 / total))
        .collect();

    // Sort by missing ratio descending
    missing_ratios.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    Ok(missing_ratios)
}

/// Columns with at least one missing value
pub fn get_columns_with_missing(missing_ratios: &[(String, f64)]) -> Vec<String> {
    missing_ratios
        .iter()
        .filter(|(_, ratio)| *ratio > 0.0)
        .map(|(name, _)| name.clone())
        .collect()
}

/// Replace every missing value with boolean `false`.
///
/// The fill is not type-aware beyond what each column can hold: booleans get
/// `false`, numbers get `0`, text gets `"False"`. Other dtypes are left as is.
pub fn fill_missing_values(df: DataFrame) -> Result<DataFrame> {
    let fills: Vec<Expr> = df
        .get_columns()
        .iter()
        .filter(|c| c.null_count() > 0)
        .filter_map(|c| {
            let name = c.name().as_str();
            let dtype = c.dtype();
            let fill = if dtype == &DataType::Boolean {
                lit(false)
            } else if dtype.is_primitive_numeric() {
                lit(0).cast(dtype.clone())
            } else if dtype == &DataType::String {
                lit(MISSING_TEXT_FILL)
            } else if dtype == &DataType::Null {
                // All-null column: nothing to infer from, treat as boolean
                return Some(col(name).cast(DataType::Boolean).fill_null(lit(false)));
            } else {
                return None;
            };
            Some(col(name).fill_null(fill))
        })
        .collect();

    if fills.is_empty() {
        return Ok(df);
    }

    let filled = df.lazy().with_columns(fills).collect()?;
    Ok(filled)
}
