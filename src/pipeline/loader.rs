//! Dataset loader for CSV and Parquet files

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use super::error::FeatureError;
use crate::utils::{create_spinner, finish_with_success};

/// Load a dataset lazily from a file (CSV or Parquet based on extension)
///
/// `infer_schema_length` of 0 means a full table scan for CSV type inference.
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<LazyFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(schema_length)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    Ok(lf)
}

/// Load a dataset into memory with a spinner.
///
/// Returns the DataFrame with its row count, column count and estimated size in MB.
pub fn load_dataset_with_progress(
    path: &Path,
    infer_schema_length: usize,
) -> Result<(DataFrame, usize, usize, f64)> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("dataset");
    let spinner = create_spinner(&format!("Loading {}...", file_name));

    let df = load_dataset(path, infer_schema_length)?
        .collect()
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);

    finish_with_success(&spinner, &format!("Loaded {}", file_name));

    Ok((df, rows, cols, memory_mb))
}

/// Read only the column names of a dataset
pub fn get_column_names(path: &Path) -> Result<Vec<String>> {
    let schema = load_dataset(path, 100)?
        .collect_schema()
        .with_context(|| format!("Failed to read schema: {}", path.display()))?;
    Ok(schema.iter_names().map(|s| s.to_string()).collect())
}

/// Fail with the available columns listed if any of `columns` is absent
pub fn require_columns(df: &DataFrame, columns: &[&str], table: &str) -> Result<(), FeatureError> {
    let available: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for column in columns {
        if !available.iter().any(|c| c == column) {
            return Err(FeatureError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
                available,
            });
        }
    }
    Ok(())
}

/// Split a packed `"[x, y]"` location column into two Float64 columns.
///
/// Does nothing when both `x` and `y` already exist or when `packed` is absent.
pub fn expand_location_column(df: &mut DataFrame, packed: &str, x: &str, y: &str) -> Result<()> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let has = |name: &str| names.iter().any(|c| c == name);

    if (has(x) && has(y)) || !has(packed) {
        return Ok(());
    }

    let column = df
        .column(packed)
        .and_then(|c| c.cast(&DataType::String))
        .map_err(|_| FeatureError::BadLocation {
            column: packed.to_string(),
            value: "<non-text column>".to_string(),
        })?;
    let values = column.str().map_err(|_| FeatureError::BadLocation {
        column: packed.to_string(),
        value: "<non-text column>".to_string(),
    })?;

    let mut xs: Vec<Option<f64>> = Vec::with_capacity(values.len());
    let mut ys: Vec<Option<f64>> = Vec::with_capacity(values.len());

    for value in values.iter() {
        match value {
            Some(raw) => {
                let (px, py) = parse_location(raw).ok_or_else(|| FeatureError::BadLocation {
                    column: packed.to_string(),
                    value: raw.to_string(),
                })?;
                xs.push(Some(px));
                ys.push(Some(py));
            }
            None => {
                xs.push(None);
                ys.push(None);
            }
        }
    }

    df.with_column(Column::new(x.into(), xs))?;
    df.with_column(Column::new(y.into(), ys))?;
    Ok(())
}

/// Parse `"[110.0, 40.0]"` (brackets optional, extra dimensions ignored)
fn parse_location(raw: &str) -> Option<(f64, f64)> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let mut parts = trimmed.split(',').map(|p| p.trim().parse::<f64>());
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    Some((x, y))
}
