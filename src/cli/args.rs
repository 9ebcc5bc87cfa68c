//! Command-line argument definitions using clap

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::pipeline::{GoalkeeperPolicy, DEFAULT_SEED};

/// Name of the plot directory created next to the shot table
pub const DEFAULT_PLOT_DIR: &str = "xg_plots";

/// shotxg - Fit an expected-goals model from shots and freeze frames
#[derive(Parser, Debug)]
#[command(name = "shotxg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shot table (CSV or Parquet), one row per shot
    #[arg(short, long)]
    pub shots: PathBuf,

    /// Freeze-frame table (CSV or Parquet), one row per player per shot
    #[arg(short, long)]
    pub freeze_frames: PathBuf,

    /// Directory for the rendered plots.
    /// Defaults to an 'xg_plots' directory next to the shot table.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Team for the per-match goals vs. predicted goals plot.
    /// Defaults to the team with the most shots.
    #[arg(short, long)]
    pub team: Option<String>,

    /// JSON file overriding the expected column names of either table
    #[arg(long)]
    pub columns: Option<PathBuf>,

    /// Seed for the train/test partition
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Share of shots used to fit the model (0.0 to 1.0, exclusive)
    #[arg(long, default_value = "0.8", value_parser = validate_train_fraction)]
    pub train_fraction: f64,

    /// xG at or above which a shot counts as a predicted goal in the match comparison
    #[arg(long, default_value = "0.3", value_parser = validate_xg_threshold)]
    pub xg_threshold: f64,

    /// What to do when a freeze frame has no or several opposing goalkeepers.
    /// Options: "first" (default, first keeper wins; none means keeper distance 0)
    /// or "strict" (fail the run)
    #[arg(long, default_value = "first")]
    pub goalkeeper_policy: GoalkeeperPolicy,

    /// Number of bins in the xG distribution plot
    #[arg(long, default_value = "20", value_parser = validate_histogram_bins)]
    pub histogram_bins: usize,

    /// Share of points in each local fit of the xG vs. distance curve (0.0 exclusive to 1.0)
    #[arg(long, default_value = "0.3", value_parser = validate_smoothing_frac)]
    pub smoothing_frac: f64,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Overwrite existing plots without asking
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,
}

impl Cli {
    /// Plot directory, deriving it from the shot table when not given
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            let parent = self
                .shots
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            parent.join(DEFAULT_PLOT_DIR)
        })
    }
}

fn parse_number(s: &str) -> Result<f64, String> {
    s.parse().map_err(|_| format!("'{}' is not a valid number", s))
}

/// Validator for train_fraction parameter
fn validate_train_fraction(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "train_fraction must be between 0.0 and 1.0 (exclusive), got {}",
            value
        ))
    }
}

/// Validator for xg_threshold parameter
fn validate_xg_threshold(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "xg_threshold must be between 0.0 and 1.0, got {}",
            value
        ))
    }
}

/// Validator for smoothing_frac parameter
fn validate_smoothing_frac(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "smoothing_frac must be greater than 0.0 and at most 1.0, got {}",
            value
        ))
    }
}

/// Validator for histogram_bins parameter
fn validate_histogram_bins(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid bin count", s))?;
    if value == 0 {
        Err("histogram_bins must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
