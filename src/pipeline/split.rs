//! Seeded train/test partitioning

use anyhow::Result;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Default seed for the partition
pub const DEFAULT_SEED: u64 = 42;

/// Default share of rows in the training partition
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;

/// Row indices of the two partitions. Every row lands in exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<IdxSize>,
    pub test: Vec<IdxSize>,
}

impl TrainTestSplit {
    /// Shuffle `0..n_rows` with `seed` and put `round(n_rows * train_fraction)` rows in training.
    pub fn new(n_rows: usize, train_fraction: f64, seed: u64) -> Self {
        let fraction = train_fraction.clamp(0.0, 1.0);
        let n_train = ((n_rows as f64) * fraction).round() as usize;

        let mut indices: Vec<IdxSize> = (0..n_rows as IdxSize).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let test = indices.split_off(n_train.min(n_rows));

        Self {
            train: indices,
            test,
        }
    }

    /// Materialize both partitions from `df`
    pub fn apply(&self, df: &DataFrame) -> Result<(DataFrame, DataFrame)> {
        let train = df.take(&IdxCa::from_vec("train".into(), self.train.clone()))?;
        let test = df.take(&IdxCa::from_vec("test".into(), self.test.clone()))?;
        Ok((train, test))
    }
}
