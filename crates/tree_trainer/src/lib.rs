//! Entropy Tree Trainer - recursive information-gain decision tree builder
//!
//! Builds a binary classification tree over a small tabular dataset by
//! greedily choosing `column < threshold` splits with the highest entropy
//! reduction, with thresholds stepped at a fixed granularity. Builds are
//! deterministic: the same table and configuration always give the same tree.

pub mod bounds;
pub mod builder;
pub mod config;
pub mod dataset;
pub mod entropy;
pub mod errors;
pub mod predict;

use entropy_tree_core::DecisionTree;
use std::path::Path;

pub use bounds::{Bound, BoundTable};
pub use builder::{build_tree, SplitCandidate, TreeBuilder};
pub use config::BuilderConfig;
pub use dataset::{CsvOptions, Dataset, FeatureTable, Subset, DEFAULT_LABEL_COLUMN};
pub use entropy::{entropy, gain};
pub use errors::{Result, TrainerError};
pub use predict::{accuracy, classify_table, Prediction};

/// Build a tree directly from a CSV file
pub fn build_tree_from_csv(
    path: &Path,
    options: &CsvOptions,
    config: BuilderConfig,
) -> Result<DecisionTree> {
    let dataset = Dataset::from_csv(path, options)?;
    build_tree(&dataset, config)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
