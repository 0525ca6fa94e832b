use std::path::PathBuf;

use entropy_tree_core::TreeError;
use thiserror::Error;

/// Errors returned by the tree trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no viable split found for {rows} rows at depth {depth}")]
    NoViableSplit { depth: usize, rows: usize },

    #[error("maximum tree depth {limit} exceeded")]
    RecursionLimitExceeded { limit: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("output file {} already exists", .0.display())]
    OutputExists(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("tree error: {0}")]
    Tree(#[from] TreeError),
}

/// Result type for trainer operations
pub type Result<T> = std::result::Result<T, TrainerError>;
