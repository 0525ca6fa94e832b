//! Error types for the tree model

use thiserror::Error;

/// Errors raised while assembling, checking or walking a tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// The tree has no root
    #[error("Tree has no nodes")]
    EmptyTree,

    /// A node id outside the node table
    #[error("Unknown node id: {0}")]
    UnknownNode(usize),

    /// Parent/child links are inconsistent
    #[error("Invalid tree structure: {0}")]
    InvalidStructure(String),

    /// A routed row has no value for a split column
    #[error("Row has no value for feature column `{0}`")]
    MissingFeature(String),
}

/// Result type for tree operations
pub type Result<T> = std::result::Result<T, TreeError>;
