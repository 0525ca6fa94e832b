//! Entropy Tree Core - binary decision tree model
//!
//! Holds the flat node table produced by `entropy-tree-trainer`, routes rows
//! through it, and renders it as an indented outline.
//!
//! Modules:
//! - `tree`: node table, adjacency list, validation and classification
//! - `render`: lazy pre-order outline of a tree
//! - `errors`: structural and lookup errors

pub mod errors;
pub mod render;
pub mod tree;

pub use errors::{Result, TreeError};
pub use render::Render;
pub use tree::{DecisionTree, Node};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
