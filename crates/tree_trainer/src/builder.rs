//! Recursive entropy tree builder
//!
//! Grows a binary tree by greedily picking, at every impure subset, the
//! `(column, threshold)` pair with the highest information gain and
//! partitioning the rows on it. Nodes are appended in pre-order: a split is
//! appended, then its whole left subtree, then its right subtree.

use entropy_tree_core::{DecisionTree, Node};
use tracing::{debug, info};

use crate::bounds::BoundTable;
use crate::config::BuilderConfig;
use crate::dataset::{Dataset, Subset};
use crate::entropy::gain;
use crate::errors::{Result, TrainerError};

/// Winning split criterion for a subset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCandidate {
    /// Feature index
    pub column: usize,
    pub threshold: f64,
    pub gain: f64,
}

/// Build context owning the tree under construction
pub struct TreeBuilder<'a> {
    dataset: &'a Dataset,
    config: BuilderConfig,
    tree: DecisionTree,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(dataset: &'a Dataset, config: BuilderConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            dataset,
            config,
            tree: DecisionTree::new(),
        })
    }

    /// Build the tree over the whole dataset
    pub fn build(mut self) -> Result<DecisionTree> {
        if self.dataset.is_empty() {
            return Err(TrainerError::InvalidInput("dataset is empty".to_string()));
        }

        let bounds = BoundTable::for_dataset(self.dataset, &self.config)?;
        let root = Subset::full(self.dataset);

        self.grow(&root, &bounds, None, 0)?;

        info!(
            nodes = self.tree.len(),
            leaves = self.tree.leaf_count(),
            depth = self.tree.depth(),
            "Tree built"
        );

        Ok(self.tree)
    }

    /// Append the subtree for `subset` under `parent` and return its root id
    fn grow(
        &mut self,
        subset: &Subset<'a>,
        bounds: &BoundTable,
        parent: Option<usize>,
        depth: usize,
    ) -> Result<usize> {
        if depth > self.config.max_depth {
            return Err(TrainerError::RecursionLimitExceeded {
                limit: self.config.max_depth,
            });
        }

        if let Some(label) = subset.single_class() {
            let id = self.tree.push(Node::leaf(label), parent)?;
            debug!(id, depth, label, rows = subset.len(), "Leaf");
            return Ok(id);
        }

        let no_split = || TrainerError::NoViableSplit {
            depth,
            rows: subset.len(),
        };

        if subset.is_empty() || bounds.is_exhausted() {
            return Err(no_split());
        }

        let split = self.find_best_split(subset, bounds).ok_or_else(no_split)?;
        let (left, right) = subset.partition(split.column, split.threshold);

        // An empty side would need a leaf with no label.
        if left.is_empty() || right.is_empty() {
            return Err(no_split());
        }

        let column = &self.dataset.feature_names[split.column];
        let index = self
            .tree
            .push(Node::internal(column.as_str(), split.threshold), parent)?;
        debug!(
            id = index,
            depth,
            column = column.as_str(),
            threshold = split.threshold,
            gain = split.gain,
            rows = subset.len(),
            "Split"
        );

        let left_bounds = bounds.with_high(split.column, split.threshold - self.config.step);
        self.grow(&left, &left_bounds, Some(index), depth + 1)?;

        let right_bounds = bounds.with_low(split.column, split.threshold);
        self.grow(&right, &right_bounds, Some(index), depth + 1)?;

        Ok(index)
    }

    /// Highest-gain split over every feature and candidate threshold.
    ///
    /// Ties keep the first pair seen, scanning columns in schema order and
    /// thresholds in ascending order. `None` when no column has a candidate.
    pub fn find_best_split(
        &self,
        subset: &Subset<'_>,
        bounds: &BoundTable,
    ) -> Option<SplitCandidate> {
        let mut best: Option<SplitCandidate> = None;

        for column in 0..self.dataset.feature_count() {
            for threshold in bounds.get(column).candidates(self.config.step) {
                let gain = gain(subset, column, threshold);

                if best.map_or(true, |current| gain > current.gain) {
                    best = Some(SplitCandidate {
                        column,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

/// Build a tree for `dataset` with `config`
pub fn build_tree(dataset: &Dataset, config: BuilderConfig) -> Result<DecisionTree> {
    TreeBuilder::new(dataset, config)?.build()
}
