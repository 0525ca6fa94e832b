//! Decision tree structures
//!
//! Nodes are stored in a flat table indexed by their id. Ids are handed out
//! in append order, which the trainer makes pre-order, so the root is always
//! node 0. Children live in a parallel adjacency list (`[left, right]` for
//! internal nodes, empty for leaves) and parents in a third column.

use crate::errors::{Result, TreeError};

/// A decision tree node (internal or leaf)
///
/// An internal node routes rows with `column < threshold` to its left child
/// and every other row to its right child.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Terminal node carrying a single class label
    Leaf { label: String },

    /// Decision node carrying a split criterion
    Internal { column: String, threshold: f64 },
}

impl Node {
    /// Create a new leaf node
    pub fn leaf(label: impl Into<String>) -> Self {
        Node::Leaf {
            label: label.into(),
        }
    }

    /// Create a new internal (split) node
    pub fn internal(column: impl Into<String>, threshold: f64) -> Self {
        Node::Internal {
            column: column.into(),
            threshold,
        }
    }

    /// Check if this node is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Class label of a leaf
    pub fn label(&self) -> Option<&str> {
        match self {
            Node::Leaf { label } => Some(label),
            Node::Internal { .. } => None,
        }
    }

    /// Split column and threshold of an internal node
    pub fn criterion(&self) -> Option<(&str, f64)> {
        match self {
            Node::Internal { column, threshold } => Some((column, *threshold)),
            Node::Leaf { .. } => None,
        }
    }
}

/// A binary decision tree stored as a node table plus adjacency list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    children: Vec<Vec<usize>>,
    parents: Vec<Option<usize>>,
}

impl DecisionTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node under `parent` and return its id.
    ///
    /// `None` appends the root, which is only legal on an empty tree. A parent
    /// must be an internal node with fewer than two children; the first child
    /// appended becomes its left branch.
    pub fn push(&mut self, node: Node, parent: Option<usize>) -> Result<usize> {
        let id = self.nodes.len();

        match parent {
            None if !self.nodes.is_empty() => {
                return Err(TreeError::InvalidStructure(format!(
                    "node {id} has no parent but the tree already has a root"
                )));
            }
            None => {}
            Some(p) => {
                let parent_node = self.nodes.get(p).ok_or(TreeError::UnknownNode(p))?;
                if parent_node.is_leaf() {
                    return Err(TreeError::InvalidStructure(format!(
                        "leaf {p} cannot take child {id}"
                    )));
                }
                if self.children[p].len() >= 2 {
                    return Err(TreeError::InvalidStructure(format!(
                        "internal node {p} already has two children"
                    )));
                }
                self.children[p].push(id);
            }
        }

        self.nodes.push(node);
        self.children.push(Vec::new());
        self.parents.push(parent);

        Ok(id)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the root node
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Node table in id order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Look up a node by id
    pub fn node(&self, id: usize) -> Result<&Node> {
        self.nodes.get(id).ok_or(TreeError::UnknownNode(id))
    }

    /// Child ids of a node, `[left, right]` for internal nodes
    pub fn children(&self, id: usize) -> Result<&[usize]> {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .ok_or(TreeError::UnknownNode(id))
    }

    /// Parent id of a node, `None` for the root
    pub fn parent(&self, id: usize) -> Result<Option<usize>> {
        self.parents
            .get(id)
            .copied()
            .ok_or(TreeError::UnknownNode(id))
    }

    /// Number of leaf nodes
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Length of the longest root-to-leaf path, in edges
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max_depth = 0;

        // Parents always precede their children in the table.
        for id in 1..self.nodes.len() {
            if let Some(p) = self.parents[id] {
                depths[id] = depths[p] + 1;
                max_depth = max_depth.max(depths[id]);
            }
        }

        max_depth
    }

    /// Validate tree structure
    ///
    /// Checks the root, parent/child agreement, arity (two children for
    /// internal nodes, none for leaves), finite thresholds, and that ids
    /// follow a pre-order walk from the root.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(TreeError::EmptyTree);
        }

        if self.parents[0].is_some() {
            return Err(TreeError::InvalidStructure(
                "root node 0 has a parent".to_string(),
            ));
        }

        for (id, node) in self.nodes.iter().enumerate() {
            let children = &self.children[id];
            match node {
                Node::Leaf { .. } if !children.is_empty() => {
                    return Err(TreeError::InvalidStructure(format!(
                        "leaf {id} has children {children:?}"
                    )));
                }
                Node::Internal { threshold, .. } => {
                    if children.len() != 2 {
                        return Err(TreeError::InvalidStructure(format!(
                            "internal node {id} has {} children",
                            children.len()
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(TreeError::InvalidStructure(format!(
                            "internal node {id} has non-finite threshold"
                        )));
                    }
                }
                Node::Leaf { .. } => {}
            }

            for &child in children {
                if child >= self.nodes.len() {
                    return Err(TreeError::InvalidStructure(format!(
                        "node {id} has out of range child {child}"
                    )));
                }
                if self.parents[child] != Some(id) {
                    return Err(TreeError::InvalidStructure(format!(
                        "child {child} does not point back to parent {id}"
                    )));
                }
            }
        }

        let mut expected = 0usize;
        let mut stack = vec![0usize];
        while let Some(id) = stack.pop() {
            if id != expected {
                return Err(TreeError::InvalidStructure(format!(
                    "node {id} visited at pre-order position {expected}"
                )));
            }
            expected += 1;
            stack.extend(self.children[id].iter().rev());
        }

        if expected != self.nodes.len() {
            return Err(TreeError::InvalidStructure(format!(
                "{} nodes unreachable from the root",
                self.nodes.len() - expected
            )));
        }

        Ok(())
    }

    /// Route a row from the root and return the label of the leaf it lands in.
    ///
    /// `value_of` looks up the row's value for a feature column by name.
    pub fn classify<F>(&self, value_of: F) -> Result<&str>
    where
        F: Fn(&str) -> Option<f64>,
    {
        if self.nodes.is_empty() {
            return Err(TreeError::EmptyTree);
        }

        let mut id = 0usize;

        loop {
            match self.node(id)? {
                Node::Leaf { label } => return Ok(label),
                Node::Internal { column, threshold } => {
                    let value =
                        value_of(column).ok_or_else(|| TreeError::MissingFeature(column.clone()))?;
                    let branch = if value < *threshold { 0 } else { 1 };
                    id = *self.children(id)?.get(branch).ok_or_else(|| {
                        TreeError::InvalidStructure(format!("internal node {id} is missing a child"))
                    })?;
                }
            }
        }
    }
}
