//! Indented outline rendering
//!
//! Walks a tree in pre-order and yields one line per node, indented by two
//! spaces per level. Leaves print as `[Specified: <label>]`, internal nodes
//! as `[<column> < <threshold>]` with the threshold at one decimal place.

use std::fmt;

use crate::errors::Result;
use crate::tree::{DecisionTree, Node};

/// Lazy pre-order iterator over the rendered lines of a (sub)tree.
///
/// Finite; start a new one to render again.
#[derive(Debug, Clone)]
pub struct Render<'a> {
    tree: &'a DecisionTree,
    stack: Vec<(usize, usize)>,
}

impl<'a> Render<'a> {
    /// Render the subtree rooted at `node_id`, treating it as sitting at `depth`
    pub fn new(tree: &'a DecisionTree, node_id: usize, depth: usize) -> Result<Self> {
        tree.node(node_id)?;
        Ok(Self::starting_at(tree, Some((node_id, depth))))
    }

    fn starting_at(tree: &'a DecisionTree, start: Option<(usize, usize)>) -> Self {
        Self {
            tree,
            stack: start.into_iter().collect(),
        }
    }
}

impl Iterator for Render<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        // Ids come from `new` or from child lists, which `push` keeps in range.
        let (Ok(node), Ok(children)) = (self.tree.node(id), self.tree.children(id)) else {
            debug_assert!(false, "outline reached unknown node {id}");
            return None;
        };

        self.stack
            .extend(children.iter().rev().map(|&child| (child, depth + 1)));

        Some(format!("{:indent$}{}", "", line(node), indent = 2 * depth))
    }
}

fn line(node: &Node) -> String {
    match node {
        Node::Leaf { label } => format!("[Specified: {label}]"),
        Node::Internal { column, threshold } => format!("[{column} < {threshold:.1}]"),
    }
}

impl DecisionTree {
    /// Render the whole tree from the root
    pub fn render(&self) -> Render<'_> {
        Render::starting_at(self, (!self.is_empty()).then_some((0, 0)))
    }

    /// Render the subtree under `node_id` starting at indentation `depth`
    pub fn render_from(&self, node_id: usize, depth: usize) -> Result<Render<'_>> {
        Render::new(self, node_id, depth)
    }
}

impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.render() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
