//! Parsed constituency trees.
//!
//! A [`Tree`] is an arena of [`TreeNode`]s addressed by [`NodeId`]. Nodes are
//! stored in preorder, so the root is always `NodeId(0)` and every parent
//! precedes its children. Edges are index based; a node is owned by exactly
//! one parent and is never reparented after parsing.

use crate::error::ParseError;
use std::fmt;
use std::ops::Range;

/// Index of a node in its tree's arena (preorder position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// The three forms of a node label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// As written in the input, including the special root form.
    pub raw: String,
    /// Suitable for output: the raw label with the root wrapper removed.
    pub display: String,
    /// Lexicon lookup key: display label minus disambiguation markers.
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub label: Label,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Byte span of the node in the input.
    pub span: Range<usize>,
    /// Whether the node was written as `[.label ... ]` rather than a bare token.
    pub bracketed: bool,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    /// Parse a qtree bracket string.
    pub fn parse(input: &str) -> Result<Tree, ParseError> {
        crate::engine::parse_tree(input)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { nodes: Vec::with_capacity(capacity) }
    }

    pub(crate) fn push(&mut self, node: TreeNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in preorder.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes.iter().enumerate().map(|(idx, node)| (NodeId(idx), node))
    }

    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter().filter(|(_, node)| node.is_leaf()).map(|(id, _)| id)
    }

    /// Raw labels in preorder (bracket order).
    pub fn labels(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.label.raw.as_str()).collect()
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut depth = vec![0usize; self.nodes.len()];
        let mut height = 0;
        // Preorder guarantees a parent's depth is known before its children.
        for (id, node) in self.iter() {
            if let Some(parent) = node.parent {
                depth[id.0] = depth[parent.0] + 1;
                height = height.max(depth[id.0]);
            }
        }
        height
    }

    /// Serialize back into bracket notation using the raw labels.
    pub fn to_bracket(&self) -> String {
        let mut out = String::new();
        if !self.is_empty() {
            self.write_bracket(self.root(), &mut out);
        }
        out
    }

    fn write_bracket(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        if !node.bracketed {
            out.push_str(&node.label.raw);
            return;
        }
        out.push_str("[.");
        out.push_str(&node.label.raw);
        for &child in &node.children {
            out.push(' ');
            self.write_bracket(child, out);
        }
        out.push_str(" ]");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_bracket_keeps_raw_labels_and_bare_leaves() {
        let input = r"[.\node(top){S }; [.NP^1 [.Andrew ] ] [.VP sleeps ] ]";
        let tree = Tree::parse(input).unwrap();
        assert_eq!(tree.to_bracket(), input);
    }

    #[test]
    fn single_bracket_is_a_one_node_tree() {
        let tree = Tree::parse("[.Andrew ]").unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.leaves().collect::<Vec<_>>(), vec![tree.root()]);
    }

    #[test]
    fn node_ids_display_as_preorder_positions() {
        assert_eq!(NodeId(7).to_string(), "n7");
        assert_eq!(NodeId(7).index(), 7);
    }
}
