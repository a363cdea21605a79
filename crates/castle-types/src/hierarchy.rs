//! Generalization hierarchies for categorical attributes.
//!
//! A hierarchy is a rooted tree whose leaves are the raw categorical values
//! and whose inner nodes are progressively coarser generalizations, e.g.
//!
//! ```text
//! Any
//! ├── Europe
//! │   ├── Germany
//! │   └── France
//! └── Asia
//!     └── Japan
//! ```
//!
//! Generalizing a set of values means replacing them with their lowest
//! common ancestor; the information lost is proportional to how many
//! leaves that ancestor covers.
//!
//! # Example
//!
//! ```
//! use castle_types::{Hierarchy, HierarchyNode};
//!
//! let tree = Hierarchy::new(HierarchyNode::new("Any", vec![
//!     HierarchyNode::new("Europe", vec![
//!         HierarchyNode::leaf("Germany"),
//!         HierarchyNode::leaf("France"),
//!     ]),
//!     HierarchyNode::new("Asia", vec![HierarchyNode::leaf("Japan")]),
//! ])).unwrap();
//!
//! let de = tree.node("Germany").unwrap();
//! let fr = tree.node("France").unwrap();
//! let lca = tree.lowest_common_ancestor(de, fr);
//! assert_eq!(tree.label(lca), "Europe");
//! assert_eq!(tree.leaf_count(lca), 2);
//! assert_eq!(tree.total_leaves(), 3);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Nested serde form of a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn new(label: impl Into<String>, children: Vec<HierarchyNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    pub fn leaf(label: impl Into<String>) -> Self {
        Self::new(label, Vec::new())
    }
}

/// Index of a node inside its [`Hierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    label: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
    leaves: usize,
}

/// Flattened, immutable generalization tree.
///
/// Nodes are stored in pre-order, so every node's descendants have larger
/// ids than the node itself. The root is always `NodeId(0)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HierarchyNode", into = "HierarchyNode")]
pub struct Hierarchy {
    nodes: Vec<Entry>,
    by_label: HashMap<String, NodeId>,
}

impl Hierarchy {
    /// Builds a hierarchy, rejecting duplicate labels.
    pub fn new(root: HierarchyNode) -> Result<Self, ConfigError> {
        let mut nodes: Vec<Entry> = Vec::new();
        let mut by_label = HashMap::new();
        let mut stack: Vec<(&HierarchyNode, Option<NodeId>, usize)> = vec![(&root, None, 0)];

        while let Some((node, parent, depth)) = stack.pop() {
            let id = NodeId(nodes.len());
            if by_label.insert(node.label.clone(), id).is_some() {
                return Err(ConfigError::DuplicateHierarchyLabel(node.label.clone()));
            }
            nodes.push(Entry {
                label: node.label.clone(),
                parent,
                children: Vec::with_capacity(node.children.len()),
                depth,
                leaves: 0,
            });
            if let Some(p) = parent {
                nodes[p.0].children.push(id);
            }
            // Reverse so children pop in declaration order
            for child in node.children.iter().rev() {
                stack.push((child, Some(id), depth + 1));
            }
        }

        // Pre-order: visiting in reverse settles children before parents
        for i in (0..nodes.len()).rev() {
            if nodes[i].children.is_empty() {
                nodes[i].leaves = 1;
            }
            if let Some(p) = nodes[i].parent {
                nodes[p.0].leaves += nodes[i].leaves;
            }
        }

        Ok(Self { nodes, by_label })
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Looks up the node carrying `label`.
    pub fn node(&self, label: &str) -> Option<NodeId> {
        self.by_label.get(label).copied()
    }

    pub fn label(&self, node: NodeId) -> &str {
        &self.nodes[node.0].label
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn depth(&self, node: NodeId) -> usize {
        self.nodes[node.0].depth
    }

    /// Number of leaves under `node` (1 for a leaf).
    pub fn leaf_count(&self, node: NodeId) -> usize {
        self.nodes[node.0].leaves
    }

    pub fn total_leaves(&self) -> usize {
        self.leaf_count(self.root())
    }

    pub fn lowest_common_ancestor(&self, a: NodeId, b: NodeId) -> NodeId {
        let (mut a, mut b) = (a, b);
        while self.depth(a) > self.depth(b) {
            a = self.nodes[a.0].parent.unwrap_or(a);
        }
        while self.depth(b) > self.depth(a) {
            b = self.nodes[b.0].parent.unwrap_or(b);
        }
        while a != b {
            match (self.parent(a), self.parent(b)) {
                (Some(pa), Some(pb)) => {
                    a = pa;
                    b = pb;
                }
                _ => return self.root(),
            }
        }
        a
    }

    fn to_node(&self, id: NodeId) -> HierarchyNode {
        let entry = &self.nodes[id.0];
        HierarchyNode::new(
            entry.label.clone(),
            entry.children.iter().map(|&c| self.to_node(c)).collect(),
        )
    }
}

impl TryFrom<HierarchyNode> for Hierarchy {
    type Error = ConfigError;

    fn try_from(root: HierarchyNode) -> Result<Self, Self::Error> {
        Self::new(root)
    }
}

impl From<Hierarchy> for HierarchyNode {
    fn from(hierarchy: Hierarchy) -> Self {
        hierarchy.to_node(hierarchy.root())
    }
}
