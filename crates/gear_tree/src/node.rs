//! Node handles and per-node storage.

use derive_more::{Display, From};

/// Stable handle to a node stored in a [`crate::Tree`].
///
/// Handles are only meaningful for the tree that created them.
#[derive(Debug, Display, From, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("#{_0}")]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node inside the tree's arena
    pub const fn index(self) -> usize {
        self.0
    }
}

/// The two shapes a node can take
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A node holding other nodes
    Branch,

    /// A node holding a payload
    Leaf,
}

/// Variant specific storage of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData<T> {
    /// Children are split by kind, both lists keep insertion order
    Branch {
        branches: Vec<NodeId>,
        leaves: Vec<NodeId>,
    },

    /// An opaque payload
    Leaf { contents: T },
}

/// A single entry of a [`crate::Tree`]
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) data: NodeData<T>,
}

impl<T> Node<T> {
    pub(crate) fn branch(name: String) -> Self {
        Self {
            name,
            parent: None,
            data: NodeData::Branch {
                branches: Vec::new(),
                leaves: Vec::new(),
            },
        }
    }

    pub(crate) fn leaf(name: String, contents: T) -> Self {
        Self {
            name,
            parent: None,
            data: NodeData::Leaf { contents },
        }
    }

    /// Get the name of the node
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The branch this node is attached to, if any
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Branch { .. } => NodeKind::Branch,
            NodeData::Leaf { .. } => NodeKind::Leaf,
        }
    }

    pub fn is_branch(&self) -> bool {
        self.kind() == NodeKind::Branch
    }

    pub fn is_leaf(&self) -> bool {
        self.kind() == NodeKind::Leaf
    }

    pub fn data(&self) -> &NodeData<T> {
        &self.data
    }

    /// The payload of a leaf, `None` for branches
    pub fn contents(&self) -> Option<&T> {
        match &self.data {
            NodeData::Leaf { contents } => Some(contents),
            NodeData::Branch { .. } => None,
        }
    }

    /// Mutable access to the payload of a leaf, `None` for branches
    pub fn contents_mut(&mut self) -> Option<&mut T> {
        match &mut self.data {
            NodeData::Leaf { contents } => Some(contents),
            NodeData::Branch { .. } => None,
        }
    }

    /// Child branches in insertion order, empty for leaves
    pub fn branches(&self) -> &[NodeId] {
        match &self.data {
            NodeData::Branch { branches, .. } => branches,
            NodeData::Leaf { .. } => &[],
        }
    }

    /// Child leaves in insertion order, empty for leaves
    pub fn leaves(&self) -> &[NodeId] {
        match &self.data {
            NodeData::Branch { leaves, .. } => leaves,
            NodeData::Leaf { .. } => &[],
        }
    }

    /// Combined number of branch and leaf children
    pub fn child_count(&self) -> usize {
        self.branches().len() + self.leaves().len()
    }

    pub fn has_children(&self) -> bool {
        self.child_count() > 0
    }
}
