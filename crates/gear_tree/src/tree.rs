//! The arena that owns every node of a tree

use std::iter;
use std::ops::{Index, IndexMut};

use crate::error::{Error, Result};
use crate::node::{Node, NodeData, NodeId, NodeKind};

/// A tree of branch and leaf nodes rooted at a single branch.
///
/// The tree owns every node it has created, attached or not. Parent links are
/// plain [`NodeId`] handles used for upward traversal only.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
    root: NodeId,
}

impl<T> Tree<T> {
    /// Create a tree holding a single, empty root branch
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node::branch(root_name.into())],
            root: NodeId::from(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes owned by the tree, including detached ones
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.nodes.get_mut(id.index())
    }

    /// Create a standalone branch. Use [`Tree::add_child`] to attach it.
    pub fn new_branch(&mut self, name: impl Into<String>) -> NodeId {
        self.push(Node::branch(name.into()))
    }

    /// Create a standalone leaf. Use [`Tree::add_child`] to attach it.
    pub fn new_leaf(&mut self, name: impl Into<String>, contents: T) -> NodeId {
        self.push(Node::leaf(name.into(), contents))
    }

    fn push(&mut self, node: Node<T>) -> NodeId {
        self.nodes.push(node);
        NodeId::from(self.nodes.len() - 1)
    }

    /// Attach `child` to the end of the matching child list of `parent`.
    ///
    /// The child must not already have a parent; detach it with
    /// [`Tree::remove_child`] first when moving it around.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        let child_node = self.get(child).ok_or(Error::UnknownNode(child))?;
        if child_node.parent.is_some() {
            return Err(Error::AlreadyAttached(child));
        }
        let kind = child_node.kind();

        if !self.get(parent).ok_or(Error::UnknownNode(parent))?.is_branch() {
            return Err(Error::NotABranch(parent));
        }

        if child == self.root || self.ancestors(parent).any(|id| id == child) {
            return Err(Error::WouldCycle(child));
        }

        if let NodeData::Branch { branches, leaves } = &mut self.nodes[parent.index()].data {
            match kind {
                NodeKind::Branch => branches.push(child),
                NodeKind::Leaf => leaves.push(child),
            }
        }
        self.nodes[child.index()].parent = Some(parent);

        Ok(child)
    }

    /// Create a branch and attach it to `parent`
    pub fn add_branch(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        let child = self.new_branch(name);
        self.add_child(parent, child)
    }

    /// Create a leaf and attach it to `parent`
    pub fn add_leaf(&mut self, parent: NodeId, name: impl Into<String>, contents: T) -> Result<NodeId> {
        let child = self.new_leaf(name, contents);
        self.add_child(parent, child)
    }

    /// First child of `parent` called `name`, searching branches before leaves
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        let node = self.get(parent)?;
        node.branches()
            .iter()
            .chain(node.leaves())
            .copied()
            .find(|id| self.nodes[id.index()].name == name)
    }

    /// Child of `parent` at `index`, where branches come before leaves
    pub fn child_at(&self, parent: NodeId, index: usize) -> Result<NodeId> {
        let node = self.get(parent).ok_or(Error::UnknownNode(parent))?;
        if !node.is_branch() {
            return Err(Error::NotABranch(parent));
        }

        let branches = node.branches();
        if index < branches.len() {
            return Ok(branches[index]);
        }

        node.leaves()
            .get(index - branches.len())
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: node.child_count(),
            })
    }

    /// Detach `child` from `parent`, returning whether it was a child of it.
    ///
    /// The node stays owned by the tree and can be attached again.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(kind) = self.get(child).map(Node::kind) else {
            return false;
        };

        let removed = match self.nodes.get_mut(parent.index()).map(|n| &mut n.data) {
            Some(NodeData::Branch { branches, leaves }) => {
                let list = match kind {
                    NodeKind::Branch => branches,
                    NodeKind::Leaf => leaves,
                };
                match list.iter().position(|id| *id == child) {
                    Some(position) => {
                        list.remove(position);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        };

        if removed {
            self.nodes[child.index()].parent = None;
        }
        removed
    }

    /// Detach the child of `parent` at `index`, using the same indexing as
    /// [`Tree::child_at`]
    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> Result<NodeId> {
        let child = self.child_at(parent, index)?;
        self.remove_child(parent, child);
        Ok(child)
    }

    /// Resolve a slash separated path relative to `from`.
    ///
    /// Every segment but the last must name a branch. The last segment is looked
    /// up among the branches or the leaves depending on `kind`.
    pub fn find_child_by_path(&self, from: NodeId, path: &str, kind: NodeKind) -> Option<NodeId> {
        let mut current = from;
        let mut segments = path.split('/').peekable();

        while let Some(segment) = segments.next() {
            let node = self.get(current)?;
            let named = |id: &NodeId| self.nodes[id.index()].name == segment;

            if segments.peek().is_none() {
                let pool = match kind {
                    NodeKind::Branch => node.branches(),
                    NodeKind::Leaf => node.leaves(),
                };
                return pool.iter().copied().find(named);
            }

            current = node.branches().iter().copied().find(named)?;
        }

        None
    }

    /// Direct children of `id`, branches first
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(|node| node.branches().iter().chain(node.leaves()).copied())
    }

    /// Every node below `id` in depth-first order, each branch's branches before its leaves
    pub fn descendants(&self, id: NodeId) -> Descendants<'_, T> {
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// `id` followed by each of its ancestors up to the topmost attached node
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        iter::successors(self.get(id).map(|_| id), |current| {
            self.get(*current).and_then(Node::parent)
        })
    }

    /// Whether `id` can be reached from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.ancestors(id).last() == Some(self.root)
    }

    /// Slash separated path of `id` relative to the root.
    ///
    /// The root itself maps to an empty string; detached nodes have no path.
    pub fn path_of(&self, id: NodeId) -> Option<String> {
        if !self.is_attached(id) {
            return None;
        }

        let mut names: Vec<&str> = self
            .ancestors(id)
            .take_while(|current| *current != self.root)
            .map(|current| self.nodes[current.index()].name.as_str())
            .collect();
        names.reverse();

        Some(names.join("/"))
    }
}

impl<T> Index<NodeId> for Tree<T> {
    type Output = Node<T>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.index()]
    }
}

impl<T> IndexMut<NodeId> for Tree<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.index()]
    }
}

/// Depth-first iterator created by [`Tree::descendants`]
pub struct Descendants<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<NodeId>,
}

impl<T> Iterator for Descendants<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(self.tree.children(id));
        self.stack[start..].reverse();
        Some(id)
    }
}
