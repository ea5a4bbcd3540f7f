//! An in-memory, filesystem-like tree used to hold the contents of archive files.
//!
//! Every node has a name and an optional parent, and is either a **branch**
//! (a directory) or a **leaf** (a file carrying a payload). Nodes live in an arena
//! owned by [`Tree`] and are addressed through [`NodeId`] handles, so parent links
//! never own anything and nodes can be detached and re-attached freely.
//!
//! Branches keep their branch children and leaf children in two separate lists.
//! Index based access treats the branch list as coming before the leaf list:
//!
//! ```text
//! root
//! ├── sub/        index 0 (branch list)
//! ├── other/      index 1 (branch list)
//! ├── a.bin       index 2 (leaf list, position 0)
//! └── b.bin       index 3 (leaf list, position 1)
//! ```
//!
//! Names are not required to be unique at a level; lookups return the first match
//! in insertion order.
//!
//! ```
//! use gear_tree::{NodeKind, Tree};
//!
//! # fn doit() -> gear_tree::error::Result<()> {
//! let mut tree = Tree::new("root");
//! let sub = tree.add_branch(tree.root(), "sub")?;
//! tree.add_leaf(sub, "b.bin", vec![0xFF])?;
//!
//! let found = tree.find_child_by_path(tree.root(), "sub/b.bin", NodeKind::Leaf);
//! assert_eq!(found.and_then(|id| tree[id].contents()), Some(&vec![0xFF]));
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```

pub mod error;
pub mod node;
pub mod tree;

pub use node::{Node, NodeData, NodeId, NodeKind};
pub use tree::{Descendants, Tree};
