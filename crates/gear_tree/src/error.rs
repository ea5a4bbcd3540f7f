//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::node::NodeId;

/// Error type for library
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum Error {
    /// node {0} does not belong to this tree
    #[error("node {0} does not belong to this tree")]
    UnknownNode(NodeId),

    /// node {0} is a leaf and cannot hold children
    #[error("node {0} is a leaf and cannot hold children")]
    NotABranch(NodeId),

    /// node {0} already has a parent
    #[error("node {0} already has a parent")]
    AlreadyAttached(NodeId),

    /// attaching node {0} would create a cycle
    #[error("attaching node {0} would create a cycle")]
    WouldCycle(NodeId),

    /// index {index} is out of range for {len} children
    #[error("index {index} is out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
