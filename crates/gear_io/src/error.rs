//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum Error {
    /// reading {requested} bytes at {position} exceeds the buffer length of {length}
    #[error("reading {requested} bytes at {position} exceeds the buffer length of {length}")]
    OutOfBounds {
        position: usize,
        requested: usize,
        length: usize,
    },

    /// cannot align to a boundary of {0} bytes
    #[error("cannot align to a boundary of {0} bytes")]
    InvalidAlignment(usize),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
