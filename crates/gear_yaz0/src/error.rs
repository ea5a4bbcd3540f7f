//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// data is not yaz0 compressed, found magic {found:02X?}
    #[error("data is not yaz0 compressed, found magic {found:02X?}")]
    InvalidMagic { found: Vec<u8> },

    /// compressed data ends early at offset {offset:#X}
    #[error("compressed data ends early at offset {offset:#X}")]
    Truncated { offset: usize },

    /// back reference of {distance} bytes with only {available} bytes decompressed
    #[error("back reference of {distance} bytes with only {available} bytes decompressed")]
    InvalidBackReference { distance: usize, available: usize },

    /// compression level {0} is above 9
    #[error("compression level {0} is above 9")]
    #[diagnostic(help("use a level between 0 and 9, or none for the default window"))]
    InvalidLevel(u8),

    /// input of {0} bytes does not fit the 32 bit size field
    #[error("input of {0} bytes does not fit the 32 bit size field")]
    TooLarge(usize),
}

impl Error {
    /// Whether the magic check failed, meaning the data is not Yaz0 compressed
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Error::InvalidMagic { .. })
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
