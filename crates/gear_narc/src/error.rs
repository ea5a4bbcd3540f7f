//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`gear_io::error::Error`]
    #[error(transparent)]
    Cursor(#[from] gear_io::error::Error),

    /// Transparent wrapper for [`gear_tree::error::Error`]
    #[error(transparent)]
    Tree(#[from] gear_tree::error::Error),

    /// invalid {section} magic, found {found:02X?}
    #[error("invalid {section} magic, found {found:02X?}")]
    InvalidMagic {
        section: &'static str,
        found: Vec<u8>,
    },

    /// unrecognized byte order mark {0:#06X}
    #[error("unrecognized byte order mark {0:#06X}")]
    InvalidByteOrder(u16),

    /// file is an invalid narc archive: {0}
    #[error("file is an invalid narc archive: {0}")]
    InvalidArchive(String),

    /// name {0:?} cannot be stored in a narc archive
    #[error("name {0:?} cannot be stored in a narc archive")]
    InvalidName(String),

    /// name bytes {bytes:02X?} at {offset:#X} are not valid {encoding}
    #[error("name bytes {bytes:02X?} at {offset:#X} are not valid {encoding}")]
    #[diagnostic(help("pass the encoding the archive was written with"))]
    UndecodableName {
        offset: usize,
        bytes: Vec<u8>,
        encoding: &'static str,
    },

    /// {0} cannot be used for names, it encodes to a different encoding than it decodes
    #[error("{0} cannot be used for names, it encodes to a different encoding than it decodes")]
    UnsupportedEncoding(&'static str),

    /// archive does not fit in 32 bit offsets
    #[error("archive does not fit in 32 bit offsets")]
    TooLarge,
}

impl Error {
    /// Whether a magic check failed, meaning the data is not laid out as a NARC archive.
    ///
    /// Callers probing several formats in turn can move on to the next one when
    /// this is true.
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Error::InvalidMagic { .. })
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
