//! Base types and constants for the structure of NARC files.

use bon::Builder;
use encoding_rs::{Encoding, UTF_8};
use gear_io::ByteOrder;

use crate::error::{Error, Result};

/// Magic of the file header
pub const NARC_MAGIC: &[u8; 4] = b"NARC";

/// Magic of the file allocation table
pub const BTAF_MAGIC: &[u8; 4] = b"BTAF";

/// Magic of the file name table
pub const BTNF_MAGIC: &[u8; 4] = b"BTNF";

/// Magic of the file image
pub const GMIF_MAGIC: &[u8; 4] = b"GMIF";

pub const DEFAULT_VERSION: u16 = 0x0100;
pub const HEADER_SIZE: u16 = 0x10;
pub const SECTION_COUNT: u16 = 3;

/// Boundary the name table and every file in the image are padded to
pub const ALIGNMENT: usize = 128;

/// Name given to the root of a tree read from an archive
pub const ROOT_NAME: &str = "root";

pub(crate) const END_OF_DIRECTORY: u8 = 0x00;
pub(crate) const DIRECTORY_FLAG: u8 = 0x80;
pub(crate) const DIRECTORY_MARKER: u8 = 0xF0;
pub(crate) const MAX_NAME_LENGTH: usize = 0x7F;

/// NARC file header.
///
/// Holds the values that carry no meaning for the tree itself but must survive a
/// read followed by a write unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarcHeader {
    /// Byte order of every multi-byte value after the byte order mark
    pub byte_order: ByteOrder,

    pub version: u16,

    /// Stored header size, normally `0x10`
    pub header_size: u16,

    /// Stored section count, normally `3`
    pub section_count: u16,

    /// Opaque bytes at the start of the name table, before the name records
    pub name_table_header: Vec<u8>,
}

impl Default for NarcHeader {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::LittleEndian,
            version: DEFAULT_VERSION,
            header_size: HEADER_SIZE,
            section_count: SECTION_COUNT,
            name_table_header: vec![0x00, 0x00, 0x01, 0x00],
        }
    }
}

/// Options for how names are read from and written to a NARC file
#[derive(Debug, Clone, Copy, Builder)]
pub struct NarcOptions {
    /// Text encoding of file and directory names
    #[builder(default = UTF_8)]
    pub encoding: &'static Encoding,
}

impl Default for NarcOptions {
    fn default() -> Self {
        Self { encoding: UTF_8 }
    }
}

impl NarcOptions {
    /// Reject encodings that write through another encoding, such as UTF-16 or
    /// `replacement`, since names written with them would not read back.
    pub fn check(&self) -> Result<()> {
        if self.encoding.output_encoding() != self.encoding {
            return Err(Error::UnsupportedEncoding(self.encoding.name()));
        }
        Ok(())
    }
}
