//! Base types for the structure of Yaz0 data.

use binrw::{BinRead, BinWrite};
use bon::Builder;

/// Magic every Yaz0 stream starts with
pub const MAGIC: &[u8; 4] = b"Yaz0";

/// Size of [`Yaz0Header`] once serialized
pub const HEADER_SIZE: usize = 0x10;

/// Yaz0 header
///
/// Starts with "Yaz0" and is always stored big endian, regardless of the
/// platform the data was made for.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"Yaz0", big)]
pub struct Yaz0Header {
    /// Size of the data once decompressed
    pub uncompressed_size: u32,

    /// Unused by the format, carried through as is
    pub reserved: [u8; 8],
}

/// Options for compressing data
#[derive(Debug, Default, Copy, Clone, Builder)]
pub struct Yaz0Options {
    /// Compression level from 0 to 9, picking the search window size.
    ///
    /// Level 0 stores everything as literals and level 9 searches the full
    /// 4096 byte window. Without a level a 256 byte window is used.
    pub level: Option<u8>,

    /// Written to the reserved bytes of the header
    #[builder(default)]
    pub reserved: [u8; 8],
}
