//! This library handles compressing and decompressing **Yaz0** data.
//!
//! # Yaz0 Format Documentation
//!
//! Yaz0 is a byte oriented LZSS variant. Files compressed with it usually carry
//! the `.szs` extension, and most of the time hold a NARC archive.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                   |
//! |----------------|------------------------|-----------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "Yaz0"                               |
//! | 0x0004         | Uncompressed Size      | 4 bytes: Size of the data once decompressed   |
//! | 0x0008         | Reserved               | 8 bytes: Usually zero                         |
//! | 0x0010         | Groups                 | Compressed data                               |
//!
//! ### Groups
//!
//! Each group is a flag byte followed by up to eight tokens. The flag bits are
//! read from the most significant down, one per token:
//!
//! | Bit | Token     | Encoding                                                        |
//! |-----|-----------|-----------------------------------------------------------------|
//! | 1   | Literal   | 1 byte copied to the output                                     |
//! | 0   | Reference | `NR RR`: copy `N + 2` bytes from `R + 1` bytes back, `N` > 0     |
//! | 0   | Reference | `0R RR NN`: copy `NN + 0x12` bytes from `R + 1` bytes back       |
//!
//! References may overlap the bytes they produce, so a run of a single byte
//! takes one literal and one reference.
//!
//! ## Usage
//!
//! ```
//! # fn doit() -> gear_yaz0::error::Result<()> {
//! let data = b"abcabcabcabcabcabc";
//!
//! let compressed = gear_yaz0::compress(data, Some(9))?;
//! assert!(gear_yaz0::identify(&compressed));
//!
//! let decompressed = gear_yaz0::decompress(&compressed)?;
//! assert_eq!(decompressed, data);
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```
//!
//! ## Additional Information
//!
//! - **File Extension**: `.szs`, `.carc`
//! - **Endianness**: Big-endian header
//! - **Window**: Up to 4096 bytes back, matches of 3 to 273 bytes
//!

pub mod compress;
pub mod decompress;
pub mod error;
pub mod types;

pub use compress::{compress, compress_with};
pub use decompress::{decompress, decompress_with_header, identify};
pub use types::{Yaz0Header, Yaz0Options};
