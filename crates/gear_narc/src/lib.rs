//! This library handles reading from and creating **NARC** archives.
//!
//! # NARC Archive Format Documentation
//!
//! A NARC file packs a directory tree into three sections: a file allocation table,
//! a file name table and a file image. NARC files are typically identified with the
//! `.narc` extension, and are frequently stored Yaz0 compressed as `.szs`.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "NARC"                                            |
//! | 0x0004         | Byte order mark        | 2 bytes: `FE FF` little-endian, `FF FE` big-endian         |
//! | 0x0006         | Version                | 2 bytes: Usually 0x0100                                    |
//! | 0x0008         | File Length            | 4 bytes: Size of the whole file                            |
//! | 0x000C         | Header Size            | 2 bytes: Fixed value 0x0010                                |
//! | 0x000E         | Section Count          | 2 bytes: Fixed value 0x0003                                |
//!
//! Every multi-byte value after the byte order mark uses the byte order it declares.
//!
//! ### File Allocation Table (BTAF)
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "BTAF"                                         |
//! | 0x0004         | Section Length         | 4 bytes: Size of the section, including magic and length |
//! | 0x0008         | File Count             | 4 bytes: Number of files in the archive                 |
//! | 0x000C         | Entries                | 8 bytes each: start and end offset of a file            |
//!
//! Entry offsets are relative to the start of the file image payload. Entries are
//! listed in the order the files appear in the name table.
//!
//! ### File Name Table (BTNF)
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "BTNF"                                         |
//! | 0x0004         | Section Length         | 4 bytes: Size of the section, including magic and length |
//! | 0x0008         | Header Length          | 4 bytes: Size of the opaque header plus 4               |
//! | 0x000C         | Header                 | Opaque bytes, preserved as is                           |
//! | ...            | Records                | Name records, depth-first                               |
//!
//! Each record starts with a length byte:
//!
//! - `0x00` ends the current directory.
//! - `0x80 | n` opens a directory named by the next `n` bytes, followed by a directory
//!   ordinal byte and the constant `0xF0`. The records that follow belong to it
//!   until its `0x00`.
//! - `n` (1 to 0x7F) names a file with the next `n` bytes. Files take allocation
//!   table entries in the order they are named.
//!
//! A directory lists its subdirectories (each followed by its own contents) before
//! its files. The section is padded with zeroes to a 128 byte boundary.
//!
//! ### File Image (GMIF)
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "GMIF"                                         |
//! | 0x0004         | Section Length         | 4 bytes: Size of the section, including magic and length |
//! | 0x0008         | Payload                | File contents, each padded to a 128 byte boundary       |
//!
//! Written archives store the GMIF length as the total file length minus the
//! section start, so the value counts the 8 byte magic and length like the other
//! sections do. Some tools write 4 less than this. Readers ignore the value and
//! locate files through the allocation table.
//!
//! ## Usage
//!
//! ```
//! # fn doit() -> gear_narc::error::Result<()> {
//! use gear_narc::NarcArchive;
//! use gear_tree::NodeKind;
//!
//! let mut archive = NarcArchive::new();
//! let root = archive.root();
//! archive.tree.add_leaf(root, "a.bin", vec![0x01, 0x02, 0x03])?;
//! let sub = archive.tree.add_branch(root, "sub")?;
//! archive.tree.add_leaf(sub, "b.bin", vec![0xFF])?;
//!
//! let bytes = archive.write()?;
//! let read = NarcArchive::read(&bytes)?;
//!
//! assert_eq!(read.by_path("sub/b.bin"), Some(&[0xFF][..]));
//! assert!(read.tree.find_child_by_path(read.root(), "sub", NodeKind::Branch).is_some());
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```
//!
//! ## Additional Information
//!
//! - **File Extension**: `.narc`, `.carc`
//! - **Endianness**: Declared by the byte order mark
//! - **Alignment**: The name table and every file are padded to 128 bytes
//!

pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use gear_io::ByteOrder;
pub use read::{identify, NarcArchive};
pub use types::{NarcHeader, NarcOptions};
