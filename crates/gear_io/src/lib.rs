//! Endian aware, random access reading and writing over a single growable byte buffer.
//!
//! [`BinaryCursor`] is the workhorse for the archive codecs in this workspace. It
//! owns its buffer, keeps a movable position, and interprets multi-byte values
//! according to a configurable [`ByteOrder`]:
//!
//! - Moving the position past the end grows the buffer, filling the new region
//!   with the configured fill byte. The buffer is never truncated.
//! - Reads past the end fail with [`error::Error::OutOfBounds`] and leave the
//!   position untouched.
//! - [`BinaryCursor::temporary_seek`] hands out a guard that restores the
//!   position when it goes out of scope, which is how cross-referenced offsets
//!   are peeked at and how placeholders are patched once their value is known.
//!
//! ```
//! use gear_io::{BinaryCursor, ByteOrder};
//!
//! # fn doit() -> gear_io::error::Result<()> {
//! let mut cursor = BinaryCursor::new().with_byte_order(ByteOrder::BigEndian);
//! cursor.write_u32(0); // placeholder
//! cursor.write_bytes(b"payload");
//!
//! let length = cursor.len() as u32;
//! {
//!     let mut seek = cursor.temporary_seek();
//!     seek.set_position(0);
//!     seek.write_u32(length);
//! }
//! assert_eq!(cursor.position(), 11);
//!
//! cursor.set_position(0);
//! assert_eq!(cursor.read_u32()?, 11);
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```

pub mod cursor;
pub mod error;
pub mod order;

pub use cursor::{BinaryCursor, TemporarySeek};
pub use order::ByteOrder;
