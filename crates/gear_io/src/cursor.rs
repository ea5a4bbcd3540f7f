//! The [`BinaryCursor`] type and its scoped seek guard

use std::ops::{Deref, DerefMut};

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use encoding_rs::{Encoding, UTF_8};
use tracing::trace;

use crate::error::{Error, Result};
use crate::order::ByteOrder;

/// A growable byte buffer with a position, a byte order and a fill byte.
#[derive(Debug, Clone)]
pub struct BinaryCursor {
    buffer: Vec<u8>,
    position: usize,
    byte_order: ByteOrder,
    fill_byte: u8,
    encoding: &'static Encoding,
}

impl Default for BinaryCursor {
    fn default() -> Self {
        Self {
            buffer: Vec::new(),
            position: 0,
            byte_order: ByteOrder::default(),
            fill_byte: 0x00,
            encoding: UTF_8,
        }
    }
}

impl From<Vec<u8>> for BinaryCursor {
    fn from(buffer: Vec<u8>) -> Self {
        Self::from_vec(buffer)
    }
}

impl From<&[u8]> for BinaryCursor {
    fn from(buffer: &[u8]) -> Self {
        Self::from_vec(buffer.to_vec())
    }
}

macro_rules! write_numeric {
    ($($(#[$doc:meta])* $name:ident($ty:ty, $width:literal) => $method:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&mut self, value: $ty) {
                let mut buf = [0u8; $width];
                match self.byte_order {
                    ByteOrder::LittleEndian => LittleEndian::$method(&mut buf, value),
                    ByteOrder::BigEndian => BigEndian::$method(&mut buf, value),
                }
                self.write_bytes(&buf);
            }
        )*
    };
}

impl BinaryCursor {
    /// An empty cursor using little-endian, a zero fill byte and UTF-8 strings
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing buffer, positioned at its start
    pub fn from_vec(buffer: Vec<u8>) -> Self {
        Self {
            buffer,
            ..Default::default()
        }
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn with_fill_byte(mut self, fill_byte: u8) -> Self {
        self.fill_byte = fill_byte;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Byte written into regions created by growing the buffer
    pub fn fill_byte(&self) -> u8 {
        self.fill_byte
    }

    pub fn set_fill_byte(&mut self, fill_byte: u8) {
        self.fill_byte = fill_byte;
    }

    /// Encoding used by the string methods that don't take one explicitly
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    /// Number of bytes before the current position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move to `position`, growing the buffer with the fill byte if it lies past the end
    pub fn set_position(&mut self, position: usize) {
        if position > self.buffer.len() {
            trace!(from = self.buffer.len(), to = position, "extending buffer");
            self.buffer.resize(position, self.fill_byte);
        }
        self.position = position;
    }

    /// Total number of addressable bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes left between the position and the end
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Unwrap and return the underlying buffer
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    /// Save the position and restore it when the returned guard is dropped.
    ///
    /// The guard dereferences to the cursor, so it can be read from, written to
    /// and moved around freely while it is alive.
    pub fn temporary_seek(&mut self) -> TemporarySeek<'_> {
        TemporarySeek {
            origin: self.position,
            cursor: self,
        }
    }

    /// Move forward to the next multiple of `boundary`.
    ///
    /// Does nothing when already aligned. Bytes added to the buffer while moving
    /// forward take the fill byte.
    pub fn align(&mut self, boundary: usize) -> Result<()> {
        if boundary == 0 {
            return Err(Error::InvalidAlignment(boundary));
        }

        let remainder = self.position % boundary;
        if remainder != 0 {
            self.set_position(self.position + boundary - remainder);
        }
        Ok(())
    }

    // Reading

    fn check(&self, requested: usize) -> Result<()> {
        if requested > self.remaining() {
            return Err(Error::OutOfBounds {
                position: self.position,
                requested,
                length: self.buffer.len(),
            });
        }
        Ok(())
    }

    /// Move to `position` without growing the buffer
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.buffer.len() {
            return Err(Error::OutOfBounds {
                position,
                requested: 0,
                length: self.buffer.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Move forward by `count` bytes without growing the buffer
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.check(count)?;
        self.position += count;
        Ok(())
    }

    /// Borrow the next `count` bytes and move past them
    pub fn read_slice(&mut self, count: usize) -> Result<&[u8]> {
        self.check(count)?;
        let start = self.position;
        self.position += count;
        Ok(&self.buffer[start..self.position])
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.read_slice(count).map(<[u8]>::to_vec)
    }

    // Multi-byte values are accumulated a byte at a time. Data in the native
    // order is shifted left from its most significant byte down; data in the
    // other order is shifted right in from its least significant byte up.
    fn read_numeric(&mut self, width: usize) -> Result<u64> {
        let byte_order = self.byte_order;
        let bytes = self.read_slice(width)?;

        let value = if byte_order == ByteOrder::native() {
            let shift_left = |acc: u64, byte: &u8| (acc << 8) | u64::from(*byte);
            match byte_order {
                ByteOrder::LittleEndian => bytes.iter().rev().fold(0, shift_left),
                ByteOrder::BigEndian => bytes.iter().fold(0, shift_left),
            }
        } else {
            let top = 8 * (width - 1);
            let shift_right = |acc: u64, byte: &u8| (acc >> 8) | (u64::from(*byte) << top);
            match byte_order {
                ByteOrder::LittleEndian => bytes.iter().fold(0, shift_right),
                ByteOrder::BigEndian => bytes.iter().rev().fold(0, shift_right),
            }
        };

        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_slice(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read a byte and compare it against 1
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? == 1)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.read_numeric(2)? as u16)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_numeric(2)? as u16 as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.read_numeric(4)? as u32)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_numeric(4)? as u32 as i32)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_numeric(8)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.read_numeric(8)? as i64)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_numeric(4)? as u32))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_numeric(8)?))
    }

    /// Decode the next `length` bytes with the cursor's encoding
    pub fn read_string(&mut self, length: usize) -> Result<String> {
        self.read_string_with(length, self.encoding)
    }

    /// Decode the next `length` bytes with `encoding`.
    ///
    /// Malformed sequences are replaced rather than rejected.
    pub fn read_string_with(&mut self, length: usize, encoding: &'static Encoding) -> Result<String> {
        let bytes = self.read_slice(length)?;
        let (text, _) = encoding.decode_without_bom_handling(bytes);
        Ok(text.into_owned())
    }

    /// Decode bytes up to `terminator` with the cursor's encoding
    pub fn read_string_until(&mut self, terminator: u8) -> Result<String> {
        self.read_string_until_with(terminator, self.encoding)
    }

    /// Decode bytes up to `terminator` with `encoding`, leaving the cursor just past it
    pub fn read_string_until_with(&mut self, terminator: u8, encoding: &'static Encoding) -> Result<String> {
        let Some(length) = self.buffer[self.position..]
            .iter()
            .position(|byte| *byte == terminator)
        else {
            return Err(Error::OutOfBounds {
                position: self.position,
                requested: self.remaining() + 1,
                length: self.buffer.len(),
            });
        };

        let text = self.read_string_with(length, encoding)?;
        self.position += 1;
        Ok(text)
    }

    /// Run `read` `count` times, collecting the values.
    ///
    /// The position is restored if any of the reads fail.
    pub fn read_array<T>(
        &mut self,
        count: usize,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let origin = self.position;
        let values = (0..count).map(|_| read(self)).collect::<Result<Vec<_>>>();
        if values.is_err() {
            self.position = origin;
        }
        values
    }

    // Writing

    /// Write `bytes` at the position, overwriting what is there and growing as needed
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        let end = self.position + bytes.len();
        if end > self.buffer.len() {
            self.buffer.resize(end, self.fill_byte);
        }
        self.buffer[self.position..end].copy_from_slice(bytes);
        self.position = end;
    }

    /// Write `count` fill bytes, used to reserve space that is patched later
    pub fn reserve(&mut self, count: usize) {
        let fill = vec![self.fill_byte; count];
        self.write_bytes(&fill);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_u8(value as u8);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    write_numeric! {
        write_u16(u16, 2) => write_u16;
        write_i16(i16, 2) => write_i16;
        write_u32(u32, 4) => write_u32;
        write_i32(i32, 4) => write_i32;
        write_u64(u64, 8) => write_u64;
        write_i64(i64, 8) => write_i64;
        write_f32(f32, 4) => write_f32;
        write_f64(f64, 8) => write_f64;
    }

    /// Encode `text` with the cursor's encoding, without any length prefix or terminator.
    ///
    /// Returns the number of bytes written.
    pub fn write_string(&mut self, text: &str) -> usize {
        let (bytes, _, _) = self.encoding.encode(text);
        let bytes = bytes.into_owned();
        self.write_bytes(&bytes);
        bytes.len()
    }
}

/// Guard returned by [`BinaryCursor::temporary_seek`].
///
/// Restores the cursor position it was created at when dropped, including when
/// the scope is left early through `?`.
pub struct TemporarySeek<'a> {
    cursor: &'a mut BinaryCursor,
    origin: usize,
}

impl TemporarySeek<'_> {
    /// The position that will be restored
    pub fn origin(&self) -> usize {
        self.origin
    }
}

impl Deref for TemporarySeek<'_> {
    type Target = BinaryCursor;

    fn deref(&self) -> &Self::Target {
        self.cursor
    }
}

impl DerefMut for TemporarySeek<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cursor
    }
}

impl Drop for TemporarySeek<'_> {
    fn drop(&mut self) {
        // The buffer never shrinks, so the origin is always addressable.
        self.cursor.position = self.origin;
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
    use encoding_rs::SHIFT_JIS;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::cursor::BinaryCursor;
    use crate::error::{Error, Result};
    use crate::order::ByteOrder;

    #[rustfmt::skip]
    const SAMPLE: [u8; 16] = [
        0x01, 0x82, 0x03, 0x84, 0x05, 0x86, 0x07, 0x88,
        0x3F, 0x80, 0x00, 0x00, 0xC0, 0x49, 0x0F, 0xDB,
    ];

    #[test]
    fn numeric_reads_match_byteorder() -> Result<()> {
        let mut le = BinaryCursor::from_vec(SAMPLE.to_vec());
        let mut be = BinaryCursor::from_vec(SAMPLE.to_vec()).with_byte_order(ByteOrder::BigEndian);
        let mut le_expected = Cursor::new(SAMPLE);
        let mut be_expected = Cursor::new(SAMPLE);

        assert_eq!(le.read_u16()?, le_expected.read_u16::<LittleEndian>().unwrap());
        assert_eq!(be.read_u16()?, be_expected.read_u16::<BigEndian>().unwrap());
        assert_eq!(le.read_i16()?, le_expected.read_i16::<LittleEndian>().unwrap());
        assert_eq!(be.read_i16()?, be_expected.read_i16::<BigEndian>().unwrap());
        assert_eq!(le.read_u32()?, le_expected.read_u32::<LittleEndian>().unwrap());
        assert_eq!(be.read_u32()?, be_expected.read_u32::<BigEndian>().unwrap());
        assert_eq!(le.read_i64()?, le_expected.read_i64::<LittleEndian>().unwrap());
        assert_eq!(be.read_i64()?, be_expected.read_i64::<BigEndian>().unwrap());

        assert_eq!(le.position(), 16);
        assert_eq!(be.position(), 16);

        Ok(())
    }

    #[test]
    fn numeric_reads_in_both_orders() -> Result<()> {
        // one of the two orders is native on any host, the other is not
        let mut le = BinaryCursor::from_vec(SAMPLE[..8].to_vec());
        let mut be = BinaryCursor::from_vec(SAMPLE[..8].to_vec()).with_byte_order(ByteOrder::BigEndian);

        assert_eq!(le.read_u64()?, 0x8807_8605_8403_8201);
        assert_eq!(be.read_u64()?, 0x0182_0384_0586_0788);

        le.set_position(1);
        be.set_position(1);
        assert_eq!(le.read_u16()?, 0x0382);
        assert_eq!(be.read_u16()?, 0x8203);
        assert_eq!(le.read_i32()?, 0x0786_0584);
        assert_eq!(be.read_i32()?, 0x8405_8607_u32 as i32);

        Ok(())
    }

    #[test]
    fn float_reads() -> Result<()> {
        let mut be = BinaryCursor::from_vec(SAMPLE[8..].to_vec()).with_byte_order(ByteOrder::BigEndian);
        assert_eq!(be.read_f32()?, 1.0);
        assert_eq!(be.read_f32()?, -3.1415927);

        Ok(())
    }

    #[test]
    fn writes_read_back() -> Result<()> {
        for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
            let mut cursor = BinaryCursor::new().with_byte_order(order);
            cursor.write_u8(0xAB);
            cursor.write_i16(-2);
            cursor.write_u32(0xDEADBEEF);
            cursor.write_u64(0x0102030405060708);
            cursor.write_f64(2.5);
            assert_eq!(cursor.len(), 23);

            cursor.set_position(0);
            assert_eq!(cursor.read_u8()?, 0xAB);
            assert_eq!(cursor.read_i16()?, -2);
            assert_eq!(cursor.read_u32()?, 0xDEADBEEF);
            assert_eq!(cursor.read_u64()?, 0x0102030405060708);
            assert_eq!(cursor.read_f64()?, 2.5);
        }

        Ok(())
    }

    #[test]
    fn byte_order_changes_layout() {
        let mut le = BinaryCursor::new();
        le.write_u32(0x11223344);
        assert_eq!(le.as_slice(), &[0x44, 0x33, 0x22, 0x11]);

        let mut be = BinaryCursor::new().with_byte_order(ByteOrder::BigEndian);
        be.write_u32(0x11223344);
        assert_eq!(be.as_slice(), &[0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn read_past_end_is_rejected() {
        let mut cursor = BinaryCursor::from_vec(vec![0x01, 0x02, 0x03]);
        cursor.set_position(1);

        assert_eq!(
            cursor.read_u32(),
            Err(Error::OutOfBounds {
                position: 1,
                requested: 4,
                length: 3
            })
        );
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.skip(3), Err(Error::OutOfBounds { position: 1, requested: 3, length: 3 }));
    }

    #[traced_test]
    #[test]
    fn set_position_extends_with_fill() {
        let mut cursor = BinaryCursor::from_vec(vec![0x01]).with_fill_byte(0xEE);
        cursor.set_position(4);

        assert_eq!(cursor.len(), 4);
        assert_eq!(cursor.as_slice(), &[0x01, 0xEE, 0xEE, 0xEE]);
    }

    #[test]
    fn align_pads_to_boundary() -> Result<()> {
        let mut cursor = BinaryCursor::new().with_fill_byte(0xAA);
        cursor.write_bytes(&[0x01, 0x02, 0x03]);

        cursor.align(8)?;
        assert_eq!(cursor.position(), 8);
        assert_eq!(cursor.as_slice(), &[0x01, 0x02, 0x03, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA]);

        cursor.align(8)?;
        assert_eq!(cursor.position(), 8);
        assert_eq!(cursor.len(), 8);

        assert_eq!(cursor.align(0), Err(Error::InvalidAlignment(0)));

        Ok(())
    }

    #[test]
    fn temporary_seek_restores_position() -> Result<()> {
        let mut cursor = BinaryCursor::from_vec(vec![0x00; 8]);
        cursor.set_position(2);

        {
            let mut seek = cursor.temporary_seek();
            seek.set_position(6);
            seek.write_u16(0xBEEF);
            assert_eq!(seek.origin(), 2);
        }
        assert_eq!(cursor.position(), 2);
        assert_eq!(&cursor.as_slice()[6..], &[0xEF, 0xBE]);

        Ok(())
    }

    #[test]
    fn temporary_seek_restores_on_error() {
        fn peek_too_far(cursor: &mut BinaryCursor) -> Result<u32> {
            let mut seek = cursor.temporary_seek();
            seek.set_position(6);
            seek.read_u32()
        }

        let mut cursor = BinaryCursor::from_vec(vec![0x00; 8]);
        cursor.set_position(3);

        assert!(peek_too_far(&mut cursor).is_err());
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn strings() -> Result<()> {
        let mut cursor = BinaryCursor::from_vec(b"NARCname\0rest".to_vec());

        assert_eq!(cursor.read_string(4)?, "NARC");
        assert_eq!(cursor.read_string_until(0)?, "name");
        assert_eq!(cursor.position(), 9);

        assert!(cursor.read_string_until(0).is_err());
        assert_eq!(cursor.position(), 9);

        let mut sjis = BinaryCursor::from_vec(vec![0x83, 0x65, 0x83, 0x58, 0x83, 0x67]);
        assert_eq!(sjis.read_string_with(6, SHIFT_JIS)?, "テスト");

        Ok(())
    }

    #[test]
    fn write_string_is_unprefixed() {
        let mut cursor = BinaryCursor::new();
        assert_eq!(cursor.write_string("BTNF"), 4);
        assert_eq!(cursor.as_slice(), b"BTNF");
    }

    #[test]
    fn read_array_is_all_or_nothing() -> Result<()> {
        let mut cursor = BinaryCursor::from_vec(vec![0x01, 0x00, 0x02, 0x00, 0x03]);

        assert_eq!(cursor.read_array(2, BinaryCursor::read_u16)?, vec![1, 2]);

        cursor.set_position(0);
        assert!(cursor.read_array(3, BinaryCursor::read_u16).is_err());
        assert_eq!(cursor.position(), 0);

        Ok(())
    }
}
