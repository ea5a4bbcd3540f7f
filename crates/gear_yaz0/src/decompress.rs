//! Yaz0 decompression

use std::io::Cursor;

use binrw::BinRead;
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    types::{Yaz0Header, HEADER_SIZE, MAGIC},
};

/// Check whether `data` starts with the Yaz0 magic
pub fn identify(data: &[u8]) -> bool {
    data.starts_with(MAGIC)
}

/// Decompress a Yaz0 stream
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_with_header(data).map(|(_, output)| output)
}

/// Decompress a Yaz0 stream, also returning its header.
///
/// Exactly the size declared in the header is produced. Anything after the last
/// token needed is ignored, which covers the padding added on compression.
#[instrument(skip(data), err, fields(size = data.len()))]
pub fn decompress_with_header(data: &[u8]) -> Result<(Yaz0Header, Vec<u8>)> {
    if !identify(data) {
        return Err(Error::InvalidMagic {
            found: data.iter().take(4).copied().collect(),
        });
    }
    if data.len() < HEADER_SIZE {
        return Err(Error::Truncated { offset: data.len() });
    }

    let header = Yaz0Header::read(&mut Cursor::new(data))?;
    let size = header.uncompressed_size as usize;
    debug!(size, "read yaz0 header");

    let mut output = Vec::with_capacity(size.min(data.len().saturating_mul(MAX_RATIO)));
    let mut position = HEADER_SIZE;

    while output.len() < size {
        let flags = next(data, &mut position)?;

        for bit in (0..8).rev() {
            if output.len() >= size {
                break;
            }

            if flags & (1 << bit) != 0 {
                output.push(next(data, &mut position)?);
                continue;
            }

            let first = next(data, &mut position)?;
            let second = next(data, &mut position)?;
            let distance = ((usize::from(first & 0x0F) << 8) | usize::from(second)) + 1;
            let length = match first >> 4 {
                0 => usize::from(next(data, &mut position)?) + 0x12,
                nibble => usize::from(nibble) + 2,
            };

            if distance > output.len() {
                return Err(Error::InvalidBackReference {
                    distance,
                    available: output.len(),
                });
            }

            // Copied a byte at a time, the source may overlap what is being written
            let start = output.len() - distance;
            for index in start..start + length.min(size - output.len()) {
                output.push(output[index]);
            }
        }
    }

    Ok((header, output))
}

// Longest token output per compressed byte, bounds the up front allocation
const MAX_RATIO: usize = 0x111;

fn next(data: &[u8], position: &mut usize) -> Result<u8> {
    let byte = data
        .get(*position)
        .copied()
        .ok_or(Error::Truncated { offset: *position })?;
    *position += 1;
    Ok(byte)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::{
        decompress::{decompress, decompress_with_header, identify},
        error::Error,
    };

    #[rustfmt::skip]
    const ABABAB: [u8; 21] = [
        0x59, 0x61, 0x7A, 0x30, // magic
        0x00, 0x00, 0x00, 0x06, // size
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // reserved
        0xC0, 0x61, 0x62, // literals 'a' 'b'
        0x20, 0x01, // 4 bytes from 2 back
    ];

    #[test]
    fn identifies_by_magic() {
        assert!(identify(b"Yaz0"));
        assert!(!identify(b"Yaz"));
        assert!(!identify(b"NARC\xFE\xFF"));
    }

    #[test]
    #[traced_test]
    fn decompress_overlapping_reference() -> Result<(), Error> {
        let output = decompress(&ABABAB)?;
        assert_eq!(output, b"ababab".to_vec());
        assert!(logs_contain("read yaz0 header"));
        Ok(())
    }

    #[test]
    fn decompress_stops_at_declared_size() -> Result<(), Error> {
        let mut data = ABABAB;
        data[7] = 0x05;

        assert_eq!(decompress(&data)?, b"ababa".to_vec());
        Ok(())
    }

    #[test]
    fn decompress_empty() -> Result<(), Error> {
        let (header, output) = decompress_with_header(b"Yaz0\0\0\0\0\x0A\x0B\0\0\0\0\0\0")?;

        assert!(output.is_empty());
        assert_eq!(header.uncompressed_size, 0);
        assert_eq!(header.reserved, [0x0A, 0x0B, 0, 0, 0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn rejects_foreign_magic() {
        let err = decompress(b"NARC\xFE\xFF\x00\x01").unwrap_err();
        assert!(err.is_format_mismatch());

        let err = decompress(b"Ya").unwrap_err();
        assert!(err.is_format_mismatch());
    }

    #[test]
    fn rejects_truncated_input() {
        let err = decompress(&ABABAB[..20]).unwrap_err();
        assert!(matches!(err, Error::Truncated { offset: 20 }));

        let err = decompress(&ABABAB[..10]).unwrap_err();
        assert!(matches!(err, Error::Truncated { offset: 10 }));
    }

    #[test]
    fn rejects_reference_before_start() {
        let mut data = ABABAB;
        // 3 back with 2 bytes written
        data[20] = 0x02;

        let err = decompress(&data).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidBackReference {
                distance: 3,
                available: 2
            }
        ));
    }
}
