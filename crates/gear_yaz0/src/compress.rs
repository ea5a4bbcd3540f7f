//! Yaz0 compression

use std::io::Cursor;

use binrw::BinWrite;
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    types::{Yaz0Header, Yaz0Options, HEADER_SIZE},
};

/// Highest accepted compression level
pub const MAX_LEVEL: u8 = 9;

/// Window used when no level is given
pub const DEFAULT_WINDOW: usize = 0x100;

// Matches shorter than this are stored as literals
const MIN_MATCH: usize = 3;
const MAX_MATCH: usize = 0x111;
// Matches this long and over need the three byte token
const LONG_MATCH: usize = 0x12;

/// Number of bytes searched backwards for a match at `level`.
///
/// Grows by 0x1E0 per level, from nothing at level 0 up to 0x1000 at level 9.
pub fn window_size(level: Option<u8>) -> Result<usize> {
    match level {
        None => Ok(DEFAULT_WINDOW),
        Some(level) if level > MAX_LEVEL => Err(Error::InvalidLevel(level)),
        Some(level) => Ok((0x1E0 * level as usize).saturating_sub(0xE0)),
    }
}

/// Compress `data` with zeroed reserved bytes
pub fn compress(data: &[u8], level: Option<u8>) -> Result<Vec<u8>> {
    compress_with(data, Yaz0Options::builder().maybe_level(level).build())
}

/// Compress `data` into a Yaz0 stream.
///
/// Data is split into groups of eight tokens, each preceded by a flag byte read
/// from the most significant bit down. A set bit is a literal byte, a clear bit
/// a back-reference. The output is padded with zeroes to a multiple of 4 bytes.
#[instrument(skip(data), err, fields(size = data.len()))]
pub fn compress_with(data: &[u8], options: Yaz0Options) -> Result<Vec<u8>> {
    let window = window_size(options.level)?;
    let uncompressed_size = u32::try_from(data.len()).map_err(|_| Error::TooLarge(data.len()))?;

    let mut writer = Cursor::new(Vec::with_capacity(HEADER_SIZE + data.len() + data.len() / 8 + 4));
    Yaz0Header {
        uncompressed_size,
        reserved: options.reserved,
    }
    .write(&mut writer)?;
    let mut output = writer.into_inner();

    let mut position = 0;
    while position < data.len() {
        let flag_at = output.len();
        let mut flags = 0u8;
        output.push(flags);

        for slot in 0..8 {
            if position >= data.len() {
                break;
            }

            let (distance, length) = find_match(data, position, window);
            if length < MIN_MATCH {
                flags |= 0x80 >> slot;
                output.push(data[position]);
                position += 1;
                continue;
            }

            let back = distance - 1;
            if length >= LONG_MATCH {
                output.extend_from_slice(&[
                    (back >> 8) as u8 & 0x0F,
                    back as u8,
                    (length - LONG_MATCH) as u8,
                ]);
            } else {
                output.extend_from_slice(&[
                    (((length - 2) << 4) as u8) | ((back >> 8) as u8 & 0x0F),
                    back as u8,
                ]);
            }
            position += length;
        }

        output[flag_at] = flags;
    }

    output.resize(output.len().next_multiple_of(4), 0);
    debug!(window, compressed = output.len(), "compressed yaz0 data");

    Ok(output)
}

/// Longest match for the data at `position` within `window` bytes behind it,
/// as `(distance, length)`.
///
/// Candidates are tried nearest first and only a strictly longer match replaces
/// the current one, so among equally long matches the nearest wins. Matches may
/// run past `position`, overlapping the data they reproduce.
fn find_match(data: &[u8], position: usize, window: usize) -> (usize, usize) {
    let max_length = MAX_MATCH.min(data.len() - position);
    if max_length < MIN_MATCH {
        return (0, 0);
    }

    let target = &data[position..position + max_length];
    let mut best = (0, 0);

    for candidate in (position.saturating_sub(window)..position).rev() {
        let length = data[candidate..]
            .iter()
            .zip(target)
            .take_while(|(a, b)| a == b)
            .count();

        if length > best.1 {
            best = (position - candidate, length);
            if length == max_length {
                break;
            }
        }
    }

    best
}
