//! Types for creating NARC archives
//!

use std::borrow::Cow;

use encoding_rs::Encoding;
use gear_io::{BinaryCursor, ByteOrder};
use gear_tree::NodeId;
use tracing::{debug, instrument, trace};

use crate::{
    error::{Error, Result},
    read::NarcArchive,
    types::{
        NarcOptions, ALIGNMENT, BTAF_MAGIC, BTNF_MAGIC, DIRECTORY_FLAG, DIRECTORY_MARKER,
        END_OF_DIRECTORY, GMIF_MAGIC, MAX_NAME_LENGTH, NARC_MAGIC,
    },
};

// Offset of the total file length in the header
const FILE_LENGTH_OFFSET: usize = 8;

impl NarcArchive {
    /// Serialize the archive, encoding names as UTF-8
    pub fn write(&self) -> Result<Vec<u8>> {
        self.write_with(NarcOptions::default())
    }

    /// Serialize the archive in the byte order of its header.
    ///
    /// Section lengths and file offsets are written as placeholders and patched
    /// once the data they describe has been laid out.
    #[instrument(skip_all, err)]
    pub fn write_with(&self, options: NarcOptions) -> Result<Vec<u8>> {
        options.check()?;

        let mut cursor = BinaryCursor::new()
            .with_byte_order(self.header.byte_order)
            .with_encoding(options.encoding);

        let files: Vec<NodeId> = self.files().map(|(_, id)| id).collect();
        debug!(files = files.len(), byte_order = ?self.header.byte_order, "writing narc archive");

        // Header
        cursor.write_bytes(NARC_MAGIC);
        cursor.write_u16(ByteOrder::MARK);
        cursor.write_u16(self.header.version);
        cursor.write_u32(0);
        cursor.write_u16(self.header.header_size);
        cursor.write_u16(self.header.section_count);

        // File allocation table
        cursor.write_bytes(BTAF_MAGIC);
        cursor.write_u32(to_u32(12 + 8 * files.len())?);
        cursor.write_u32(to_u32(files.len())?);
        let entries_start = cursor.position();
        cursor.reserve(8 * files.len());

        // File name table
        let btnf_start = cursor.position();
        cursor.write_bytes(BTNF_MAGIC);
        cursor.write_u32(0);
        cursor.write_u32(to_u32(self.header.name_table_header.len() + 4)?);
        cursor.write_bytes(&self.header.name_table_header);

        let mut ordinal = 0u8;
        self.write_names(&mut cursor, self.root(), &mut ordinal)?;
        cursor.align(ALIGNMENT)?;
        let btnf_length = to_u32(cursor.position() - btnf_start)?;
        patch_u32(&mut cursor, btnf_start + 4, btnf_length);

        // File image
        let gmif_start = cursor.position();
        cursor.write_bytes(GMIF_MAGIC);
        cursor.write_u32(0);
        let payload_start = cursor.position();

        for (index, id) in files.iter().enumerate() {
            let contents = self.tree[*id].contents().map(Vec::as_slice).unwrap_or_default();

            let start = to_u32(cursor.position() - payload_start)?;
            cursor.write_bytes(contents);
            let end = to_u32(cursor.position() - payload_start)?;
            trace!(index, start, end, "wrote file");

            let entry = entries_start + 8 * index;
            patch_u32(&mut cursor, entry, start);
            patch_u32(&mut cursor, entry + 4, end);

            cursor.align(ALIGNMENT)?;
        }

        let total = cursor.len();
        patch_u32(&mut cursor, gmif_start + 4, to_u32(total - gmif_start)?);
        patch_u32(&mut cursor, FILE_LENGTH_OFFSET, to_u32(total)?);

        Ok(cursor.into_inner())
    }

    /// Write the records of `branch`: each subdirectory followed by its own records,
    /// then the files, then the end of directory marker.
    fn write_names(&self, cursor: &mut BinaryCursor, branch: NodeId, ordinal: &mut u8) -> Result<()> {
        let node = &self.tree[branch];

        for child in node.branches() {
            let name = self.tree[*child].name();
            let bytes = encode_name(cursor.encoding(), name)?;

            *ordinal = ordinal.wrapping_add(1);
            cursor.write_u8(DIRECTORY_FLAG | bytes.len() as u8);
            cursor.write_bytes(&bytes);
            cursor.write_u8(*ordinal);
            cursor.write_u8(DIRECTORY_MARKER);

            self.write_names(cursor, *child, ordinal)?;
        }

        for child in node.leaves() {
            let name = self.tree[*child].name();
            let bytes = encode_name(cursor.encoding(), name)?;
            if bytes.is_empty() {
                return Err(Error::InvalidName(name.to_owned()));
            }

            cursor.write_u8(bytes.len() as u8);
            cursor.write_bytes(&bytes);
        }

        cursor.write_u8(END_OF_DIRECTORY);
        Ok(())
    }
}

/// Encode a name, rejecting names the encoding cannot represent or the length
/// byte cannot hold.
fn encode_name<'a>(encoding: &'static Encoding, name: &'a str) -> Result<Cow<'a, [u8]>> {
    let (bytes, _, had_errors) = encoding.encode(name);
    if had_errors || bytes.len() > MAX_NAME_LENGTH {
        return Err(Error::InvalidName(name.to_owned()));
    }
    Ok(bytes)
}

fn patch_u32(cursor: &mut BinaryCursor, at: usize, value: u32) {
    let mut seek = cursor.temporary_seek();
    seek.set_position(at);
    seek.write_u32(value);
}

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::TooLarge)
}

#[cfg(test)]
mod test {
    use encoding_rs::{REPLACEMENT, SHIFT_JIS, UTF_16BE, UTF_16LE};
    use gear_io::ByteOrder;
    use pretty_assertions::assert_eq;

    use crate::{error::Error, NarcArchive, NarcOptions};

    #[test]
    fn writes_single_file() -> Result<(), Error> {
        let mut narc = NarcArchive::new();
        let root = narc.root();
        narc.tree.add_leaf(root, "a.bin", vec![0x01, 0x02, 0x03])?;

        let bytes = narc.write()?;
        assert_eq!(bytes.len(), 256);

        #[rustfmt::skip]
        let expected_start = [
            0x4E, 0x41, 0x52, 0x43, 0xFE, 0xFF, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x10, 0x00, 0x03, 0x00,
            0x42, 0x54, 0x41, 0x46, 0x14, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00,
            0x42, 0x54, 0x4E, 0x46, 0x5C, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x01, 0x00,
            0x05, 0x61, 0x2E, 0x62, 0x69, 0x6E, 0x00,
        ];
        assert_eq!(&bytes[..59], &expected_start[..]);
        assert!(bytes[59..128].iter().all(|b| *b == 0));

        // the GMIF length counts its own magic and length field
        #[rustfmt::skip]
        let expected_image = [
            0x47, 0x4D, 0x49, 0x46, 0x80, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03,
        ];
        assert_eq!(&bytes[128..139], &expected_image[..]);
        assert!(bytes[139..].iter().all(|b| *b == 0));

        Ok(())
    }

    #[test]
    fn writes_empty_archive() -> Result<(), Error> {
        let bytes = NarcArchive::new().write()?;

        assert_eq!(bytes.len(), 136);
        assert_eq!(&bytes[8..12], &[0x88, 0x00, 0x00, 0x00]);
        // BTAF with no entries
        assert_eq!(&bytes[16..28], b"BTAF\x0C\x00\x00\x00\x00\x00\x00\x00");
        // BTNF holds only the root terminator
        assert_eq!(&bytes[28..36], b"BTNF\x64\x00\x00\x00");
        assert_eq!(bytes[44], 0x00);
        assert_eq!(&bytes[128..136], b"GMIF\x08\x00\x00\x00");

        Ok(())
    }

    #[test]
    fn writes_big_endian() -> Result<(), Error> {
        let mut narc = NarcArchive::new();
        narc.header.byte_order = ByteOrder::BigEndian;

        let bytes = narc.write()?;

        assert_eq!(&bytes[4..8], &[0xFF, 0xFE, 0x01, 0x00]);
        assert_eq!(&bytes[8..12], &[0x00, 0x00, 0x00, 0x88]);
        assert_eq!(&bytes[12..16], &[0x00, 0x10, 0x00, 0x03]);

        Ok(())
    }

    #[test]
    fn writes_directory_records() -> Result<(), Error> {
        let mut narc = NarcArchive::new();
        let root = narc.root();
        narc.tree.add_leaf(root, "z", vec![])?;
        let first = narc.tree.add_branch(root, "d1")?;
        narc.tree.add_leaf(first, "f", vec![])?;
        narc.tree.add_branch(root, "d2")?;

        let bytes = narc.write()?;

        // two allocation entries push the name records to 0x3C
        #[rustfmt::skip]
        let expected = [
            0x82, 0x64, 0x31, 0x01, 0xF0,
                0x01, 0x66,
                0x00,
            0x82, 0x64, 0x32, 0x02, 0xF0,
                0x00,
            0x01, 0x7A,
            0x00,
        ];
        assert_eq!(&bytes[0x3C..0x3C + expected.len()], &expected[..]);

        Ok(())
    }

    #[test]
    fn rejects_unstorable_names() -> Result<(), Error> {
        let mut narc = NarcArchive::new();
        let root = narc.root();
        let leaf = narc.tree.add_leaf(root, "x".repeat(0x80), vec![])?;

        assert!(matches!(narc.write(), Err(Error::InvalidName(_))));

        narc.tree[leaf].set_name("");
        assert!(matches!(narc.write(), Err(Error::InvalidName(_))));

        narc.tree[leaf].set_name("x".repeat(0x7F));
        assert!(narc.write().is_ok());

        Ok(())
    }

    #[test]
    fn encodes_names_with_options() -> Result<(), Error> {
        let mut narc = NarcArchive::new();
        let root = narc.root();
        narc.tree.add_leaf(root, "テスト", vec![0xAA])?;

        let options = NarcOptions::builder().encoding(SHIFT_JIS).build();
        let bytes = narc.write_with(options)?;

        // three double byte characters
        assert_eq!(bytes[0x34], 0x06);

        let read = NarcArchive::read_with(&bytes, options)?;
        assert_eq!(read.by_path("テスト"), Some(&[0xAA][..]));

        // windows-1252 cannot represent katakana
        let options = NarcOptions::builder().encoding(encoding_rs::WINDOWS_1252).build();
        assert!(matches!(narc.write_with(options), Err(Error::InvalidName(_))));

        // shift_jis bytes are not utf-8
        let err = NarcArchive::read(&bytes).unwrap_err();
        assert!(matches!(err, Error::UndecodableName { offset: 0x35, .. }));

        Ok(())
    }

    #[test]
    fn rejects_encodings_that_do_not_round_trip() -> Result<(), Error> {
        let mut narc = NarcArchive::new();
        let root = narc.root();
        narc.tree.add_leaf(root, "abc.bin", vec![0x01])?;
        let bytes = narc.write()?;

        for encoding in [UTF_16LE, UTF_16BE, REPLACEMENT] {
            let options = NarcOptions::builder().encoding(encoding).build();

            let err = narc.write_with(options).unwrap_err();
            assert!(matches!(err, Error::UnsupportedEncoding(name) if name == encoding.name()));

            let err = NarcArchive::read_with(&bytes, options).unwrap_err();
            assert!(matches!(err, Error::UnsupportedEncoding(_)));
        }

        Ok(())
    }
}
