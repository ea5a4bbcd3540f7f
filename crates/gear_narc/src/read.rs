//! Types for reading NARC archives
//!

use gear_io::{BinaryCursor, ByteOrder};
use gear_tree::{NodeId, Tree};
use tracing::{debug, instrument, trace, warn};

use crate::{
    error::{Error, Result},
    types::{
        NarcHeader, NarcOptions, BTAF_MAGIC, BTNF_MAGIC, DIRECTORY_FLAG, DIRECTORY_MARKER,
        END_OF_DIRECTORY, GMIF_MAGIC, NARC_MAGIC, ROOT_NAME,
    },
};

/// Check whether `data` starts with the NARC magic
pub fn identify(data: &[u8]) -> bool {
    data.starts_with(NARC_MAGIC)
}

/// NARC archive, held entirely in memory.
///
/// Directories are branches of [`NarcArchive::tree`] and files are leaves holding
/// their contents. The root is never written, only its children are.
///
/// ```
/// fn list_narc_contents(data: &[u8]) -> gear_narc::error::Result<()> {
///     let narc = gear_narc::NarcArchive::read(data)?;
///
///     for (path, id) in narc.files() {
///         let size = narc.tree[id].contents().map_or(0, Vec::len);
///         println!("{path}: {size} bytes");
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct NarcArchive {
    pub header: NarcHeader,
    pub tree: Tree<Vec<u8>>,
}

impl Default for NarcArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl NarcArchive {
    /// Create an empty little-endian archive
    pub fn new() -> Self {
        Self::from_tree(Tree::new(ROOT_NAME))
    }

    /// Wrap an existing tree with a default header
    pub fn from_tree(tree: Tree<Vec<u8>>) -> Self {
        Self {
            header: NarcHeader::default(),
            tree,
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.header.byte_order
    }

    /// Number of files, in any directory
    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    /// Every file with its slash separated path, in the order the archive stores them
    pub fn files(&self) -> impl Iterator<Item = (String, NodeId)> + '_ {
        self.tree
            .descendants(self.root())
            .filter(|id| self.tree[*id].is_leaf())
            .filter_map(|id| self.tree.path_of(id).map(|path| (path, id)))
    }

    /// Contents of the file at `path`
    pub fn by_path(&self, path: &str) -> Option<&[u8]> {
        let id = self
            .tree
            .find_child_by_path(self.root(), path, gear_tree::NodeKind::Leaf)?;
        self.tree[id].contents().map(Vec::as_slice)
    }

    /// Read an archive, decoding names as UTF-8
    pub fn read(data: &[u8]) -> Result<Self> {
        Self::read_with(data, NarcOptions::default())
    }

    /// Read an archive from `data`.
    ///
    /// File contents are copied out of `data`; the returned archive does not
    /// borrow from it.
    #[instrument(skip_all, err, fields(size = data.len()))]
    pub fn read_with(data: &[u8], options: NarcOptions) -> Result<Self> {
        if !identify(data) {
            return Err(Error::InvalidMagic {
                section: "NARC",
                found: data.iter().take(4).copied().collect(),
            });
        }

        options.check()?;

        let mut cursor = BinaryCursor::from(data).with_encoding(options.encoding);
        cursor.skip(4)?;

        // The mark is interpreted before the byte order is known
        let mark = cursor.read_u16()?;
        let byte_order = ByteOrder::from_mark(mark).ok_or(Error::InvalidByteOrder(mark))?;
        cursor.set_byte_order(byte_order);

        let version = cursor.read_u16()?;
        let file_length = cursor.read_u32()?;
        let header_size = cursor.read_u16()?;
        let section_count = cursor.read_u16()?;

        if file_length as usize != data.len() {
            warn!(file_length, actual = data.len(), "stored file length does not match");
        }
        debug!(?byte_order, version, header_size, section_count, "read narc header");

        // File allocation table
        let btaf_start = cursor.position();
        expect_magic(&mut cursor, BTAF_MAGIC, "BTAF")?;
        let btaf_length = cursor.read_u32()? as usize;
        let file_count = cursor.read_u32()? as usize;
        let entries = cursor.read_array(file_count, |c| Ok((c.read_u32()?, c.read_u32()?)))?;
        cursor.seek(btaf_start + btaf_length)?;
        debug!(file_count, "read allocation table");

        // File name table
        let btnf_start = cursor.position();
        expect_magic(&mut cursor, BTNF_MAGIC, "BTNF")?;
        let btnf_length = cursor.read_u32()? as usize;
        let btnf_end = btnf_start + btnf_length;
        let header_length = cursor.read_u32()? as usize;
        let blob_length = header_length
            .checked_sub(4)
            .ok_or_else(|| Error::InvalidArchive(format!("name table header length {header_length} is below 4")))?;
        let name_table_header = cursor.read_bytes(blob_length)?;

        let mut tree = Tree::new(ROOT_NAME);
        let files = read_names(&mut cursor, &mut tree, file_count, btnf_end)?;
        cursor.seek(btnf_end)?;

        // File image
        expect_magic(&mut cursor, GMIF_MAGIC, "GMIF")?;
        let gmif_length = cursor.read_u32()?;
        let payload_start = cursor.position();
        trace!(gmif_length, payload_start, "reading file image");

        for (id, (start, end)) in files.into_iter().zip(entries) {
            if end < start {
                return Err(Error::InvalidArchive(format!(
                    "file {} ends at {end:#X} before it starts at {start:#X}",
                    tree[id].name()
                )));
            }

            let contents = {
                let mut seek = cursor.temporary_seek();
                seek.seek(payload_start + start as usize)?;
                seek.read_bytes((end - start) as usize)?
            };
            if let Some(slot) = tree[id].contents_mut() {
                *slot = contents;
            }
        }

        Ok(Self {
            header: NarcHeader {
                byte_order,
                version,
                header_size,
                section_count,
                name_table_header,
            },
            tree,
        })
    }
}

fn expect_magic(cursor: &mut BinaryCursor, magic: &[u8; 4], section: &'static str) -> Result<()> {
    let found = cursor.read_slice(4)?;
    if found != magic {
        return Err(Error::InvalidMagic {
            section,
            found: found.to_vec(),
        });
    }
    Ok(())
}

/// Rebuild the directory tree from the name records, returning the files in the
/// order they were named.
fn read_names(
    cursor: &mut BinaryCursor,
    tree: &mut Tree<Vec<u8>>,
    file_count: usize,
    end: usize,
) -> Result<Vec<NodeId>> {
    let root = tree.root();
    let mut current = root;
    let mut files = Vec::with_capacity(file_count);

    while files.len() < file_count {
        if cursor.position() >= end {
            return Err(Error::InvalidArchive(format!(
                "name table ends after {} of {file_count} files",
                files.len()
            )));
        }

        match cursor.read_u8()? {
            END_OF_DIRECTORY => current = tree[current].parent().unwrap_or(root),
            record if record & DIRECTORY_FLAG != 0 => {
                current = read_directory(cursor, tree, current, record)?;
            }
            length => {
                let name = read_name(cursor, length as usize)?;
                trace!(%name, "file record");
                files.push(tree.add_leaf(current, name, Vec::new())?);
            }
        }
    }

    // Directories without files can follow the last file
    while cursor.position() < end {
        match cursor.read_u8()? {
            END_OF_DIRECTORY if current == root => break,
            END_OF_DIRECTORY => current = tree[current].parent().unwrap_or(root),
            record if record & DIRECTORY_FLAG != 0 => {
                current = read_directory(cursor, tree, current, record)?;
            }
            record => {
                warn!(record, "unexpected file record after every file was named");
                break;
            }
        }
    }

    Ok(files)
}

fn read_directory(
    cursor: &mut BinaryCursor,
    tree: &mut Tree<Vec<u8>>,
    parent: NodeId,
    record: u8,
) -> Result<NodeId> {
    let name = read_name(cursor, (record & !DIRECTORY_FLAG) as usize)?;
    let ordinal = cursor.read_u8()?;
    let marker = cursor.read_u8()?;
    if marker != DIRECTORY_MARKER {
        debug!(%name, marker, "unexpected directory marker");
    }
    trace!(%name, ordinal, "directory record");

    Ok(tree.add_branch(parent, name)?)
}

/// Decode a name without replacing malformed bytes, so that a read followed by
/// a write never changes a name.
fn read_name(cursor: &mut BinaryCursor, length: usize) -> Result<String> {
    let encoding = cursor.encoding();
    let offset = cursor.position();
    let bytes = cursor.read_slice(length)?;

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|name| name.into_owned())
        .ok_or_else(|| Error::UndecodableName {
            offset,
            bytes: bytes.to_vec(),
            encoding: encoding.name(),
        })
}

#[cfg(test)]
mod test {
    use gear_io::ByteOrder;
    use gear_tree::NodeKind;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::{error::Error, read::identify, NarcArchive};

    #[rustfmt::skip]
    const SINGLE_FILE: [u8; 64] = [
        // header
        0x4E, 0x41, 0x52, 0x43, 0xFE, 0xFF, 0x00, 0x01, 0x40, 0x00, 0x00, 0x00, 0x10, 0x00, 0x03, 0x00,
        // BTAF
        0x42, 0x54, 0x41, 0x46, 0x14, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00,
        // BTNF, no padding
        0x42, 0x54, 0x4E, 0x46, 0x10, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
        0x01, 0x61, 0x00, 0x00,
        // GMIF
        0x47, 0x4D, 0x49, 0x46, 0x0B, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03,
        0x00,
    ];

    #[test]
    fn identifies_by_magic() {
        assert!(identify(b"NARC\xFE\xFF"));
        assert!(!identify(b"NAR"));
        assert!(!identify(b"Yaz0\x00\x00\x00\x00"));
    }

    #[test]
    #[traced_test]
    fn reads_single_file() -> Result<(), Error> {
        let narc = NarcArchive::read(&SINGLE_FILE)?;

        assert_eq!(narc.byte_order(), ByteOrder::LittleEndian);
        assert_eq!(narc.header.version, 0x0100);
        assert_eq!(narc.header.name_table_header, Vec::<u8>::new());
        assert_eq!(narc.file_count(), 1);
        assert_eq!(narc.by_path("a"), Some(&[0x01, 0x02, 0x03][..]));

        assert!(!logs_contain("stored file length does not match"));

        Ok(())
    }

    #[test]
    fn rejects_foreign_magic() {
        let err = NarcArchive::read(b"Yaz0\x00\x00\x00\x10").unwrap_err();
        assert!(err.is_format_mismatch());

        let err = NarcArchive::read(b"").unwrap_err();
        assert!(matches!(err, Error::InvalidMagic { section: "NARC", ref found } if found.is_empty()));
    }

    #[test]
    fn rejects_unknown_byte_order() {
        let mut data = SINGLE_FILE;
        data[4] = 0x12;
        data[5] = 0x34;

        let err = NarcArchive::read(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidByteOrder(0x3412)));
        assert!(!err.is_format_mismatch());
    }

    #[test]
    fn rejects_inverted_entry() {
        let mut data = SINGLE_FILE;
        // start 4, end 3
        data[28] = 0x04;

        let err = NarcArchive::read(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidArchive(_)));
    }

    #[test]
    fn rejects_missing_names() {
        let mut data = SINGLE_FILE;
        // two files, one name
        data[24] = 0x02;

        assert!(NarcArchive::read(&data).is_err());
    }

    #[test]
    fn rejects_names_outside_the_encoding() {
        let mut data = SINGLE_FILE;
        // a lone continuation byte is not UTF-8
        data[0x31] = 0x83;

        let err = NarcArchive::read(&data).unwrap_err();
        assert!(matches!(
            err,
            Error::UndecodableName { offset: 0x31, ref bytes, encoding: "UTF-8" } if bytes == &[0x83]
        ));
    }

    #[test]
    fn paths_follow_directories() -> Result<(), Error> {
        let mut narc = NarcArchive::new();
        let root = narc.root();
        let sub = narc.tree.add_branch(root, "sub")?;
        narc.tree.add_leaf(sub, "b.bin", vec![0x02])?;
        narc.tree.add_leaf(root, "a.bin", vec![0x01])?;

        let paths = narc.files().map(|(path, _)| path).collect::<Vec<_>>();
        assert_eq!(paths, vec!["sub/b.bin", "a.bin"]);
        assert_eq!(narc.by_path("sub/b.bin"), Some(&[0x02][..]));
        assert_eq!(narc.by_path("sub"), None);
        assert!(narc.tree.find_child_by_path(root, "sub", NodeKind::Branch).is_some());

        Ok(())
    }
}
