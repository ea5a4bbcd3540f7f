//! Byte order selection and the byte order mark used by binary formats.

/// Order in which the bytes of multi-byte values are stored.
///
/// The discriminants are the values a byte order mark takes when its two bytes
/// are read as a little-endian `u16`. Writers always store [`ByteOrder::MARK`]
/// in their own order, so little-endian data carries `FE FF` and big-endian data
/// carries `FF FE`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ByteOrder {
    /// Least significant byte first
    #[default]
    LittleEndian = 0xFFFE,

    /// Most significant byte first
    BigEndian = 0xFEFF,
}

impl ByteOrder {
    /// Value written as the byte order mark, in the order being declared
    pub const MARK: u16 = 0xFFFE;

    /// Byte order of the machine running this code
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        }
    }

    /// Interpret a byte order mark that was read as a little-endian `u16`
    pub const fn from_mark(mark: u16) -> Option<Self> {
        match mark {
            0xFFFE => Some(ByteOrder::LittleEndian),
            0xFEFF => Some(ByteOrder::BigEndian),
            _ => None,
        }
    }

    /// The byte order mark as it reads back little-endian
    pub const fn mark(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for ByteOrder {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        ByteOrder::from_mark(value).ok_or(value)
    }
}
