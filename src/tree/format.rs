//! Serialized tree header and little-endian field helpers
//!
//! ```text
//! u32 format_version
//! i64 node_block_offset
//! i64 name_block_offset
//! i64 sorting_block_offset   (reserved, always empty)
//! ```

use crate::error::TreeError;
use std::io::{self, Read, Write};

/// Version written by the builders and the only version the reader accepts
pub const FORMAT_VERSION: u32 = 1;

/// Size of the fixed header in bytes
pub const HEADER_LEN: u64 = 4 + 8 + 8 + 8;

/// Parsed tree header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeHeader {
    pub format_version: u32,
    pub node_block_offset: u64,
    pub name_block_offset: u64,
    pub sorting_block_offset: u64,
}

impl TreeHeader {
    pub fn new(node_block_offset: u64, name_block_offset: u64, sorting_block_offset: u64) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            node_block_offset,
            name_block_offset,
            sorting_block_offset,
        }
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_u32(writer, self.format_version)?;
        write_i64(writer, self.node_block_offset as i64)?;
        write_i64(writer, self.name_block_offset as i64)?;
        write_i64(writer, self.sorting_block_offset as i64)
    }

    /// Read the header and check the version. Offsets are validated separately by
    /// [`TreeHeader::validate`] once the source length is known.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, TreeError> {
        let format_version = read_u32(reader, 0)?;
        if format_version != FORMAT_VERSION {
            return Err(TreeError::UnsupportedVersion {
                found: format_version,
                expected: FORMAT_VERSION,
            });
        }
        let node_block_offset = read_offset(reader, 4)?;
        let name_block_offset = read_offset(reader, 12)?;
        let sorting_block_offset = read_offset(reader, 20)?;
        Ok(Self {
            format_version,
            node_block_offset,
            name_block_offset,
            sorting_block_offset,
        })
    }

    /// Check that the block offsets are ordered and fit in a source of `len` bytes
    pub fn validate(&self, len: u64) -> Result<(), TreeError> {
        if self.node_block_offset < HEADER_LEN {
            return Err(TreeError::CorruptHeader(format!(
                "node block at {} overlaps the header",
                self.node_block_offset
            )));
        }
        if self.name_block_offset <= self.node_block_offset {
            return Err(TreeError::CorruptHeader(format!(
                "name block at {} does not follow node block at {}",
                self.name_block_offset, self.node_block_offset
            )));
        }
        if self.sorting_block_offset < self.name_block_offset || self.sorting_block_offset > len {
            return Err(TreeError::CorruptHeader(format!(
                "sorting block at {} outside of [{}, {}]",
                self.sorting_block_offset, self.name_block_offset, len
            )));
        }
        Ok(())
    }
}

/// Encode an optional reference, `None` becomes -1
pub(crate) fn encode_ref(value: Option<u64>) -> i64 {
    value.map(|v| v as i64).unwrap_or(-1)
}

/// Decode a reference; any negative value means "none"
pub(crate) fn decode_ref(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

pub(crate) fn write_u32<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

pub(crate) fn write_u64<W: Write>(writer: &mut W, value: u64) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

pub(crate) fn write_i64<W: Write>(writer: &mut W, value: i64) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

fn read_array<R: Read, const N: usize>(reader: &mut R, at: u64) -> Result<[u8; N], TreeError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => TreeError::Truncated(at),
        _ => TreeError::Io(e),
    })?;
    Ok(buf)
}

pub(crate) fn read_u32<R: Read>(reader: &mut R, at: u64) -> Result<u32, TreeError> {
    Ok(u32::from_le_bytes(read_array(reader, at)?))
}

pub(crate) fn read_u64<R: Read>(reader: &mut R, at: u64) -> Result<u64, TreeError> {
    Ok(u64::from_le_bytes(read_array(reader, at)?))
}

pub(crate) fn read_i64<R: Read>(reader: &mut R, at: u64) -> Result<i64, TreeError> {
    Ok(i64::from_le_bytes(read_array(reader, at)?))
}

fn read_offset<R: Read>(reader: &mut R, at: u64) -> Result<u64, TreeError> {
    let value = read_i64(reader, at)?;
    u64::try_from(value)
        .map_err(|_| TreeError::CorruptHeader(format!("negative block offset {}", value)))
}
