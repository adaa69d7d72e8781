//! Types that specify what is contained in an EXP archive.

use std::fmt;
use std::io::{self, prelude::*};

use crate::result::{ExpResult, FormatError};
use crate::spec::{Block, PayloadRecordBlock};

/// One row of the entry table.
///
/// File ids are neither unique nor sorted; the table order is the extraction order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntryDescriptor {
    pub file_id: u16,
    /// Absolute offset of the entry's [`PayloadRecord`] in the archive.
    pub payload_offset: u32,
}

/// How a payload body is stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StorageMode {
    /// The body is the payload itself.
    Stored,
    /// The body uses the archive's LZMA framing, see [`crate::read::lzma`].
    Lzma,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored => f.write_str("stored"),
            Self::Lzma => f.write_str("lzma"),
        }
    }
}

/// The per-entry record found at an entry's payload offset, with the body that follows it.
#[derive(Clone, PartialEq, Eq)]
pub struct PayloadRecord {
    pub compressed_size: u32,
    pub raw_size: u32,
    /// Nonzero when the writer flagged the body as compressed.
    pub is_compressed: u32,
    /// Exactly `compressed_size` bytes.
    pub data: Vec<u8>,
}

impl PayloadRecord {
    /// Either signal alone marks a body as compressed: the flag, or a size mismatch.
    pub fn storage_mode(&self) -> StorageMode {
        if self.is_compressed == 0 && self.compressed_size == self.raw_size {
            StorageMode::Stored
        } else {
            StorageMode::Lzma
        }
    }
}

impl fmt::Debug for PayloadRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadRecord")
            .field("compressed_size", &self.compressed_size)
            .field("raw_size", &self.raw_size)
            .field("is_compressed", &self.is_compressed)
            .field("data", &format_args!("[{} bytes]", self.data.len()))
            .finish()
    }
}

/// Seeks to `entry`'s payload offset and reads its record and body.
pub fn decode_payload<R: Read + Seek>(
    reader: &mut R,
    entry: &EntryDescriptor,
) -> ExpResult<PayloadRecord> {
    reader.seek(io::SeekFrom::Start(u64::from(entry.payload_offset)))?;

    let PayloadRecordBlock {
        compressed_size,
        raw_size,
        is_compressed,
    } = PayloadRecordBlock::parse(reader)?;

    /* Read through `take` so a corrupt size can't make us allocate gigabytes up front. */
    let mut data = Vec::new();
    reader
        .by_ref()
        .take(u64::from(compressed_size))
        .read_to_end(&mut data)?;
    if data.len() != compressed_size as usize {
        return Err(FormatError::TruncatedInput("payload body").into());
    }

    log::debug!(
        "read payload for file id {}: compressed size {compressed_size}, raw size {raw_size}, \
         is compressed {is_compressed}",
        entry.file_id
    );

    Ok(PayloadRecord {
        compressed_size,
        raw_size,
        is_compressed,
        data,
    })
}
