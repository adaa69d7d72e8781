//! On-disk layout of EXP archives.
//!
//! Every multi-byte integer in the container is big-endian. An archive starts with a 9-byte
//! header, immediately followed by `entry_count` 6-byte entry descriptors. Each descriptor points
//! at a 12-byte payload record somewhere else in the file, which is followed by the payload body.

#![allow(clippy::wrong_self_convention)]

use crate::result::{ExpResult, FormatError, truncated};
use crate::types::EntryDescriptor;
use std::io::prelude::*;

pub type Magic = [u8; 5];

pub const ARCHIVE_SIGNATURE: Magic = *b"CSPUD";

pub const HEADER_LEN: usize = 9;
pub const ENTRY_LEN: usize = 6;
pub const PAYLOAD_RECORD_LEN: usize = 12;

pub(crate) trait Block: Sized + Copy {
    /// Human-readable name of the structure, used when the input runs out.
    const DESCRIPTION: &'static str;

    fn interpret(bytes: &[u8]) -> ExpResult<Self>;

    fn deserialize(block: &[u8]) -> Self {
        assert_eq!(block.len(), size_of::<Self>());
        let block_ptr: *const Self = block.as_ptr().cast();
        // SAFETY: implementors are `#[repr(packed)]` structs of integers and byte arrays, so any
        // byte pattern of the asserted length is a valid value.
        unsafe { block_ptr.read_unaligned() }
    }

    fn parse<T: Read>(reader: &mut T) -> ExpResult<Self> {
        let mut block = vec![0u8; size_of::<Self>()];
        reader
            .read_exact(&mut block)
            .map_err(truncated(Self::DESCRIPTION))?;
        Self::interpret(&block)
    }
}

/// Convert all the fields of a struct *from* big-endian representations.
macro_rules! from_be {
    ($obj:ident, $field:ident, $type:ty) => {
        $obj.$field = <$type>::from_be($obj.$field);
    };
    ($obj:ident, [($field:ident, $type:ty) $(,)?]) => {
        from_be![$obj, $field, $type];
    };
    ($obj:ident, [($field:ident, $type:ty), $($rest:tt),+ $(,)?]) => {
        from_be![$obj, $field, $type];
        from_be!($obj, [$($rest),+]);
    };
}

#[derive(Copy, Clone, Debug)]
#[repr(packed)]
pub(crate) struct HeaderBlock {
    pub magic: Magic,
    pub entry_count: u32,
}

const _: () = assert!(size_of::<HeaderBlock>() == HEADER_LEN);

impl HeaderBlock {
    #[inline]
    fn from_be(mut self) -> Self {
        from_be![self, [(entry_count, u32)]];
        self
    }
}

impl Block for HeaderBlock {
    const DESCRIPTION: &'static str = "archive header";

    fn interpret(bytes: &[u8]) -> ExpResult<Self> {
        let block = Self::deserialize(bytes).from_be();

        if block.magic != ARCHIVE_SIGNATURE {
            return Err(FormatError::InvalidSignature(Box::new(block.magic)).into());
        }

        Ok(block)
    }
}

#[derive(Copy, Clone, Debug)]
#[repr(packed)]
pub(crate) struct EntryBlock {
    pub file_id: u16,
    pub payload_offset: u32,
}

const _: () = assert!(size_of::<EntryBlock>() == ENTRY_LEN);

impl EntryBlock {
    #[inline]
    fn from_be(mut self) -> Self {
        from_be![self, [(file_id, u16), (payload_offset, u32)]];
        self
    }
}

impl Block for EntryBlock {
    const DESCRIPTION: &'static str = "entry table";

    fn interpret(bytes: &[u8]) -> ExpResult<Self> {
        Ok(Self::deserialize(bytes).from_be())
    }
}

#[derive(Copy, Clone, Debug)]
#[repr(packed)]
pub(crate) struct PayloadRecordBlock {
    pub compressed_size: u32,
    pub raw_size: u32,
    pub is_compressed: u32,
}

const _: () = assert!(size_of::<PayloadRecordBlock>() == PAYLOAD_RECORD_LEN);

impl PayloadRecordBlock {
    #[inline]
    fn from_be(mut self) -> Self {
        from_be![
            self,
            [
                (compressed_size, u32),
                (raw_size, u32),
                (is_compressed, u32)
            ]
        ];
        self
    }
}

impl Block for PayloadRecordBlock {
    const DESCRIPTION: &'static str = "payload record";

    fn interpret(bytes: &[u8]) -> ExpResult<Self> {
        Ok(Self::deserialize(bytes).from_be())
    }
}

/// The fixed header at the very start of an archive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub signature: Magic,
    /// Taken as-is; a bogus count shows up later as a truncated entry table.
    pub entry_count: u32,
}

/// Reads and validates the 9-byte archive header.
///
/// The signature is checked before the entry count, so an input that does not start with
/// `CSPUD` is rejected as [`FormatError::InvalidSignature`] even when it is shorter than a full
/// header. Nothing past the header is read.
pub fn decode_header<R: Read>(reader: &mut R) -> ExpResult<ArchiveHeader> {
    let mut raw = Vec::with_capacity(HEADER_LEN);
    reader
        .by_ref()
        .take(HEADER_LEN as u64)
        .read_to_end(&mut raw)?;

    if !raw.starts_with(&ARCHIVE_SIGNATURE) {
        let found = &raw[..raw.len().min(ARCHIVE_SIGNATURE.len())];
        return Err(FormatError::InvalidSignature(found.into()).into());
    }
    if raw.len() < HEADER_LEN {
        return Err(FormatError::TruncatedInput(HeaderBlock::DESCRIPTION).into());
    }

    let block = HeaderBlock::interpret(&raw)?;
    let entry_count = block.entry_count;
    log::debug!("read archive header with {entry_count} entries");

    Ok(ArchiveHeader {
        signature: block.magic,
        entry_count,
    })
}

/// Reads `count` entry descriptors, in file order, from the current position.
pub fn decode_entries<R: Read>(reader: &mut R, count: u32) -> ExpResult<Vec<EntryDescriptor>> {
    /* The count comes straight from the file, so don't trust it for the allocation. */
    let mut entries = Vec::with_capacity(count.min(4096) as usize);
    for _ in 0..count {
        let EntryBlock {
            file_id,
            payload_offset,
        } = EntryBlock::parse(reader)?;
        log::debug!("read entry {file_id} at offset {payload_offset:#X}");
        entries.push(EntryDescriptor {
            file_id,
            payload_offset,
        });
    }
    Ok(entries)
}
