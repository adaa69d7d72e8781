//! Types for reading EXP archives

use crate::copy::copy_exact;
use crate::result::{ExpError, ExpResult, FormatError, truncated};
use crate::spec::{self, ArchiveHeader, Block, PayloadRecordBlock};
use crate::types::{self, EntryDescriptor, PayloadRecord, StorageMode};
use std::fs::File;
use std::io::{self, BufReader, SeekFrom, prelude::*};
use std::path::Path;

mod config;

pub use config::*;

pub mod lzma;

use lzma::LzmaDecoder;

/// EXP archive reader
///
/// The header and entry table are decoded up front; payloads are located and decoded one entry
/// at a time by seeking to each entry's offset, so entries may be visited in any order.
///
/// ```no_run
/// use std::io::prelude::*;
/// fn dump_exp_contents(reader: impl Read + Seek) -> expfile::result::ExpResult<()> {
///     let mut exp = expfile::ExpArchive::new(reader)?;
///
///     for entry in exp.entries().to_vec() {
///         let data = exp.decode(entry)?;
///         println!("file {}: {} bytes", entry.file_id, data.len());
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ExpArchive<R> {
    reader: R,
    header: ArchiveHeader,
    entries: Vec<EntryDescriptor>,
    label: Box<str>,
    config: Config,
}

impl ExpArchive<BufReader<File>> {
    /// Opens the archive at `path`, labelling its log messages with the file name.
    pub fn open<P: AsRef<Path>>(path: P) -> ExpResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(path: P, config: Config) -> ExpResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let archive = Self::with_config(config, BufReader::new(file))?;
        Ok(archive.with_label(label))
    }
}

impl<R: Read + Seek> ExpArchive<R> {
    /// Read an EXP archive, decoding its header and entry table.
    pub fn new(reader: R) -> ExpResult<Self> {
        Self::with_config(Config::default(), reader)
    }

    /// Read an EXP archive with a custom configuration.
    pub fn with_config(config: Config, mut reader: R) -> ExpResult<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let header = spec::decode_header(&mut reader)?;
        let entries = spec::decode_entries(&mut reader, header.entry_count)?;
        Ok(Self {
            reader,
            header,
            entries,
            label: "<archive>".into(),
            config,
        })
    }

    /// Reads the payload record and body belonging to `entry`.
    pub fn read_payload(&mut self, entry: EntryDescriptor) -> ExpResult<PayloadRecord> {
        types::decode_payload(&mut self.reader, &entry)
    }

    /// Reads and decodes `entry`'s payload.
    pub fn decode(&mut self, entry: EntryDescriptor) -> ExpResult<Vec<u8>> {
        let record = self.read_payload(entry)?;
        decode_record(&record, &self.config)
    }

    /// Copies `entry`'s payload body to `writer` exactly as stored, without decoding it.
    ///
    /// Returns the number of bytes copied.
    pub fn copy_raw<W: Write>(&mut self, entry: EntryDescriptor, writer: &mut W) -> ExpResult<u64> {
        self.reader
            .seek(SeekFrom::Start(u64::from(entry.payload_offset)))?;
        let PayloadRecordBlock {
            compressed_size, ..
        } = PayloadRecordBlock::parse(&mut self.reader)?;
        copy_exact(&mut self.reader, writer, u64::from(compressed_size))
            .map_err(truncated("payload body"))
    }
}

impl<R> ExpArchive<R> {
    /// Replaces the name that prefixes this archive's log messages.
    #[must_use]
    pub fn with_label<S: Into<Box<str>>>(mut self, label: S) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    /// The entry table, in file order.
    pub fn entries(&self) -> &[EntryDescriptor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Finds the first entry with the given file id.
    pub fn by_id(&self, file_id: u16) -> ExpResult<EntryDescriptor> {
        self.entries
            .iter()
            .find(|entry| entry.file_id == file_id)
            .copied()
            .ok_or(ExpError::EntryNotFound(file_id))
    }

    /// Unwrap and return the inner reader object
    pub fn into_inner(self) -> R {
        self.reader
    }
}

pub(crate) enum PayloadReader<'a> {
    Stored(&'a [u8]),
    Lzma(LzmaDecoder<'a>),
}

impl Read for PayloadReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Stored(r) => r.read(buf),
            Self::Lzma(r) => r.read(buf),
        }
    }
}

pub(crate) fn construct_decoding_reader<'a>(
    record: &'a PayloadRecord,
    config: &Config,
) -> ExpResult<PayloadReader<'a>> {
    match record.storage_mode() {
        StorageMode::Stored => Ok(PayloadReader::Stored(&record.data)),
        /* Nothing to hand the decoder, and nothing expected back. */
        StorageMode::Lzma if record.data.is_empty() && record.raw_size == 0 => {
            Ok(PayloadReader::Stored(&[]))
        }
        StorageMode::Lzma => Ok(PayloadReader::Lzma(LzmaDecoder::new(
            &record.data,
            record.raw_size,
            config.memory_limit_kib,
        )?)),
    }
}

/// Recovers the original bytes of a payload.
///
/// Stored bodies are returned as-is. Compressed bodies must decode to exactly `raw_size` bytes;
/// anything else is a [`FormatError::DecompressFailure`].
pub fn decode_record(record: &PayloadRecord, config: &Config) -> ExpResult<Vec<u8>> {
    let mut reader = construct_decoding_reader(record, config)?;
    let mut out = Vec::with_capacity((record.raw_size as usize).min(1 << 24));
    reader
        .read_to_end(&mut out)
        .map_err(|err| FormatError::DecompressFailure(err.to_string().into()))?;
    Ok(out)
}
