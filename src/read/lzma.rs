//! Decoder for the archive's non-standard LZMA framing.
//!
//! A compressed payload body is laid out as
//!
//! ```text
//! offset  size  field
//! 0       1     properties byte, (pb * 5 + lp) * 9 + lc
//! 1       4     dictionary size, big-endian
//! 5       8     the raw size, twice, as two u32s (ignored)
//! 13      ..    LZMA bit stream, no end-of-stream marker
//! ```
//!
//! That is close enough to the legacy `.lzma` ("LZMA-alone") container that the body can be
//! decoded by a stock decoder once the first 13 bytes are rewritten into an alone header:
//! properties byte, little-endian dictionary size and a little-endian u64 uncompressed size.
//! The size is mandatory here because the stream carries no end marker.

use std::io::{self, Cursor, Read};

use lzma_rust2::LzmaReader;

use crate::result::{ExpResult, decompress_failure};
use crate::size_check::SizeCheckedReader;

/// Length of the framing that precedes the LZMA bit stream.
pub const FRAMING_LEN: usize = 13;

/// Length of a standard LZMA-alone header.
pub const ALONE_HEADER_LEN: usize = 13;

/// The three literal/position parameters packed into an LZMA properties byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LzmaProps {
    pub lc: u8,
    pub lp: u8,
    pub pb: u8,
}

impl LzmaProps {
    /// Unpacks a properties byte, or `None` if it is out of range.
    pub fn from_byte(byte: u8) -> Option<Self> {
        if byte >= 9 * 5 * 5 {
            return None;
        }
        let lc = byte % 9;
        let rest = byte / 9;
        Some(Self {
            lc,
            lp: rest % 5,
            pb: rest / 5,
        })
    }

    pub fn to_byte(self) -> u8 {
        (self.pb * 5 + self.lp) * 9 + self.lc
    }
}

/// The decoder parameters stored in front of a compressed body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LzmaFraming {
    pub props: u8,
    pub dict_size: u32,
}

impl LzmaFraming {
    /// Splits a compressed body into its framing and the bit stream that follows it.
    pub fn parse(body: &[u8]) -> ExpResult<(Self, &[u8])> {
        let Some((framing, stream)) = body.split_first_chunk::<FRAMING_LEN>() else {
            return decompress_failure(format!(
                "compressed body is {} bytes, shorter than its {FRAMING_LEN}-byte framing",
                body.len()
            ));
        };
        let [props, d0, d1, d2, d3, ..] = *framing;
        Ok((
            Self {
                props,
                dict_size: u32::from_be_bytes([d0, d1, d2, d3]),
            },
            stream,
        ))
    }

    /// Builds the LZMA-alone header a stock decoder expects for this stream.
    pub fn alone_header(&self, raw_size: u64) -> [u8; ALONE_HEADER_LEN] {
        let mut header = [0u8; ALONE_HEADER_LEN];
        header[0] = self.props;
        header[1..5].copy_from_slice(&self.dict_size.to_le_bytes());
        header[5..13].copy_from_slice(&raw_size.to_le_bytes());
        header
    }
}

type AloneStream<'a> = io::Chain<Cursor<[u8; ALONE_HEADER_LEN]>, &'a [u8]>;

/// Decompressing reader over one framed body.
pub(crate) struct LzmaDecoder<'a> {
    /* LzmaReader carries the whole decoder state inline; keep it off the stack. */
    inner: Box<SizeCheckedReader<LzmaReader<AloneStream<'a>>>>,
}

impl<'a> LzmaDecoder<'a> {
    pub(crate) fn new(body: &'a [u8], raw_size: u32, memory_limit_kib: u32) -> ExpResult<Self> {
        let (framing, stream) = LzmaFraming::parse(body)?;
        let Some(LzmaProps { lc, lp, pb }) = LzmaProps::from_byte(framing.props) else {
            return decompress_failure(format!(
                "invalid LZMA properties byte {:#04X}",
                framing.props
            ));
        };
        log::debug!(
            "lzma framing: lc={lc} lp={lp} pb={pb} dict_size={} raw_size={raw_size}",
            framing.dict_size
        );

        let header = framing.alone_header(u64::from(raw_size));
        let alone = Cursor::new(header).chain(stream);
        let reader = match LzmaReader::new_mem_limit(alone, memory_limit_kib, None) {
            Ok(reader) => reader,
            Err(err) => return decompress_failure(err.to_string()),
        };
        Ok(Self {
            inner: Box::new(SizeCheckedReader::new(reader, u64::from(raw_size))),
        })
    }
}

impl Read for LzmaDecoder<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}
