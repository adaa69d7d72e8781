#![allow(dead_code)]

use std::io::Write;
use std::sync::{Mutex, Once};

use lzma_rust2::{LzmaOptions, LzmaWriter};

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR not really a png";
pub const JPEG_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0\x00\x10JFIF\x00 not really a jpeg";

pub fn kiwi_bytes() -> Vec<u8> {
    let mut v = b"kiwi\x02".to_vec();
    v.extend((0..2000u32).map(|i| (i % 7) as u8));
    v
}

pub struct TestEntry {
    pub file_id: u16,
    pub compressed_size: u32,
    pub raw_size: u32,
    pub is_compressed: u32,
    pub body: Vec<u8>,
}

impl TestEntry {
    pub fn stored(file_id: u16, data: &[u8]) -> Self {
        Self {
            file_id,
            compressed_size: data.len() as u32,
            raw_size: data.len() as u32,
            is_compressed: 0,
            body: data.to_vec(),
        }
    }

    pub fn lzma(file_id: u16, data: &[u8]) -> Self {
        let body = lzma_frame(data);
        Self {
            file_id,
            compressed_size: body.len() as u32,
            raw_size: data.len() as u32,
            is_compressed: 1,
            body,
        }
    }

    /// Truncates the body without touching the declared compressed size.
    pub fn truncated_body(mut self, keep: usize) -> Self {
        self.body.truncate(keep);
        self
    }
}

/// Compresses `data` and wraps it in the archive's framing: props, big-endian dictionary size,
/// the raw size twice, then the bit stream with no end marker.
pub fn lzma_frame(data: &[u8]) -> Vec<u8> {
    let options = LzmaOptions::with_preset(1);
    let mut writer = LzmaWriter::new_use_header(Vec::new(), &options, Some(data.len() as u64))
        .expect("couldn't create lzma writer");
    writer.write_all(data).unwrap();
    let alone = writer.finish().unwrap();

    let (header, stream) = alone.split_at(13);
    let dict_size = u32::from_le_bytes(header[1..5].try_into().unwrap());
    let raw_size = (data.len() as u32).to_be_bytes();

    let mut framed = vec![header[0]];
    framed.extend_from_slice(&dict_size.to_be_bytes());
    framed.extend_from_slice(&raw_size);
    framed.extend_from_slice(&raw_size);
    framed.extend_from_slice(stream);
    framed
}

/// Lays out an archive. With `reversed`, payloads are written in the opposite order to the entry
/// table, with junk between them.
pub fn build_archive(entries: &[TestEntry], reversed: bool) -> Vec<u8> {
    let table_end = 9 + entries.len() * 6;
    let mut payloads = Vec::new();
    let mut offsets = vec![0u32; entries.len()];

    let order: Vec<usize> = if reversed {
        (0..entries.len()).rev().collect()
    } else {
        (0..entries.len()).collect()
    };
    for index in order {
        let entry = &entries[index];
        if reversed {
            payloads.extend_from_slice(b"junk");
        }
        offsets[index] = (table_end + payloads.len()) as u32;
        payloads.extend_from_slice(&entry.compressed_size.to_be_bytes());
        payloads.extend_from_slice(&entry.raw_size.to_be_bytes());
        payloads.extend_from_slice(&entry.is_compressed.to_be_bytes());
        payloads.extend_from_slice(&entry.body);
    }

    let mut archive = b"CSPUD".to_vec();
    archive.extend_from_slice(&(entries.len() as u32).to_be_bytes());
    for (entry, offset) in entries.iter().zip(offsets) {
        archive.extend_from_slice(&entry.file_id.to_be_bytes());
        archive.extend_from_slice(&offset.to_be_bytes());
    }
    archive.extend(payloads);
    archive
}

static CAPTURED: Mutex<Vec<(log::Level, String)>> = Mutex::new(Vec::new());

struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let line = record.args().to_string();
        CAPTURED.lock().unwrap().push((record.level(), line));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Routes every log record of this test binary into memory.
pub fn capture_logs() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Trace);
    });
}

/// Captured records whose message contains `needle`. Tests run in parallel, so filter on
/// something unique to the test, such as its archive name.
pub fn logged(needle: &str) -> Vec<(log::Level, String)> {
    let captured = CAPTURED.lock().unwrap();
    captured
        .iter()
        .filter(|(_, line)| line.contains(needle))
        .cloned()
        .collect()
}
