//! A library for reading and extracting EXP archives.
//!
//! EXP archives (signature `CSPUD`) bundle the image and data assets of a legacy application.
//! Each entry is stored either as-is or compressed with LZMA inside a small non-standard
//! framing, which this crate rewrites into a regular LZMA-alone stream before decoding.
//!
//! ```no_run
//! # fn main() -> expfile::result::ExpResult<()> {
//! let report = expfile::extract_archive("ui.exp", "out", &Default::default())?;
//! for (entry, err) in report.skipped() {
//!     eprintln!("file {} was skipped: {err}", entry.file_id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ---
//!
//! Decoding and extraction log through the [`log`] facade; install a logger to see them.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use crate::classify::PayloadKind;
pub use crate::extract::{ExtractOptions, ExtractionReport, extract_archive};
pub use crate::read::{Config, ExpArchive};
pub use crate::spec::{ArchiveHeader, decode_entries, decode_header};
pub use crate::types::{EntryDescriptor, PayloadRecord, StorageMode, decode_payload};

pub mod classify;
pub mod copy;
pub mod extract;
pub mod read;
pub mod result;
mod size_check;
pub mod spec;
pub mod types;
