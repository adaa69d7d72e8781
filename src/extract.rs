//! Writing decoded payloads to disk.
//!
//! Once the header and entry table have been read and the output directory exists, a failure in
//! one entry is logged and recorded in the [`ExtractionReport`], and extraction moves on to the
//! next entry.

use std::borrow::Cow;
use std::fs;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use crate::classify::{self, PayloadKind};
use crate::read::{Config, ExpArchive, decode_record};
use crate::result::{ExpError, ExpResult};
use crate::types::EntryDescriptor;

/// Options for [`extract_archive`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractOptions {
    pub config: Config,
    /// Stripped from the archive's file name to name its output directory.
    pub archive_suffix: Cow<'static, str>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            config: Config::default(),
            archive_suffix: Cow::Borrowed(".exp"),
        }
    }
}

impl ExtractOptions {
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn archive_suffix<S: Into<Cow<'static, str>>>(mut self, suffix: S) -> Self {
        self.archive_suffix = suffix.into();
        self
    }
}

/// A payload that made it to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrittenPayload {
    pub path: PathBuf,
    pub kind: PayloadKind,
    pub size: u64,
}

/// What happened to one entry.
#[derive(Debug)]
pub struct EntryOutcome {
    pub entry: EntryDescriptor,
    pub result: ExpResult<WrittenPayload>,
}

/// Per-entry results of extracting one archive, in entry table order.
#[derive(Debug)]
pub struct ExtractionReport {
    pub out_dir: PathBuf,
    pub outcomes: Vec<EntryOutcome>,
}

impl ExtractionReport {
    pub fn written(&self) -> impl Iterator<Item = (&EntryDescriptor, &WrittenPayload)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|w| (&o.entry, w)))
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&EntryDescriptor, &ExpError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.entry, e)))
    }

    /// True when every entry was written.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

/// Names `bytes` after its entry and sniffed type, and writes it into `out_dir`.
///
/// An existing file of the same name is overwritten.
pub fn classify_and_write(
    bytes: &[u8],
    entry: &EntryDescriptor,
    out_dir: &Path,
) -> ExpResult<WrittenPayload> {
    let kind = PayloadKind::sniff(bytes);
    let path = out_dir.join(classify::file_name(entry.file_id, kind));
    fs::write(&path, bytes).map_err(|source| ExpError::WriteFile {
        path: path.clone(),
        source,
    })?;
    Ok(WrittenPayload {
        path,
        kind,
        size: bytes.len() as u64,
    })
}

/// Name of the directory an archive is extracted into: its file name minus `suffix`.
pub fn output_dir_name(archive: &Path, suffix: &str) -> String {
    let name = archive
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| archive.display().to_string());
    match name.strip_suffix(suffix) {
        Some(stem) if !stem.is_empty() => stem.to_owned(),
        _ => name,
    }
}

impl<R: Read + Seek> ExpArchive<R> {
    /// Extract every entry into `directory`, creating it if needed.
    ///
    /// Only a failure to create `directory` aborts; per-entry failures end up in the report.
    pub fn extract<P: AsRef<Path>>(&mut self, directory: P) -> ExpResult<ExtractionReport> {
        let out_dir = directory.as_ref();
        fs::create_dir_all(out_dir).map_err(|source| {
            log::error!(
                "[{}] failed to create output directory {}: {source}",
                self.label(),
                out_dir.display()
            );
            ExpError::CreateDir {
                path: out_dir.to_path_buf(),
                source,
            }
        })?;

        let mut outcomes = Vec::with_capacity(self.len());
        for index in 0..self.len() {
            let entry = self.entries()[index];
            let result = self.extract_entry(entry, out_dir);
            match &result {
                Ok(written) => log::info!(
                    "[{}] wrote file id {} to {} ({} bytes)",
                    self.label(),
                    entry.file_id,
                    written.path.display(),
                    written.size
                ),
                Err(err) => log::error!(
                    "[{}] failed to extract file id {}: {err}",
                    self.label(),
                    entry.file_id
                ),
            }
            outcomes.push(EntryOutcome { entry, result });
        }

        let report = ExtractionReport {
            out_dir: out_dir.to_path_buf(),
            outcomes,
        };
        log::info!(
            "[{}] extracted {} of {} entries into {}",
            self.label(),
            report.written().count(),
            report.outcomes.len(),
            out_dir.display()
        );
        Ok(report)
    }

    fn extract_entry(
        &mut self,
        entry: EntryDescriptor,
        out_dir: &Path,
    ) -> ExpResult<WrittenPayload> {
        let record = self.read_payload(entry)?;
        let bytes = decode_record(&record, self.config())?;
        classify_and_write(&bytes, &entry, out_dir)
    }
}

/// Extracts the archive at `archive` into `out_root/<archive name without suffix>/`.
pub fn extract_archive<P, Q>(
    archive: P,
    out_root: Q,
    options: &ExtractOptions,
) -> ExpResult<ExtractionReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let archive = archive.as_ref();
    let out_dir = out_root
        .as_ref()
        .join(output_dir_name(archive, &options.archive_suffix));
    ExpArchive::open_with_config(archive, options.config)?.extract(out_dir)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn output_dir_strips_suffix() {
        assert_eq!(output_dir_name(Path::new("data/ui.exp"), ".exp"), "ui");
        assert_eq!(output_dir_name(Path::new("ui.EXP"), ".exp"), "ui.EXP");
        assert_eq!(output_dir_name(Path::new("sounds"), ".exp"), "sounds");
        assert_eq!(output_dir_name(Path::new(".exp"), ".exp"), ".exp");
    }

    #[test]
    fn writes_with_sniffed_extension() {
        let dir = tempfile::tempdir().unwrap();
        let entry = EntryDescriptor {
            file_id: 12,
            payload_offset: 0,
        };
        let written = classify_and_write(b"\xFF\xD8\xFF\xE0jfif", &entry, dir.path()).unwrap();
        assert_eq!(written.kind, PayloadKind::Jpeg);
        assert_eq!(written.path, dir.path().join("file0012.jpg"));
        assert_eq!(fs::read(&written.path).unwrap(), b"\xFF\xD8\xFF\xE0jfif");
    }

    #[test]
    fn later_entry_overwrites_same_name() {
        let dir = tempfile::tempdir().unwrap();
        let entry = EntryDescriptor {
            file_id: 3,
            payload_offset: 0,
        };
        classify_and_write(b"first", &entry, dir.path()).unwrap();
        let written = classify_and_write(b"second", &entry, dir.path()).unwrap();
        assert_eq!(fs::read(written.path).unwrap(), b"second");
    }

    #[test]
    fn missing_directory_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let entry = EntryDescriptor {
            file_id: 3,
            payload_offset: 0,
        };
        let absent = dir.path().join("absent");
        let err = classify_and_write(b"x", &entry, &absent).unwrap_err();
        assert!(matches!(err, ExpError::WriteFile { .. }));
    }
}
