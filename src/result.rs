//! Error types that can be emitted from this library

use std::borrow::Cow;
use std::io;
use std::path::PathBuf;

use displaydoc::Display;
use thiserror::Error;

/// Generic result type with ExpError as its error variant
pub type ExpResult<T> = Result<T, ExpError>;

/// Problems with the archive's binary layout or its compressed payloads
#[derive(Debug, Display, Error)]
#[non_exhaustive]
pub enum FormatError {
    /// invalid archive signature: expected "CSPUD", found {0:?}
    InvalidSignature(Box<[u8]>),

    /// input ended while reading {0}
    TruncatedInput(&'static str),

    /// failed to decompress payload: {0}
    DecompressFailure(Cow<'static, str>),
}

/// Error type for EXP archives
#[derive(Debug, Display, Error)]
#[non_exhaustive]
pub enum ExpError {
    /// malformed archive: {0}
    Format(#[from] FormatError),

    /// i/o error: {0}
    Io(#[from] io::Error),

    /// failed to create output directory {path:?}: {source}
    CreateDir { path: PathBuf, source: io::Error },

    /// failed to write {path:?}: {source}
    WriteFile { path: PathBuf, source: io::Error },

    /// no entry with file id {0} in archive
    EntryNotFound(u16),
}

impl ExpError {
    /// Whether this error came from the archive's contents rather than from the filesystem.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}

pub(crate) fn decompress_failure<T, M: Into<Cow<'static, str>>>(message: M) -> ExpResult<T> {
    Err(FormatError::DecompressFailure(message.into()).into())
}

/// Turns a short read of a fixed-size structure into [`FormatError::TruncatedInput`].
pub(crate) fn truncated(what: &'static str) -> impl FnOnce(io::Error) -> ExpError {
    move |err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            FormatError::TruncatedInput(what).into()
        } else {
            ExpError::Io(err)
        }
    }
}

impl From<ExpError> for io::Error {
    fn from(err: ExpError) -> io::Error {
        let kind = match &err {
            ExpError::Format(FormatError::TruncatedInput(_)) => io::ErrorKind::UnexpectedEof,
            ExpError::Format(_) => io::ErrorKind::InvalidData,
            ExpError::Io(err) => err.kind(),
            ExpError::CreateDir { source, .. } | ExpError::WriteFile { source, .. } => {
                source.kind()
            }
            ExpError::EntryNotFound(_) => io::ErrorKind::NotFound,
        };

        io::Error::new(kind, err)
    }
}
