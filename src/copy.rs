//! Bounded byte copying between streams.

use std::io::{self, Read, Write};

/// Copies exactly `len` bytes from `reader` to `writer`.
///
/// Fails with [`io::ErrorKind::UnexpectedEof`] if `reader` runs dry first; whatever was read up
/// to that point has already been written.
pub fn copy_exact<R, W>(reader: &mut R, writer: &mut W, len: u64) -> io::Result<u64>
where
    R: Read,
    W: Write,
{
    let copied = io::copy(&mut reader.take(len), writer)?;
    if copied < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("source ended {} bytes short of {len}", len - copied),
        ));
    }
    Ok(copied)
}
