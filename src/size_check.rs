//! Helper module to check that a decoded stream has its declared length

use std::io;
use std::io::prelude::*;

/// Reader that validates the number of bytes produced when it reaches the EOF.
pub(crate) struct SizeCheckedReader<R> {
    inner: R,
    produced: u64,
    expected: u64,
}

impl<R> SizeCheckedReader<R> {
    pub(crate) fn new(inner: R, expected: u64) -> Self {
        SizeCheckedReader {
            inner,
            produced: 0,
            expected,
        }
    }

    fn check_matches(&self) -> io::Result<()> {
        if self.produced == self.expected {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "stream ended after {} bytes, expected {}",
                    self.produced, self.expected
                ),
            ))
        }
    }
}

impl<R: Read> Read for SizeCheckedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        /* Only judge the length once the inner stream is exhausted. */
        if buf.is_empty() {
            return self.inner.read(buf);
        }

        let count = self.inner.read(buf)?;
        if count == 0 {
            return self.check_matches().map(|()| 0);
        }
        self.produced += count as u64;
        if self.produced > self.expected {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("stream is longer than the expected {} bytes", self.expected),
            ));
        }
        Ok(count)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_reader() {
        let data: &[u8] = b"";
        let mut buf = [0; 1];

        let mut reader = SizeCheckedReader::new(data, 0);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);

        let mut reader = SizeCheckedReader::new(data, 1);
        assert!(reader
            .read(&mut buf)
            .unwrap_err()
            .to_string()
            .contains("expected 1"));
    }

    #[test]
    fn test_byte_by_byte() {
        let data: &[u8] = b"1234";
        let mut buf = [0; 1];

        let mut reader = SizeCheckedReader::new(data, 4);
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        // Can keep reading 0 bytes after the end
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_too_long() {
        let data: &[u8] = b"123456";
        let mut out = Vec::new();

        let mut reader = SizeCheckedReader::new(data, 4);
        assert_eq!(
            reader.read_to_end(&mut out).unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );
    }

    #[test]
    fn test_zero_read() {
        let data: &[u8] = b"1234";
        let mut buf = [0; 5];

        let mut reader = SizeCheckedReader::new(data, 4);
        assert_eq!(reader.read(&mut buf[..0]).unwrap(), 0);
        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }
}
