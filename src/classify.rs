//! Best-effort content type detection for decoded payloads.

use std::fmt;

/// What a decoded payload looks like, judged by its leading bytes only.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Png,
    Jpeg,
    /// The application's own "kiwi" container, version 2.
    Kiwi,
    /// Anything unrecognised.
    Data,
}

impl PayloadKind {
    /// Matches `data` against the known signatures, first match wins.
    pub fn sniff(data: &[u8]) -> Self {
        match data {
            [0x89, b'P', b'N', b'G', ..] => Self::Png,
            [0xFF, 0xD8, ..] => Self::Jpeg,
            [b'k', b'i', b'w', b'i', 0x02, ..] => Self::Kiwi,
            _ => Self::Data,
        }
    }

    /// File extension, without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Kiwi => "kiw",
            Self::Data => "dat",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Output file name for an entry: `file` + zero-padded id + extension.
pub fn file_name(file_id: u16, kind: PayloadKind) -> String {
    format!("file{file_id:04}.{}", kind.extension())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn detect_png() {
        let header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(PayloadKind::sniff(&header), PayloadKind::Png);
    }

    #[test]
    fn detect_jpeg() {
        let jfif = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(PayloadKind::sniff(&jfif), PayloadKind::Jpeg);
        assert_eq!(PayloadKind::sniff(&[0xFF, 0xD8]), PayloadKind::Jpeg);
    }

    #[test]
    fn detect_kiwi() {
        assert_eq!(PayloadKind::sniff(b"kiwi\x02rest"), PayloadKind::Kiwi);
        assert_eq!(PayloadKind::sniff(b"kiwi\x01rest"), PayloadKind::Data);
        assert_eq!(PayloadKind::sniff(b"kiwi"), PayloadKind::Data);
    }

    #[test]
    fn detect_unknown() {
        assert_eq!(PayloadKind::sniff(&[]), PayloadKind::Data);
        assert_eq!(PayloadKind::sniff(&[0x89, 0x50, 0x4E]), PayloadKind::Data);
        assert_eq!(PayloadKind::sniff(&[0xFF]), PayloadKind::Data);
        assert_eq!(PayloadKind::sniff(b"GIF89a"), PayloadKind::Data);
    }

    #[test]
    fn names_are_zero_padded() {
        assert_eq!(file_name(7, PayloadKind::Png), "file0007.png");
        assert_eq!(file_name(1234, PayloadKind::Jpeg), "file1234.jpg");
        assert_eq!(file_name(65535, PayloadKind::Data), "file65535.dat");
        assert_eq!(file_name(0, PayloadKind::Kiwi), "file0000.kiw");
    }
}
