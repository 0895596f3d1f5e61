//! Text decoding for simulator output.
//!
//! LTspice XVII and later write rawfile headers and log files as UTF-16LE
//! without a BOM; older releases write 8-bit text.

/// Character width of a simulator text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextWidth {
    /// UTF-16 little-endian.
    Utf16Le,
    /// One byte per character.
    Narrow,
}

impl TextWidth {
    /// Guess the width from the first bytes of a file.
    pub fn detect(data: &[u8]) -> Self {
        match data {
            [0xFF, 0xFE, ..] => TextWidth::Utf16Le,
            [lo, 0, ..] if *lo != 0 => TextWidth::Utf16Le,
            _ => TextWidth::Narrow,
        }
    }

    /// Bytes per code unit.
    pub fn unit(self) -> usize {
        match self {
            TextWidth::Utf16Le => 2,
            TextWidth::Narrow => 1,
        }
    }
}

/// Decode a simulator text file (log, ASCII rawfile) to a string.
///
/// Invalid sequences are replaced rather than rejected.
pub fn decode_text(data: &[u8]) -> String {
    decode_as(TextWidth::detect(data), data)
}

/// Decode bytes whose width is already known (e.g. the ASCII data section
/// of a rawfile whose header has been read).
pub fn decode_as(width: TextWidth, data: &[u8]) -> String {
    match width {
        TextWidth::Utf16Le => {
            let body = data.strip_prefix(&[0xFF, 0xFE]).unwrap_or(data);
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        TextWidth::Narrow => {
            let body = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);
            String::from_utf8_lossy(body).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    #[test]
    fn test_detect_width() {
        assert_eq!(TextWidth::detect(&utf16("Title")), TextWidth::Utf16Le);
        assert_eq!(TextWidth::detect(b"Title"), TextWidth::Narrow);
        assert_eq!(TextWidth::detect(&[0xFF, 0xFE, b'T', 0]), TextWidth::Utf16Le);
    }

    #[test]
    fn test_decode_utf16_log() {
        let text = decode_text(&utf16(".step j=0.1\r\n"));
        assert_eq!(text, ".step j=0.1\r\n");
    }
}
