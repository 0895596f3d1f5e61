//! Circuit file text I/O.
//!
//! LTspice reads and writes schematics and netlists in the ANSI code page of
//! the host (cp932 on Japanese Windows). Files edited elsewhere are often
//! UTF-8, so reads fall back to UTF-8 and writes always go back to the
//! preferred encoding.

use std::path::Path;

use encoding_rs::{EncoderResult, Encoding, UTF_8};

use crate::error::{Error, Result};

/// Default preferred encoding label.
pub const DEFAULT_ENCODING: &str = "cp932";

/// Micro sign variants LTspice does not parse as the `u` prefix.
const MICRO_SIGNS: [char; 2] = ['\u{00B5}', '\u{03BC}'];

/// Replace every micro sign with the ASCII `u` prefix ("10µF" -> "10uF").
pub fn normalize_micro_symbols(text: &str) -> String {
    text.replace(MICRO_SIGNS, "u")
}

/// Reads and writes text in a preferred narrow encoding.
#[derive(Debug, Clone, Copy)]
pub struct TextCodec {
    preferred: &'static Encoding,
}

impl Default for TextCodec {
    fn default() -> Self {
        Self {
            preferred: encoding_rs::SHIFT_JIS,
        }
    }
}

impl TextCodec {
    /// Codec for a WHATWG encoding label ("cp932", "windows-1252", "utf-8", ...).
    ///
    /// Encodings that cannot be written back as themselves (UTF-16, and the
    /// decode-only "replacement" encoding) are rejected.
    pub fn for_label(label: &str) -> Result<Self> {
        // Windows code page names that WHATWG does not list as labels
        let label = match label.trim().to_ascii_lowercase().as_str() {
            "cp932" => "windows-31j".to_string(),
            "cp936" => "gbk".to_string(),
            "cp949" => "euc-kr".to_string(),
            "cp950" => "big5".to_string(),
            other => other.to_string(),
        };
        Encoding::for_label(label.as_bytes())
            .filter(|preferred| preferred.output_encoding() == *preferred)
            .map(|preferred| Self { preferred })
            .ok_or(Error::UnknownEncoding(label))
    }

    /// Name of the preferred encoding.
    pub fn name(&self) -> &'static str {
        self.preferred.name()
    }

    /// Decode bytes with the preferred encoding, or UTF-8 with invalid
    /// sequences dropped if they are not valid in it.
    pub fn decode(&self, bytes: &[u8]) -> String {
        if let Some(text) = self
            .preferred
            .decode_without_bom_handling_and_without_replacement(bytes)
        {
            return text.into_owned();
        }
        let (text, _) = UTF_8.decode_with_bom_removal(bytes);
        text.replace(char::REPLACEMENT_CHARACTER, "")
    }

    /// Encode text with the preferred encoding; unmappable characters become `?`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let mut encoder = self.preferred.new_encoder();
        let mut out = Vec::with_capacity(text.len());
        let mut buf = [0u8; 4096];
        let mut src = text;

        loop {
            let (result, read, written) =
                encoder.encode_from_utf8_without_replacement(src, &mut buf, true);
            out.extend_from_slice(&buf[..written]);
            src = &src[read..];
            match result {
                EncoderResult::InputEmpty => break,
                EncoderResult::OutputFull => {}
                EncoderResult::Unmappable(_) => out.push(b'?'),
            }
        }

        out
    }

    /// Read a text file.
    pub fn read(&self, path: &Path) -> Result<String> {
        Ok(self.decode(&std::fs::read(path)?))
    }

    /// Write a text file in the preferred encoding.
    pub fn write(&self, path: &Path, text: &str) -> Result<()> {
        std::fs::write(path, self.encode(text))?;
        Ok(())
    }
}
