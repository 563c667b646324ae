//! Text decoding for imported subtitle files.
//!
//! Imported `.srt` files come from many tools. Decoding is attempted in
//! order: UTF-8 (BOM optional), UTF-16 LE/BE (BOM required), then
//! Windows-1252. A candidate is accepted only if it decodes cleanly and the
//! result contains no control characters besides tab, LF, CR and FF.

use super::error::DecodeError;

/// Encodings recognized by [`decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Windows1252,
}

impl TextEncoding {
    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16Le => "UTF-16LE",
            Self::Utf16Be => "UTF-16BE",
            Self::Windows1252 => "Windows-1252",
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Decode raw file bytes into text.
///
/// Returns the decoded text and the encoding that was accepted.
pub fn decode(bytes: &[u8]) -> Result<(String, TextEncoding), DecodeError> {
    let mut tried = Vec::new();

    if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        tried.push(TextEncoding::Utf16Le.label());
        if let Some(text) = decode_utf16(rest, u16::from_le_bytes).filter(|t| is_plausible(t)) {
            return Ok((text, TextEncoding::Utf16Le));
        }
    } else if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        tried.push(TextEncoding::Utf16Be.label());
        if let Some(text) = decode_utf16(rest, u16::from_be_bytes).filter(|t| is_plausible(t)) {
            return Ok((text, TextEncoding::Utf16Be));
        }
    }

    tried.push(TextEncoding::Utf8.label());
    let utf8 = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(utf8) {
        if is_plausible(text) {
            return Ok((text.to_string(), TextEncoding::Utf8));
        }
    }

    tried.push(TextEncoding::Windows1252.label());
    if let Some(text) = decode_windows_1252(utf8).filter(|t| is_plausible(t)) {
        return Ok((text, TextEncoding::Windows1252));
    }

    tracing::debug!("Undecodable input of {} bytes", bytes.len());
    Err(DecodeError { tried })
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Windows-1252 mapping for 0x80..=0x9F. `None` marks undefined bytes.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

fn decode_windows_1252(bytes: &[u8]) -> Option<String> {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize],
            // 0x00..=0x7F is ASCII and 0xA0..=0xFF matches Latin-1
            _ => Some(char::from(b)),
        })
        .collect()
}

fn is_plausible(text: &str) -> bool {
    !text
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r' | '\u{0C}'))
}
