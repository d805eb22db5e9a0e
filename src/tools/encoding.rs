//! Conversion between frame payload bytes and text for the four ID3v2 text
//! encodings.
//!
//! Encoding byte `0x00` is a single byte code page (ISO-8859-1 unless the
//! caller picks another Windows code page), `0x01` is UTF-16 led by a byte
//! order mark, `0x02` is UTF-16BE without a mark and `0x03` is UTF-8.

extern crate encoding;
use self::encoding::all::{ISO_8859_1, UTF_16BE, UTF_16LE, UTF_8};
use self::encoding::label::encoding_from_windows_code_page;
use self::encoding::{DecoderTrap, EncoderTrap, Encoding, EncodingRef};

use crate::Error;

/// Windows code page number of ISO-8859-1.
pub const DEFAULT_CODE_PAGE: u16 = 28591;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Latin1,
    Utf16,
    Utf16Be,
    Utf8,
}

impl TextEncoding {
    pub fn from_byte(b: u8) -> Result<TextEncoding, Error> {
        match b {
            0x00 => Ok(TextEncoding::Latin1),
            0x01 => Ok(TextEncoding::Utf16),
            0x02 => Ok(TextEncoding::Utf16Be),
            0x03 => Ok(TextEncoding::Utf8),
            _ => Err(Error::TextEncodingError(format!(
                "Unknown text encoding byte 0x{:02X}",
                b
            ))),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            TextEncoding::Latin1 => 0x00,
            TextEncoding::Utf16 => 0x01,
            TextEncoding::Utf16Be => 0x02,
            TextEncoding::Utf8 => 0x03,
        }
    }
}

/// Width in bytes of the null terminator for `encoding`.
pub fn terminator_width(encoding: TextEncoding) -> usize {
    match encoding {
        TextEncoding::Utf16 | TextEncoding::Utf16Be => 2,
        TextEncoding::Latin1 | TextEncoding::Utf8 => 1,
    }
}

fn code_page(cp: u16) -> Result<EncodingRef, Error> {
    match cp {
        // the label table maps latin-1 onto windows-1252, keep the real thing
        DEFAULT_CODE_PAGE => Ok(ISO_8859_1 as EncodingRef),
        _ => encoding_from_windows_code_page(cp as usize).ok_or_else(|| {
            Error::TextEncodingError(format!("Unsupported code page {}", cp))
        }),
    }
}

/// Offset of the first terminator in `input`. Two byte terminators are only
/// matched on even offsets so that a `0x00` high or low byte inside a UTF-16
/// code unit is never mistaken for one.
pub fn find_terminator(encoding: TextEncoding, input: &[u8]) -> Option<usize> {
    match terminator_width(encoding) {
        1 => input.iter().position(|&b| b == 0x00),
        _ => input
            .chunks(2)
            .position(|c| c == [0x00, 0x00])
            .map(|i| i * 2),
    }
}

/// Splits `input` around its first terminator. The second half is `None`
/// when no terminator was found.
pub fn split_at_terminator(encoding: TextEncoding, input: &[u8]) -> (&[u8], Option<&[u8]>) {
    match find_terminator(encoding, input) {
        Some(i) => (
            &input[..i],
            Some(&input[i + terminator_width(encoding)..]),
        ),
        None => (input, None),
    }
}

pub fn bytes_to_text(
    encoding: TextEncoding,
    input: &[u8],
    cp: u16,
    stop_at_first_terminator: bool,
) -> Result<String, Error> {
    let input = if stop_at_first_terminator {
        split_at_terminator(encoding, input).0
    } else {
        input
    };

    let text = match encoding {
        TextEncoding::Latin1 => code_page(cp)?.decode(input, DecoderTrap::Replace),
        TextEncoding::Utf16 => {
            // a byte order mark and a single code unit, or nothing to read
            if input.len() < 4 {
                return Ok(String::new());
            }
            match &input[0..2] {
                [0xFF, 0xFE] => UTF_16LE.decode(&input[2..], DecoderTrap::Replace),
                [0xFE, 0xFF] => UTF_16BE.decode(&input[2..], DecoderTrap::Replace),
                // in case of no BOM, assume big endian
                _ => UTF_16BE.decode(input, DecoderTrap::Replace),
            }
        }
        TextEncoding::Utf16Be => UTF_16BE.decode(input, DecoderTrap::Replace),
        TextEncoding::Utf8 => UTF_8.decode(input, DecoderTrap::Replace),
    };

    text.map(|s| s.trim_end_matches('\0').to_string())
        .map_err(|e| Error::TextEncodingError(e.into_owned()))
}

pub fn text_to_bytes(
    encoding: TextEncoding,
    text: &str,
    cp: u16,
    append_terminator: bool,
) -> Result<Vec<u8>, Error> {
    let mut vec = match encoding {
        TextEncoding::Latin1 => code_page(cp)?
            .encode(text, EncoderTrap::Strict)
            .map_err(|e| Error::TextEncodingError(e.into_owned()))?,
        TextEncoding::Utf16 => {
            let mut v = vec![0xFF, 0xFE];
            v.append(
                &mut UTF_16LE
                    .encode(text, EncoderTrap::Strict)
                    .map_err(|e| Error::TextEncodingError(e.into_owned()))?,
            );
            v
        }
        TextEncoding::Utf16Be => UTF_16BE
            .encode(text, EncoderTrap::Strict)
            .map_err(|e| Error::TextEncodingError(e.into_owned()))?,
        TextEncoding::Utf8 => text.as_bytes().to_vec(),
    };

    if append_terminator {
        vec.resize(vec.len() + terminator_width(encoding), 0x00);
    }
    Ok(vec)
}

/// Splits already decoded text at its first null into description and value.
pub fn split_description_value(text: &str) -> (String, String) {
    match text.find('\0') {
        Some(i) => (text[..i].to_string(), text[i + 1..].to_string()),
        None => (text.to_string(), String::new()),
    }
}
