//! Concrete frames. Each one maps named fields onto the opaque payload of a
//! [`RawFrame`] and back; the tag codec itself never looks inside payloads.

use std::fmt;

use crate::id3v2::structure::{FrameFlags, RawFrame, RawTagInfo};
use crate::tools::encoding::*;
use crate::tools::format_error;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    UserText,
    UrlLink,
    UserUrlLink,
    Comment,
    Picture,
    Binary,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            FrameKind::Text => "text",
            FrameKind::UserText => "user-text",
            FrameKind::UrlLink => "URL-link",
            FrameKind::UserUrlLink => "user URL-link",
            FrameKind::Comment => "comment",
            FrameKind::Picture => "picture",
            FrameKind::Binary => "binary",
        };
        write!(f, "{}", s)
    }
}

pub trait Frame: fmt::Debug {
    fn id(&self) -> &str;
    fn kind(&self) -> FrameKind;
    /// The encoding the payload will be written with, for frames that carry
    /// an encoding byte.
    fn text_encoding(&self) -> Option<TextEncoding>;
    fn convert(&self, version: u8) -> Result<RawFrame, Error>;
    fn import(&mut self, raw: &RawFrame, code_page: u16) -> Result<(), Error>;
}

fn raw(id: &str, version: u8, payload: Vec<u8>) -> RawFrame {
    RawFrame {
        id: id.to_string(),
        flags: FrameFlags::empty(version),
        payload,
    }
}

fn encoding_byte(raw: &RawFrame) -> Result<(TextEncoding, &[u8]), Error> {
    match raw.payload.split_first() {
        Some((&b, rest)) => Ok((TextEncoding::from_byte(b)?, rest)),
        None => Err(Error::FormatError(format!(
            "Frame {} is empty, expected a text encoding byte",
            raw.id
        ))),
    }
}

// every value is decoded on its own, each UTF-16 value has its own BOM
fn decode_values(encoding: TextEncoding, input: &[u8], cp: u16) -> Result<Vec<String>, Error> {
    let mut values = Vec::new();
    let mut rest = input;
    loop {
        let (value, next) = split_at_terminator(encoding, rest);
        match next {
            Some(next) => {
                values.push(bytes_to_text(encoding, value, cp, false)?);
                rest = next;
            }
            None => {
                if !value.is_empty() {
                    values.push(bytes_to_text(encoding, value, cp, false)?);
                }
                break;
            }
        }
    }
    Ok(values)
}

/// `T000`-`TZZZ`, except `TXXX`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFrame {
    pub id: String,
    pub encoding: TextEncoding,
    pub values: Vec<String>,
    pub code_page: u16,
}

impl TextFrame {
    pub fn new(id: &str, encoding: TextEncoding, value: &str) -> TextFrame {
        TextFrame {
            id: id.to_string(),
            encoding,
            values: vec![value.to_string()],
            code_page: DEFAULT_CODE_PAGE,
        }
    }
}

impl Frame for TextFrame {
    fn id(&self) -> &str {
        &self.id
    }
    fn kind(&self) -> FrameKind {
        FrameKind::Text
    }
    fn text_encoding(&self) -> Option<TextEncoding> {
        Some(self.encoding)
    }

    fn convert(&self, version: u8) -> Result<RawFrame, Error> {
        let mut payload = vec![self.encoding.to_byte()];
        for v in self.values.iter() {
            payload.append(&mut text_to_bytes(self.encoding, v, self.code_page, true)?);
        }
        Ok(raw(&self.id, version, payload))
    }

    fn import(&mut self, raw: &RawFrame, code_page: u16) -> Result<(), Error> {
        let (encoding, rest) = encoding_byte(raw)?;
        self.id = raw.id.clone();
        self.encoding = encoding;
        self.values = decode_values(encoding, rest, code_page)?;
        self.code_page = code_page;
        Ok(())
    }
}

/// `TXXX`
#[derive(Debug, Clone, PartialEq)]
pub struct UserTextFrame {
    pub encoding: TextEncoding,
    pub description: String,
    pub value: String,
    pub code_page: u16,
}

impl UserTextFrame {
    pub fn new(encoding: TextEncoding, description: &str, value: &str) -> UserTextFrame {
        UserTextFrame {
            encoding,
            description: description.to_string(),
            value: value.to_string(),
            code_page: DEFAULT_CODE_PAGE,
        }
    }
}

impl Frame for UserTextFrame {
    fn id(&self) -> &str {
        "TXXX"
    }
    fn kind(&self) -> FrameKind {
        FrameKind::UserText
    }
    fn text_encoding(&self) -> Option<TextEncoding> {
        Some(self.encoding)
    }

    fn convert(&self, version: u8) -> Result<RawFrame, Error> {
        let mut payload = vec![self.encoding.to_byte()];
        payload.append(&mut text_to_bytes(
            self.encoding,
            &self.description,
            self.code_page,
            true,
        )?);
        payload.append(&mut text_to_bytes(
            self.encoding,
            &self.value,
            self.code_page,
            false,
        )?);
        Ok(raw("TXXX", version, payload))
    }

    fn import(&mut self, raw: &RawFrame, code_page: u16) -> Result<(), Error> {
        let (encoding, rest) = encoding_byte(raw)?;
        let (description, value) = split_at_terminator(encoding, rest);
        self.encoding = encoding;
        self.description = bytes_to_text(encoding, description, code_page, false)?;
        self.value = match value {
            Some(v) => bytes_to_text(encoding, v, code_page, false)?,
            None => String::new(),
        };
        self.code_page = code_page;
        Ok(())
    }
}

/// `W000`-`WZZZ`, except `WXXX`. Always ISO-8859-1, no encoding byte.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlLinkFrame {
    pub id: String,
    pub url: String,
}

impl Frame for UrlLinkFrame {
    fn id(&self) -> &str {
        &self.id
    }
    fn kind(&self) -> FrameKind {
        FrameKind::UrlLink
    }
    fn text_encoding(&self) -> Option<TextEncoding> {
        None
    }

    fn convert(&self, version: u8) -> Result<RawFrame, Error> {
        let payload = text_to_bytes(TextEncoding::Latin1, &self.url, DEFAULT_CODE_PAGE, false)?;
        Ok(raw(&self.id, version, payload))
    }

    fn import(&mut self, raw: &RawFrame, _code_page: u16) -> Result<(), Error> {
        self.id = raw.id.clone();
        self.url = bytes_to_text(TextEncoding::Latin1, &raw.payload, DEFAULT_CODE_PAGE, true)?;
        Ok(())
    }
}

/// `WXXX`
#[derive(Debug, Clone, PartialEq)]
pub struct UserUrlLinkFrame {
    pub encoding: TextEncoding,
    pub description: String,
    pub url: String,
    pub code_page: u16,
}

impl UserUrlLinkFrame {
    pub fn new(encoding: TextEncoding, description: &str, url: &str) -> UserUrlLinkFrame {
        UserUrlLinkFrame {
            encoding,
            description: description.to_string(),
            url: url.to_string(),
            code_page: DEFAULT_CODE_PAGE,
        }
    }
}

impl Frame for UserUrlLinkFrame {
    fn id(&self) -> &str {
        "WXXX"
    }
    fn kind(&self) -> FrameKind {
        FrameKind::UserUrlLink
    }
    fn text_encoding(&self) -> Option<TextEncoding> {
        Some(self.encoding)
    }

    fn convert(&self, version: u8) -> Result<RawFrame, Error> {
        let mut payload = vec![self.encoding.to_byte()];
        payload.append(&mut text_to_bytes(
            self.encoding,
            &self.description,
            self.code_page,
            true,
        )?);
        payload.append(&mut text_to_bytes(
            TextEncoding::Latin1,
            &self.url,
            DEFAULT_CODE_PAGE,
            false,
        )?);
        Ok(raw("WXXX", version, payload))
    }

    fn import(&mut self, raw: &RawFrame, code_page: u16) -> Result<(), Error> {
        let (encoding, rest) = encoding_byte(raw)?;
        let (description, url) = split_at_terminator(encoding, rest);
        self.encoding = encoding;
        self.description = bytes_to_text(encoding, description, code_page, false)?;
        self.url = match url {
            Some(u) => bytes_to_text(TextEncoding::Latin1, u, DEFAULT_CODE_PAGE, true)?,
            None => String::new(),
        };
        self.code_page = code_page;
        Ok(())
    }
}

/// `COMM`
#[derive(Debug, Clone, PartialEq)]
pub struct CommentFrame {
    pub encoding: TextEncoding,
    pub language: [u8; 3],
    pub description: String,
    pub text: String,
    pub code_page: u16,
}

impl CommentFrame {
    pub fn new(encoding: TextEncoding, description: &str, text: &str) -> CommentFrame {
        CommentFrame {
            encoding,
            // iTunes needs this set to eng
            language: *b"eng",
            description: description.to_string(),
            text: text.to_string(),
            code_page: DEFAULT_CODE_PAGE,
        }
    }
}

impl Frame for CommentFrame {
    fn id(&self) -> &str {
        "COMM"
    }
    fn kind(&self) -> FrameKind {
        FrameKind::Comment
    }
    fn text_encoding(&self) -> Option<TextEncoding> {
        Some(self.encoding)
    }

    fn convert(&self, version: u8) -> Result<RawFrame, Error> {
        let mut payload = vec![self.encoding.to_byte()];
        payload.extend_from_slice(&self.language);
        payload.append(&mut text_to_bytes(
            self.encoding,
            &self.description,
            self.code_page,
            true,
        )?);
        payload.append(&mut text_to_bytes(
            self.encoding,
            &self.text,
            self.code_page,
            false,
        )?);
        Ok(raw("COMM", version, payload))
    }

    fn import(&mut self, raw: &RawFrame, code_page: u16) -> Result<(), Error> {
        let (encoding, rest) = encoding_byte(raw)?;
        if rest.len() < 3 {
            return Err(format_error("COMM frame is too short to hold a language"));
        }
        let (description, text) = split_at_terminator(encoding, &rest[3..]);
        self.encoding = encoding;
        self.language.copy_from_slice(&rest[0..3]);
        self.description = bytes_to_text(encoding, description, code_page, false)?;
        self.text = match text {
            Some(t) => bytes_to_text(encoding, t, code_page, false)?,
            None => String::new(),
        };
        self.code_page = code_page;
        Ok(())
    }
}

/// `APIC`
#[derive(Debug, Clone, PartialEq)]
pub struct PictureFrame {
    pub encoding: TextEncoding,
    pub mime: String,
    /// 0x03 is the front cover
    pub picture_type: u8,
    pub description: String,
    pub data: Vec<u8>,
    pub code_page: u16,
}

impl PictureFrame {
    pub fn new(
        encoding: TextEncoding,
        mime: &str,
        picture_type: u8,
        description: &str,
        data: Vec<u8>,
    ) -> PictureFrame {
        PictureFrame {
            encoding,
            mime: mime.to_string(),
            picture_type,
            description: description.to_string(),
            data,
            code_page: DEFAULT_CODE_PAGE,
        }
    }
}

impl Frame for PictureFrame {
    fn id(&self) -> &str {
        "APIC"
    }
    fn kind(&self) -> FrameKind {
        FrameKind::Picture
    }
    fn text_encoding(&self) -> Option<TextEncoding> {
        Some(self.encoding)
    }

    fn convert(&self, version: u8) -> Result<RawFrame, Error> {
        let mut payload = Vec::with_capacity(self.mime.len() + self.data.len() + 8);
        payload.push(self.encoding.to_byte());
        payload.append(&mut text_to_bytes(
            TextEncoding::Latin1,
            &self.mime,
            DEFAULT_CODE_PAGE,
            true,
        )?);
        payload.push(self.picture_type);
        payload.append(&mut text_to_bytes(
            self.encoding,
            &self.description,
            self.code_page,
            true,
        )?);
        payload.extend_from_slice(&self.data);
        Ok(raw("APIC", version, payload))
    }

    fn import(&mut self, raw: &RawFrame, code_page: u16) -> Result<(), Error> {
        let (encoding, rest) = encoding_byte(raw)?;
        let (mime, rest) = split_at_terminator(TextEncoding::Latin1, rest);
        let rest = rest.ok_or_else(|| format_error("APIC frame has no picture type"))?;
        let (&picture_type, rest) = rest
            .split_first()
            .ok_or_else(|| format_error("APIC frame has no picture type"))?;
        let (description, data) = split_at_terminator(encoding, rest);

        self.encoding = encoding;
        self.mime = bytes_to_text(TextEncoding::Latin1, mime, DEFAULT_CODE_PAGE, false)?;
        self.picture_type = picture_type;
        self.description = bytes_to_text(encoding, description, code_page, false)?;
        self.data = data.unwrap_or(&[]).to_vec();
        self.code_page = code_page;
        Ok(())
    }
}

/// Anything not understood above, or anything whose payload is compressed,
/// encrypted or otherwise wrapped. Kept byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryFrame {
    pub id: String,
    pub flags: FrameFlags,
    pub payload: Vec<u8>,
}

impl Frame for BinaryFrame {
    fn id(&self) -> &str {
        &self.id
    }
    fn kind(&self) -> FrameKind {
        FrameKind::Binary
    }
    fn text_encoding(&self) -> Option<TextEncoding> {
        None
    }

    fn convert(&self, version: u8) -> Result<RawFrame, Error> {
        Ok(RawFrame {
            id: self.id.clone(),
            flags: self.flags.to_version(version)?,
            payload: self.payload.clone(),
        })
    }

    fn import(&mut self, raw: &RawFrame, _code_page: u16) -> Result<(), Error> {
        self.id = raw.id.clone();
        self.flags = raw.flags;
        self.payload = raw.payload.clone();
        Ok(())
    }
}

fn frame_for(raw: &RawFrame) -> Box<dyn Frame> {
    let id = raw.id.as_str();
    if !raw.flags.is_plain() {
        return Box::new(BinaryFrame {
            id: id.to_string(),
            flags: raw.flags,
            payload: Vec::new(),
        });
    }
    match id {
        "TXXX" => Box::new(UserTextFrame::new(TextEncoding::Latin1, "", "")),
        "WXXX" => Box::new(UserUrlLinkFrame::new(TextEncoding::Latin1, "", "")),
        "COMM" => Box::new(CommentFrame::new(TextEncoding::Latin1, "", "")),
        "APIC" => Box::new(PictureFrame::new(TextEncoding::Latin1, "", 0, "", Vec::new())),
        _ if id.starts_with('T') => Box::new(TextFrame::new(id, TextEncoding::Latin1, "")),
        _ if id.starts_with('W') => Box::new(UrlLinkFrame {
            id: id.to_string(),
            url: String::new(),
        }),
        _ => Box::new(BinaryFrame {
            id: id.to_string(),
            flags: raw.flags,
            payload: Vec::new(),
        }),
    }
}

/// Turns every raw frame of a tag into its catalogue type.
pub fn import_frames(tag: &RawTagInfo, code_page: u16) -> Result<Vec<Box<dyn Frame>>, Error> {
    let mut frames = Vec::with_capacity(tag.frames.len());
    for r in tag.frames.iter() {
        let mut f = frame_for(r);
        f.import(r, code_page)?;
        frames.push(f);
    }
    Ok(frames)
}
