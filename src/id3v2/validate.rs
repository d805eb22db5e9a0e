use std::error;
use std::fmt;

use crate::id3v2::frames::FrameKind;
use crate::id3v2::tag::Tag;
use crate::id3v2::tools::is_valid_frame_id;
use crate::tools::encoding::TextEncoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    UnsupportedVersion(u8),
    InvalidFrameId(String),
    EncodingNotAllowed {
        frame_id: String,
        kind: FrameKind,
        encoding: TextEncoding,
    },
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationFailure::UnsupportedVersion(v) => {
                write!(f, "ID3v2.{} tags cannot be written", v)
            }
            ValidationFailure::InvalidFrameId(id) => write!(f, "\"{}\" is not a frame ID", id),
            ValidationFailure::EncodingNotAllowed {
                frame_id,
                kind,
                encoding,
            } => write!(
                f,
                "{} frame {} uses {:?}, ID3v2.3 only allows ISO-8859-1 and UTF-16 with BOM",
                kind, frame_id, encoding
            ),
        }
    }
}

impl error::Error for ValidationFailure {}

/// Structural check run before anything is serialized. v2.3 only knows text
/// encodings 0 and 1.
pub fn validate(tag: &Tag) -> Result<(), ValidationFailure> {
    if tag.version != 3 && tag.version != 4 {
        return Err(ValidationFailure::UnsupportedVersion(tag.version));
    }

    for f in tag.frames.iter() {
        if !is_valid_frame_id(f.id()) {
            return Err(ValidationFailure::InvalidFrameId(f.id().to_string()));
        }

        if tag.version == 3 {
            match f.text_encoding() {
                Some(e @ TextEncoding::Utf16Be) | Some(e @ TextEncoding::Utf8) => {
                    return Err(ValidationFailure::EncodingNotAllowed {
                        frame_id: f.id().to_string(),
                        kind: f.kind(),
                        encoding: e,
                    });
                }
                _ => (),
            }
        }
    }
    Ok(())
}
