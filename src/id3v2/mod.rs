//! ID3v2.3 / ID3v2.4 tags at the head of a file.
//!
//! [`get_raw`] parses a tag down to [`RawFrame`]s with opaque payloads,
//! [`get`] additionally turns those into the frame types of [`frames`], and
//! [`set`] writes a [`Tag`] in front of the audio of another stream.

use std::io::prelude::*;

use crate::Error;

pub mod frames;
pub mod read;
pub mod structure;
pub mod tag;
pub mod tools;
pub mod validate;
pub mod write;

pub use self::frames::Frame;
pub use self::structure::*;
pub use self::tag::{ExtendedHeaderOptions, Tag, TagOptions};

pub fn get_raw<T: Read + Seek>(input: &mut T) -> Result<RawTagInfo, Error> {
    read::raw_tag(input)
}

pub fn get<T: Read + Seek>(input: &mut T, code_page: u16) -> Result<Tag, Error> {
    let raw = read::raw_tag(input)?;
    let frames = frames::import_frames(&raw, code_page)?;

    let extended_header = raw.extended_header.map(|e| match e {
        ExtendedHeader::V3 { crc32, .. } => ExtendedHeaderOptions {
            crc: crc32.is_some(),
            ..Default::default()
        },
        ExtendedHeader::V4 {
            tag_is_update,
            crc32,
            restrictions,
        } => ExtendedHeaderOptions {
            crc: crc32.is_some(),
            is_update: tag_is_update,
            restrictions,
        },
    });

    Ok(Tag {
        version: raw.version,
        options: TagOptions {
            unsynchronisation: raw.flags.unsynchronisation,
            experimental: raw.flags.experimental,
            footer: raw.flags.footer,
            padding: raw.padding_size,
            extended_header,
        },
        frames,
    })
}

pub fn set<R: Read + Seek, W: Write>(tag: &Tag, input: &mut R, output: &mut W) -> Result<(), Error> {
    write::write(tag, input, output)
}

#[cfg(test)]
mod tests;
