use std::io::prelude::*;
use std::io::SeekFrom;

use crate::id3v2::read::{read_fully, FOOTER_MAGIC, HEADER_MAGIC};
use crate::id3v2::structure::*;
use crate::id3v2::tag::Tag;
use crate::id3v2::tools::*;
use crate::id3v2::validate::validate;
use crate::tools::checksum;
use crate::tools::encode_int_be_u32;
use crate::tools::format_error;
use crate::Error;

/// Audio behind the tag is copied through a buffer of this size.
pub const COPY_CHUNK_SIZE: usize = 64 * 1024;

fn check_version(version: u8) -> Result<(), Error> {
    match version {
        3 | 4 => Ok(()),
        _ => Err(Error::FormatError(format!(
            "ID3v2.{} is not supported",
            version
        ))),
    }
}

fn encode_header_with(magic: &[u8; 3], header: &Header) -> Result<[u8; 10], Error> {
    check_version(header.version)?;
    if header.flags.footer && header.version != 4 {
        return Err(format_error("Only ID3v2.4 tags can have a footer"));
    }

    let mut flags = 0;
    if header.flags.unsynchronisation {
        flags |= 0b10000000;
    }
    if header.flags.extended_header {
        flags |= 0b01000000;
    }
    if header.flags.experimental {
        flags |= 0b00100000;
    }
    if header.flags.footer {
        flags |= 0b00010000;
    }

    let mut arr = [0; 10];
    arr[0..3].copy_from_slice(magic);
    arr[3] = header.version;
    arr[4] = header.revision;
    arr[5] = flags;
    arr[6..10].copy_from_slice(&encode_synch_int(header.size)?);
    Ok(arr)
}

pub fn encode_header(header: &Header) -> Result<[u8; 10], Error> {
    encode_header_with(HEADER_MAGIC, header)
}

pub fn encode_footer(header: &Header) -> Result<[u8; 10], Error> {
    encode_header_with(FOOTER_MAGIC, header)
}

pub fn encode_extended_header(extended_header: &ExtendedHeader) -> Result<Vec<u8>, Error> {
    Ok(match *extended_header {
        ExtendedHeader::V3 {
            padding_size,
            crc32,
        } => {
            // the size field does not count itself, and is a plain integer
            let mut vec = Vec::with_capacity(14);
            match crc32 {
                Some(_) => vec.extend_from_slice(&encode_int_be_u32(10)),
                None => vec.extend_from_slice(&encode_int_be_u32(6)),
            }
            vec.push(if crc32.is_some() { 0b10000000 } else { 0x00 });
            vec.push(0x00);
            vec.extend_from_slice(&encode_int_be_u32(padding_size));
            if let Some(crc) = crc32 {
                vec.extend_from_slice(&encode_int_be_u32(crc));
            }
            vec
        }
        ExtendedHeader::V4 {
            tag_is_update,
            crc32,
            restrictions,
        } => {
            let mut flags = 0;
            let mut blocks = Vec::new();
            if tag_is_update {
                flags |= 0b01000000;
                blocks.push(0x00);
            }
            if let Some(crc) = crc32 {
                flags |= 0b00100000;
                blocks.push(0x05);
                blocks.extend_from_slice(&encode_synch_int_5(crc));
            }
            if let Some(r) = restrictions {
                flags |= 0b00010000;
                blocks.push(0x01);
                blocks.push(r);
            }

            // the size field counts the whole extended header, synchsafe
            let size = 6 + blocks.len() as u32;
            let mut vec = Vec::with_capacity(size as usize);
            vec.extend_from_slice(&encode_synch_int(size)?);
            vec.push(0x01);
            vec.push(flags);
            vec.append(&mut blocks);
            vec
        }
    })
}

/// Serializes a frame header and payload. The size field always comes from
/// the payload itself.
pub fn encode_frame(frame: &RawFrame, version: u8) -> Result<Vec<u8>, Error> {
    check_version(version)?;

    let len = frame.payload.len();
    let size = match version {
        4 => {
            if len > MAX_SYNCH_INT as usize {
                return Err(Error::EncodingRangeError(
                    len.min(u32::max_value() as usize) as u32,
                ));
            }
            encode_synch_int(len as u32)?
        }
        _ => {
            if len > u32::max_value() as usize {
                return Err(Error::FormatError(format!(
                    "Frame {} is too large",
                    frame.id
                )));
            }
            encode_int_be_u32(len as u32)
        }
    };

    let mut vec = Vec::with_capacity(10 + len);
    vec.extend_from_slice(&encode_frame_id(&frame.id)?);
    vec.extend_from_slice(&size);
    vec.extend_from_slice(&frame.flags.to_version(version)?.encode());
    vec.extend_from_slice(&frame.payload);
    Ok(vec)
}

/// Builds the complete tag: header, body and, for v2.4 tags that ask for
/// one, the footer.
pub fn render(tag: &Tag) -> Result<Vec<u8>, Error> {
    validate(tag)?;

    let version = tag.version;
    let options = &tag.options;
    let footer = options.footer && version == 4;
    let padding = if footer { 0 } else { options.padding };

    let mut frames = Vec::new();
    for f in tag.frames.iter() {
        let raw = f.convert(version)?;
        frames.append(&mut encode_frame(&raw, version)?);
    }

    let extended_header = options.extended_header.map(|o| {
        let crc32 = if o.crc {
            Some(checksum::calculate(&frames))
        } else {
            None
        };
        match version {
            3 => ExtendedHeader::V3 {
                padding_size: padding as u32,
                crc32,
            },
            _ => ExtendedHeader::V4 {
                tag_is_update: o.is_update,
                crc32,
                restrictions: o.restrictions,
            },
        }
    });

    let mut body = Vec::with_capacity(frames.len() + padding + 32);
    if let Some(ref e) = extended_header {
        body.append(&mut encode_extended_header(e)?);
    }
    body.append(&mut frames);
    body.resize(body.len() + padding, 0x00);

    if options.unsynchronisation {
        body = apply_unsynch(&body);
    }

    if body.len() > MAX_SYNCH_INT as usize {
        return Err(Error::EncodingRangeError(MAX_SYNCH_INT));
    }

    let header = Header {
        version,
        revision: 0,
        flags: HeaderFlags {
            unsynchronisation: options.unsynchronisation,
            extended_header: extended_header.is_some(),
            experimental: options.experimental,
            footer,
        },
        size: body.len() as u32,
    };

    let mut vec = Vec::with_capacity(body.len() + 20);
    vec.extend_from_slice(&encode_header(&header)?);
    vec.append(&mut body);
    if footer {
        vec.extend_from_slice(&encode_footer(&header)?);
    }
    Ok(vec)
}

/// Length of an ID3v2 tag already sitting at the start of `input`, 0 if
/// there is none. Only the magic and size are trusted, so tags of versions
/// this crate cannot parse still get stripped.
pub fn existing_tag_length<T: Read + Seek>(input: &mut T) -> Result<u64, Error> {
    input.seek(SeekFrom::Start(0))?;
    let mut arr = [0; 10];
    let n = read_fully(input, &mut arr)?;
    if n < 10 || &arr[0..3] != HEADER_MAGIC {
        return Ok(0);
    }

    let mut length = 10 + decode_synch_int(&arr[6..10]) as u64;
    if arr[3] == 4 && arr[5] & 0b00010000 != 0 {
        length += 10;
    }
    Ok(length)
}

pub fn write<R: Read + Seek, W: Write>(
    tag: &Tag,
    input: &mut R,
    output: &mut W,
) -> Result<(), Error> {
    // fails on an invalid tag before the streams are touched
    let vec = render(tag)?;

    let old_size = existing_tag_length(input)?;
    if old_size > 0 {
        debug!("skipping {} bytes of old ID3v2 tag", old_size);
    }
    // move to the start of music data in the input
    input.seek(SeekFrom::Start(old_size))?;

    output.write_all(&vec)?;

    let mut buf = vec![0; COPY_CHUNK_SIZE];
    let mut copied: u64 = 0;
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        output.write_all(&buf[..n])?;
        copied += n as u64;
    }
    output.flush()?;

    debug!("wrote {} byte tag and {} bytes of audio", vec.len(), copied);
    Ok(())
}
