use std::io::prelude::*;

use crate::id3v2::structure::*;
use crate::id3v2::tools::*;
use crate::tools::checksum;
use crate::tools::decode_int_be_u32;
use crate::tools::encode_int_be_u32;
use crate::tools::format_error;
use crate::Error;

pub const HEADER_MAGIC: &[u8; 3] = b"ID3";
pub const FOOTER_MAGIC: &[u8; 3] = b"3DI";
pub const ID3V1_MAGIC: &[u8; 3] = b"TAG";

/// A bounded view over the in-memory tag body. Running off the end is a
/// format error, never an I/O error.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> ByteReader<'a> {
        ByteReader { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn peek(&self, n: usize) -> &'a [u8] {
        &self.data[self.pos..self.data.len().min(self.pos + n)]
    }

    pub fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8], Error> {
        if n > self.remaining() {
            return Err(Error::FormatError(format!(
                "{} needs {} bytes but only {} are left in the tag",
                what,
                n,
                self.remaining()
            )));
        }
        let s = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    pub fn byte(&mut self, what: &str) -> Result<u8, Error> {
        Ok(self.take(1, what)?[0])
    }
}

// keep reading until the buffer is full or the stream runs dry
pub fn read_fully<T: Read>(input: &mut T, buf: &mut [u8]) -> Result<usize, Error> {
    let mut n = 0;
    while n < buf.len() {
        match input.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(k) => n += k,
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(n)
}

pub fn decode_header(arr: &[u8]) -> Result<Header, Error> {
    if arr.len() < 3 {
        return Err(Error::HeaderNotFound);
    }

    // ID3v2/file identifier      "ID3"
    if &arr[0..3] != HEADER_MAGIC {
        if &arr[0..3] == ID3V1_MAGIC {
            return Err(Error::WrongTagKind);
        }
        return Err(Error::HeaderNotFound);
    }
    if arr.len() < 10 {
        return Err(format_error("ID3v2 header is truncated"));
    }

    // ID3v2 version              $0X 00
    let version = arr[3];
    let revision = arr[4];
    if revision == 0xFF {
        return Err(format_error("Invalid ID3v2 revision"));
    }
    if version != 3 && version != 4 {
        return Err(Error::FormatError(format!(
            "ID3v2.{} is not supported",
            version
        )));
    }

    // ID3v2 flags                %abcd0000
    let flags = arr[5];
    let known = match version {
        3 => 0b11100000,
        _ => 0b11110000,
    };
    if flags & !known != 0 {
        return Err(format_error("Unsupported flags found in ID3 header"));
    }

    Ok(Header {
        version,
        revision,
        flags: HeaderFlags {
            unsynchronisation: flags & 0b10000000 != 0,
            extended_header: flags & 0b01000000 != 0,
            experimental: flags & 0b00100000 != 0,
            footer: flags & 0b00010000 != 0,
        },
        // ID3v2 size             4 * %0xxxxxxx
        size: decode_synch_int(&arr[6..10]),
    })
}

pub fn header<T: Read + Seek>(input: &mut T) -> Result<Header, Error> {
    input.seek(std::io::SeekFrom::Start(0))?;

    let mut arr: [u8; 10] = [0; 10];
    let n = read_fully(input, &mut arr)?;
    decode_header(&arr[..n])
}

pub fn extended_header(version: u8, input: &mut ByteReader) -> Result<ExtendedHeader, Error> {
    match version {
        3 => extended_header_v3(input),
        4 => extended_header_v4(input),
        _ => Err(Error::FormatError(format!(
            "ID3v2.{} is not supported",
            version
        ))),
    }
}

// 4: Extended header size   $xx xx xx xx (plain, excludes itself)
// 2: Extended Flags         $xx xx
// 4: Size of padding        $xx xx xx xx
// 4: CRC, if flagged        $xx xx xx xx
fn extended_header_v3(input: &mut ByteReader) -> Result<ExtendedHeader, Error> {
    let size = decode_int_be_u32(input.take(4, "extended header size")?) as usize;
    let start = input.position();

    let flags = input.take(2, "extended header flags")?;
    let has_crc = flags[0] & 0b10000000 != 0;
    let padding_size = decode_int_be_u32(input.take(4, "extended header padding size")?);

    let crc32 = if has_crc {
        Some(decode_int_be_u32(input.take(4, "extended header CRC")?))
    } else {
        None
    };

    skip_extended_rest(input, start, size)?;

    Ok(ExtendedHeader::V3 {
        padding_size,
        crc32,
    })
}

// 4: Extended header size   4 * %0xxxxxxx (synchsafe, includes itself)
// 1: Number of flag bytes   $01
// 1: Extended Flags         %0bcd0000
// then one length-prefixed block per set flag
fn extended_header_v4(input: &mut ByteReader) -> Result<ExtendedHeader, Error> {
    let start = input.position();
    let size = decode_synch_int(input.take(4, "extended header size")?) as usize;
    if size < 6 {
        return Err(Error::FormatError(format!(
            "Extended header claims {} bytes, at least 6 are needed",
            size
        )));
    }

    input.byte("extended header flag count")?;
    let flags = input.byte("extended header flags")?;

    let tag_is_update = flags & 0b01000000 != 0;
    if tag_is_update {
        expect_block_length(input, 0, "update")?;
    }

    let crc32 = if flags & 0b00100000 != 0 {
        expect_block_length(input, 5, "CRC")?;
        Some(decode_synch_int(input.take(5, "extended header CRC")?))
    } else {
        None
    };

    let restrictions = if flags & 0b00010000 != 0 {
        expect_block_length(input, 1, "restrictions")?;
        Some(input.byte("extended header restrictions")?)
    } else {
        None
    };

    skip_extended_rest(input, start + 4, size - 4)?;

    Ok(ExtendedHeader::V4 {
        tag_is_update,
        crc32,
        restrictions,
    })
}

fn expect_block_length(input: &mut ByteReader, expected: u8, what: &str) -> Result<(), Error> {
    let length = input.byte("extended header block length")?;
    if length != expected {
        return Err(Error::FormatError(format!(
            "Extended header {} block has length {}, expected {}",
            what, length, expected
        )));
    }
    Ok(())
}

// move the cursor to the end of the extended header as declared by its size
fn skip_extended_rest(input: &mut ByteReader, start: usize, size: usize) -> Result<(), Error> {
    let consumed = input.position() - start;
    if consumed > size {
        return Err(Error::FormatError(format!(
            "Extended header declares {} bytes but its fields need {}",
            size, consumed
        )));
    }
    input.take(size - consumed, "extended header")?;
    Ok(())
}

/// Decodes a 10 byte frame header. `Ok(None)` means the frame area is over
/// and padding begins.
pub fn frame_header(input: &[u8], version: u8) -> Result<Option<FrameHeader>, Error> {
    if input.len() < 10 {
        return Err(format_error("Frame header needs 10 bytes"));
    }

    // padding, or a tag writer that did not bother with any
    if input[0..3] == [0x00, 0x00, 0x00] {
        return Ok(None);
    }

    // 4: Frame ID      $xx xx xx xx  (four characters)
    // 4: Size      4 * %0xxxxxxx in 2.4 / $xx in 2.3
    // 2: Flags         $xx xx
    let size = match version {
        3 => decode_int_be_u32(&input[4..8]),
        4 => decode_synch_int(&input[4..8]),
        _ => return Err(format_error("Unknown ID3 version")),
    };

    Ok(Some(FrameHeader {
        name: decode_frame_id(&input[0..4])?,
        size,
        flags: FrameFlags::decode(version, [input[8], input[9]]),
    }))
}

enum ScanState {
    ExpectExtendedHeader,
    ScanningFrames,
    Done,
}

/// Parses an already de-unsynchronised tag body into raw frames and checks
/// the CRC if the extended header carries one.
pub fn body(header: &Header, data: &[u8]) -> Result<RawTagInfo, Error> {
    let mut input = ByteReader::new(data);
    let mut state = ScanState::ExpectExtendedHeader;

    let mut extended_header = None;
    let mut frames = Vec::new();
    let mut frame_bytes = Vec::new();

    loop {
        state = match state {
            ScanState::ExpectExtendedHeader => {
                if header.flags.extended_header {
                    let e = self::extended_header(header.version, &mut input)?;
                    debug!("extended header: {:?}", e);
                    extended_header = Some(e);
                }
                ScanState::ScanningFrames
            }
            ScanState::ScanningFrames => {
                if input.remaining() < 10 {
                    ScanState::Done
                } else {
                    let start = input.position();
                    match frame_header(input.peek(10), header.version)? {
                        None => {
                            trace!("padding starts at {}", start);
                            ScanState::Done
                        }
                        Some(f) => {
                            input.take(10, "frame header")?;
                            let what = format!("frame {}", f.name);
                            let payload = input.take(f.size as usize, &what)?;
                            frame_bytes.extend_from_slice(&data[start..input.position()]);
                            frames.push(RawFrame {
                                id: f.name,
                                flags: f.flags,
                                payload: payload.to_vec(),
                            });
                            ScanState::ScanningFrames
                        }
                    }
                }
            }
            ScanState::Done => break,
        }
    }

    if let Some(expected) = extended_header.and_then(|e| e.crc32()) {
        if !checksum::validate(&frame_bytes, &encode_int_be_u32(expected)) {
            let actual = checksum::calculate(&frame_bytes);
            warn!("CRC mismatch: 0x{:08X} != 0x{:08X}", expected, actual);
            return Err(Error::IntegrityError { expected, actual });
        }
        trace!("CRC 0x{:08X} verified", expected);
    }

    debug!(
        "ID3v2.{}.{}: {} frames, {} bytes of padding",
        header.version,
        header.revision,
        frames.len(),
        input.remaining()
    );

    Ok(RawTagInfo {
        version: header.version,
        revision: header.revision,
        flags: header.flags,
        extended_header,
        frames,
        padding_size: input.remaining(),
    })
}

pub fn raw_tag<T: Read + Seek>(input: &mut T) -> Result<RawTagInfo, Error> {
    let header = header(input)?;
    debug!("found ID3v2 header: {:?}", header);

    // the size field is synchsafe, so this never exceeds MAX_SYNCH_INT
    let size = header.size.min(MAX_SYNCH_INT) as usize;
    let mut data = Vec::new();
    input.by_ref().take(size as u64).read_to_end(&mut data)?;
    if data.len() < size {
        return Err(Error::FormatError(format!(
            "Tag declares {} bytes but the stream ends after {}",
            size,
            data.len()
        )));
    }

    if header.flags.footer {
        let mut footer = [0; 10];
        let n = read_fully(input, &mut footer)?;
        if n < 10 || &footer[0..3] != FOOTER_MAGIC {
            return Err(format_error("Tag footer is missing"));
        }
    }

    if header.flags.unsynchronisation {
        data = undo_unsynch(&data);
    }

    body(&header, &data)
}
