use crate::Error;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFlags {
    pub unsynchronisation: bool,
    pub extended_header: bool,
    pub experimental: bool,
    // v2.4 only
    pub footer: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    // footer is essentially the same as the header
    pub version: u8,
    pub revision: u8,
    pub flags: HeaderFlags,
    /// Everything after the 10 byte header (footer excluded), as stored,
    /// so possibly unsynchronised. Goes up to 256 mb.
    pub size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedHeader {
    V3 {
        padding_size: u32,
        crc32: Option<u32>,
    },
    V4 {
        tag_is_update: bool,
        crc32: Option<u32>,
        restrictions: Option<u8>,
    },
}

impl ExtendedHeader {
    pub fn crc32(&self) -> Option<u32> {
        match *self {
            ExtendedHeader::V3 { crc32, .. } | ExtendedHeader::V4 { crc32, .. } => crc32,
        }
    }
    pub fn crc_present(&self) -> bool {
        self.crc32().is_some()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct V3FrameFlags {
    pub tag_alter_preservation: bool,
    pub file_alter_preservation: bool,
    pub read_only: bool,
    pub compression: bool,
    pub encryption: bool,
    pub grouping: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct V4FrameFlags {
    pub tag_alter_preservation: bool,
    pub file_alter_preservation: bool,
    pub read_only: bool,
    pub compression: bool,
    pub encryption: bool,
    pub grouping: bool,
    pub unsynchronisation: bool,
    pub data_length_indicator: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFlags {
    V3(V3FrameFlags),
    V4(V4FrameFlags),
}

impl FrameFlags {
    /// All flags clear, in the layout of `version`.
    pub fn empty(version: u8) -> FrameFlags {
        match version {
            4 => FrameFlags::V4(Default::default()),
            _ => FrameFlags::V3(Default::default()),
        }
    }

    pub fn version(&self) -> u8 {
        match self {
            FrameFlags::V3(_) => 3,
            FrameFlags::V4(_) => 4,
        }
    }

    pub fn compression(&self) -> bool {
        match self {
            FrameFlags::V3(f) => f.compression,
            FrameFlags::V4(f) => f.compression,
        }
    }
    pub fn encryption(&self) -> bool {
        match self {
            FrameFlags::V3(f) => f.encryption,
            FrameFlags::V4(f) => f.encryption,
        }
    }
    pub fn grouping(&self) -> bool {
        match self {
            FrameFlags::V3(f) => f.grouping,
            FrameFlags::V4(f) => f.grouping,
        }
    }

    /// Whether the payload is stored as plain frame content. Anything
    /// compressed, encrypted, grouped or otherwise wrapped has to be carried
    /// around opaquely.
    pub fn is_plain(&self) -> bool {
        match self {
            FrameFlags::V3(f) => !(f.compression || f.encryption || f.grouping),
            FrameFlags::V4(f) => {
                !(f.compression
                    || f.encryption
                    || f.grouping
                    || f.unsynchronisation
                    || f.data_length_indicator)
            }
        }
    }

    /// Same logical flags in the layout of `version`. Compression,
    /// encryption, grouping, frame unsynchronisation and the data length
    /// indicator each change how the payload is laid out, and that layout
    /// differs between versions, so such a frame cannot change version.
    pub fn to_version(&self, version: u8) -> Result<FrameFlags, Error> {
        if version == self.version() {
            return Ok(*self);
        }
        if !self.is_plain() {
            return Err(Error::FormatError(format!(
                "Frame flags {:?} cannot be carried over to ID3v2.{}",
                self, version
            )));
        }

        let (tag, file, ro) = match *self {
            FrameFlags::V3(f) => (
                f.tag_alter_preservation,
                f.file_alter_preservation,
                f.read_only,
            ),
            FrameFlags::V4(f) => (
                f.tag_alter_preservation,
                f.file_alter_preservation,
                f.read_only,
            ),
        };
        Ok(match version {
            4 => FrameFlags::V4(V4FrameFlags {
                tag_alter_preservation: tag,
                file_alter_preservation: file,
                read_only: ro,
                ..Default::default()
            }),
            _ => FrameFlags::V3(V3FrameFlags {
                tag_alter_preservation: tag,
                file_alter_preservation: file,
                read_only: ro,
                ..Default::default()
            }),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub name: String,
    pub size: u32,
    pub flags: FrameFlags,
}

/// A frame as it sits in the tag: id, flags and payload, with no
/// interpretation of the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub id: String,
    pub flags: FrameFlags,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTagInfo {
    pub version: u8,
    pub revision: u8,
    pub flags: HeaderFlags,
    pub extended_header: Option<ExtendedHeader>,
    pub frames: Vec<RawFrame>,
    /// Bytes left over after the last frame.
    pub padding_size: usize,
}

// %abc00000 %ijk00000
impl V3FrameFlags {
    pub fn decode(b: [u8; 2]) -> V3FrameFlags {
        V3FrameFlags {
            tag_alter_preservation: b[0] & 0b10000000 != 0,
            file_alter_preservation: b[0] & 0b01000000 != 0,
            read_only: b[0] & 0b00100000 != 0,
            compression: b[1] & 0b10000000 != 0,
            encryption: b[1] & 0b01000000 != 0,
            grouping: b[1] & 0b00100000 != 0,
        }
    }
    pub fn encode(&self) -> [u8; 2] {
        let mut b = [0; 2];
        if self.tag_alter_preservation {
            b[0] |= 0b10000000;
        }
        if self.file_alter_preservation {
            b[0] |= 0b01000000;
        }
        if self.read_only {
            b[0] |= 0b00100000;
        }
        if self.compression {
            b[1] |= 0b10000000;
        }
        if self.encryption {
            b[1] |= 0b01000000;
        }
        if self.grouping {
            b[1] |= 0b00100000;
        }
        b
    }
}

// %0abc0000 %0h00kmnp
impl V4FrameFlags {
    pub fn decode(b: [u8; 2]) -> V4FrameFlags {
        V4FrameFlags {
            tag_alter_preservation: b[0] & 0b01000000 != 0,
            file_alter_preservation: b[0] & 0b00100000 != 0,
            read_only: b[0] & 0b00010000 != 0,
            grouping: b[1] & 0b01000000 != 0,
            compression: b[1] & 0b00001000 != 0,
            encryption: b[1] & 0b00000100 != 0,
            unsynchronisation: b[1] & 0b00000010 != 0,
            data_length_indicator: b[1] & 0b00000001 != 0,
        }
    }
    pub fn encode(&self) -> [u8; 2] {
        let mut b = [0; 2];
        if self.tag_alter_preservation {
            b[0] |= 0b01000000;
        }
        if self.file_alter_preservation {
            b[0] |= 0b00100000;
        }
        if self.read_only {
            b[0] |= 0b00010000;
        }
        if self.grouping {
            b[1] |= 0b01000000;
        }
        if self.compression {
            b[1] |= 0b00001000;
        }
        if self.encryption {
            b[1] |= 0b00000100;
        }
        if self.unsynchronisation {
            b[1] |= 0b00000010;
        }
        if self.data_length_indicator {
            b[1] |= 0b00000001;
        }
        b
    }
}

impl FrameFlags {
    /// The two layouts are never interchangeable, `version` picks one.
    pub fn decode(version: u8, b: [u8; 2]) -> FrameFlags {
        match version {
            4 => FrameFlags::V4(V4FrameFlags::decode(b)),
            _ => FrameFlags::V3(V3FrameFlags::decode(b)),
        }
    }
    pub fn encode(&self) -> [u8; 2] {
        match self {
            FrameFlags::V3(f) => f.encode(),
            FrameFlags::V4(f) => f.encode(),
        }
    }
}
