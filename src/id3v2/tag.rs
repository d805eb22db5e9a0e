use crate::id3v2::frames::Frame;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedHeaderOptions {
    pub crc: bool,
    // v2.4 only
    pub is_update: bool,
    pub restrictions: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagOptions {
    pub unsynchronisation: bool,
    pub experimental: bool,
    /// v2.4 only. A tag with a footer gets no padding.
    pub footer: bool,
    pub padding: usize,
    pub extended_header: Option<ExtendedHeaderOptions>,
}

impl Default for TagOptions {
    fn default() -> TagOptions {
        TagOptions {
            unsynchronisation: false,
            experimental: false,
            footer: false,
            padding: 1024,
            extended_header: None,
        }
    }
}

/// An ID3v2 tag ready to be written: version, header options and frames in
/// the order they go into the file.
#[derive(Debug)]
pub struct Tag {
    pub version: u8,
    pub options: TagOptions,
    pub frames: Vec<Box<dyn Frame>>,
}

impl Tag {
    pub fn new(version: u8) -> Tag {
        Tag {
            version,
            options: Default::default(),
            frames: Vec::new(),
        }
    }

    pub fn add_frame<F: Frame + 'static>(&mut self, frame: F) {
        self.frames.push(Box::new(frame));
    }

    pub fn frame(&self, id: &str) -> Option<&dyn Frame> {
        self.frames.iter().find(|f| f.id() == id).map(|f| &**f)
    }
}
