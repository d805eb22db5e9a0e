#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod id3v1;
pub mod id3v2;

mod dispatch;
pub mod tools;


pub use crate::dispatch::get_legacy_tag;
pub use crate::dispatch::get_tag;
pub use crate::dispatch::set_tag;

pub use crate::id3v2::validate::ValidationFailure;

use std::io;

#[derive(Debug)]
pub enum Error {
    IOError(io::Error),
    /// No "ID3" magic at the start of the stream.
    HeaderNotFound,
    /// An ID3v1 "TAG" block sits where an ID3v2 header was expected.
    WrongTagKind,
    FormatError(String),
    IntegrityError { expected: u32, actual: u32 },
    StructureInvalid(ValidationFailure),
    /// Value does not fit in a 28 bit synchsafe integer.
    EncodingRangeError(u32),
    TextEncodingError(String),
}

use std::fmt;
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::IOError(ref e) => write!(f, "IO error: {}", e),
            Error::HeaderNotFound => write!(f, "ID3v2 header not found"),
            Error::WrongTagKind => {
                write!(f, "Found an ID3v1 tag where an ID3v2 header was expected")
            }
            Error::FormatError(ref e) => write!(f, "Malformed ID3v2 tag: {}", e),
            Error::IntegrityError { expected, actual } => write!(
                f,
                "CRC mismatch: tag says 0x{:08X}, frames hash to 0x{:08X}",
                expected, actual
            ),
            Error::StructureInvalid(ref e) => write!(f, "Tag failed validation: {}", e),
            Error::EncodingRangeError(v) => {
                write!(f, "{} does not fit in a 28 bit synchsafe integer", v)
            }
            Error::TextEncodingError(ref e) => write!(f, "Text encoding error: {}", e),
        }
    }
}

use std::error;
impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::IOError(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IOError(err)
    }
}
impl From<ValidationFailure> for Error {
    fn from(err: ValidationFailure) -> Error {
        Error::StructureInvalid(err)
    }
}
