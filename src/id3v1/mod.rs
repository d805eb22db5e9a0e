//! ID3v1 and ID3v1.1 tags, the fixed 128 bytes at the end of a file.

use std::io::prelude::*;

use crate::tools::encoding::{bytes_to_text, text_to_bytes, TextEncoding};
use crate::Error;

const GENRES: [&str; 80] = [
    "Blues",
    "Classic Rock",
    "Country",
    "Dance",
    "Disco",
    "Funk",
    "Grunge",
    "Hip-Hop",
    "Jazz",
    "Metal",
    "New Age",
    "Oldies",
    "Other",
    "Pop",
    "R&B",
    "Rap",
    "Reggae",
    "Rock",
    "Techno",
    "Industrial",
    "Alternative",
    "Ska",
    "Death Metal",
    "Pranks",
    "Soundtrack",
    "Euro-Techno",
    "Ambient",
    "Trip-Hop",
    "Vocal",
    "Jazz+Funk",
    "Fusion",
    "Trance",
    "Classical",
    "Instrumental",
    "Acid",
    "House",
    "Game",
    "Sound Clip",
    "Gospel",
    "Noise",
    "AlternRock",
    "Bass",
    "Soul",
    "Punk",
    "Space",
    "Meditative",
    "Instrumental Pop",
    "Instrumental Rock",
    "Ethnic",
    "Gothic",
    "Darkwave",
    "Techno-Industrial",
    "Electronic",
    "Pop-Folk",
    "Eurodance",
    "Dream",
    "Southern Rock",
    "Comedy",
    "Cult",
    "Gangsta",
    "Top 40",
    "Christian Rap",
    "Pop/Funk",
    "Jungle",
    "Native American",
    "Cabaret",
    "New Wave",
    "Psychedelic",
    "Rave",
    "Showtunes",
    "Trailer",
    "Lo-Fi",
    "Tribal",
    "Acid Punk",
    "Acid Jazz",
    "Polka",
    "Retro",
    "Musical",
    "Rock & Roll",
    "Hard Rock",
];

pub fn genre_name(g: u8) -> Option<&'static str> {
    GENRES.get(g as usize).copied()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3v1Tag {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    /// Only ID3v1.1 has a track number.
    pub track: Option<u8>,
    /// 0xFF for none
    pub genre: u8,
}

impl Default for Id3v1Tag {
    fn default() -> Id3v1Tag {
        Id3v1Tag {
            title: String::new(),
            artist: String::new(),
            album: String::new(),
            year: String::new(),
            comment: String::new(),
            track: None,
            genre: 0xFF,
        }
    }
}

fn field(input: &[u8], code_page: u16) -> Result<String, Error> {
    bytes_to_text(TextEncoding::Latin1, input, code_page, true)
}

// truncated to the field width, zero filled
fn put_field(arr: &mut [u8], s: &str, code_page: u16) -> Result<(), Error> {
    let bytes = text_to_bytes(TextEncoding::Latin1, s, code_page, false)?;
    let n = bytes.len().min(arr.len());
    arr[..n].copy_from_slice(&bytes[..n]);
    Ok(())
}

impl Id3v1Tag {
    pub fn decode(arr: &[u8; 128], code_page: u16) -> Result<Id3v1Tag, Error> {
        if &arr[0..3] != b"TAG" {
            return Err(Error::HeaderNotFound);
        }

        // ID3v1.1: a zero byte, then the track number, in the last two bytes of the comment
        let track = match (arr[125], arr[126]) {
            (0, t) if t != 0 => Some(t),
            _ => None,
        };
        let comment = match track {
            Some(_) => &arr[97..97 + 28],
            None => &arr[97..97 + 30],
        };

        Ok(Id3v1Tag {
            title: field(&arr[3..3 + 30], code_page)?,
            artist: field(&arr[33..33 + 30], code_page)?,
            album: field(&arr[63..63 + 30], code_page)?,
            year: field(&arr[93..93 + 4], code_page)?,
            comment: field(comment, code_page)?,
            track,
            genre: arr[127],
        })
    }

    pub fn encode(&self, code_page: u16) -> Result<[u8; 128], Error> {
        let mut arr = [0; 128];
        arr[0..3].copy_from_slice(b"TAG");
        put_field(&mut arr[3..33], &self.title, code_page)?;
        put_field(&mut arr[33..63], &self.artist, code_page)?;
        put_field(&mut arr[63..93], &self.album, code_page)?;
        put_field(&mut arr[93..97], &self.year, code_page)?;
        match self.track {
            Some(t) if t != 0 => {
                put_field(&mut arr[97..125], &self.comment, code_page)?;
                arr[125] = 0;
                arr[126] = t;
            }
            _ => put_field(&mut arr[97..127], &self.comment, code_page)?,
        }
        arr[127] = self.genre;
        Ok(arr)
    }

    pub fn genre_name(&self) -> Option<&'static str> {
        genre_name(self.genre)
    }
}

pub fn has_id3v1<T: Read + Seek>(input: &mut T) -> bool {
    let mut arr: [u8; 3] = [0; 3];
    if input.seek(std::io::SeekFrom::End(-128)).is_err() {
        return false;
    }
    if input.read_exact(&mut arr).is_err() {
        return false;
    }
    &arr == b"TAG"
}

pub fn get<T: Read + Seek>(input: &mut T, code_page: u16) -> Result<Id3v1Tag, Error> {
    if input.seek(std::io::SeekFrom::End(-128)).is_err() {
        // shorter than a tag
        return Err(Error::HeaderNotFound);
    }
    let mut arr: [u8; 128] = [0; 128];
    input.read_exact(&mut arr)?;
    Id3v1Tag::decode(&arr, code_page)
}
