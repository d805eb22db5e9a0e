use regex::Regex;

use crate::Error;

/// Largest value a 4 byte synchsafe integer can hold.
pub const MAX_SYNCH_INT: u32 = 0x0FFFFFFF;

// the msb of each byte is padding, never data
pub fn decode_synch_int(input: &[u8]) -> u32 {
    let mut result: u32 = 0;
    for b in input.iter() {
        // (0000 0001 0111 1111 => 1111 1111)
        result = (result << 7) | (*b & 0x7F) as u32;
    }
    result
}

pub fn encode_synch_int(input: u32) -> Result<[u8; 4], Error> {
    if input > MAX_SYNCH_INT {
        return Err(Error::EncodingRangeError(input));
    }
    let mut result = [0; 4];
    for i in 0..4 {
        result[i] = ((input >> (7 * (3 - i))) & 0x7F) as u8;
    }
    Ok(result)
}

/// 35 bit form used by the v2.4 extended header CRC, wide enough for any u32.
pub fn encode_synch_int_5(input: u32) -> [u8; 5] {
    let mut result = [0; 5];
    for i in 0..5 {
        result[i] = ((input as u64 >> (7 * (4 - i))) & 0x7F) as u8;
    }
    result
}

pub fn undo_unsynch(input: &[u8]) -> Vec<u8> {
    let mut vec = Vec::with_capacity(input.len());
    let mut previous = 0x00;
    for &b in input.iter() {
        if !(previous == 0xFF && b == 0x00) {
            vec.push(b);
        }
        previous = b;
    }
    vec
}

pub fn apply_unsynch(input: &[u8]) -> Vec<u8> {
    let mut vec = Vec::with_capacity(input.len() + input.len() / 64);
    for (i, &b) in input.iter().enumerate() {
        vec.push(b);
        if b == 0xFF {
            match input.get(i + 1) {
                Some(&next) if next == 0x00 || next >= 0xE0 => vec.push(0x00),
                _ => (),
            }
        }
    }
    vec
}

pub fn is_valid_frame_id(input: &str) -> bool {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^[A-Z0-9]{4}$").unwrap();
    }
    RE.is_match(input)
}

pub fn decode_frame_id(input: &[u8]) -> Result<String, Error> {
    let s: String = input.iter().map(|&c| c as char).collect();
    if is_valid_frame_id(&s) {
        Ok(s)
    } else {
        Err(Error::FormatError(format!(
            "Cannot decode {:X?}: Invalid frame ID (contains characters that are not A-Z or 0-9)",
            input
        )))
    }
}

pub fn encode_frame_id(input: &str) -> Result<[u8; 4], Error> {
    if !is_valid_frame_id(input) {
        return Err(Error::FormatError(format!(
            "Cannot encode \"{}\": Invalid frame ID (contains characters that are not A-Z or 0-9)",
            input
        )));
    }
    let mut v = [0; 4];
    v.copy_from_slice(input.as_bytes());
    Ok(v)
}
