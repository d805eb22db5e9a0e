pub mod checksum;
pub mod encoding;

use crate::Error;
pub fn format_error(err: &str) -> Error {
    Error::FormatError(err.to_string())
}

// callers only ever hand in 4 byte slices
pub fn decode_int_be_u32(input: &[u8]) -> u32 {
    let mut result: u32 = 0;
    for (i, b) in input.iter().take(4).enumerate() {
        result |= (*b as u32) << (8 * (input.len().min(4) - 1 - i));
    }
    result
}
pub fn encode_int_be_u32(input: u32) -> [u8; 4] {
    let mut result = [0; 4];
    for i in 0..4 {
        result[i] = ((input & 0xFF000000 >> 8 * i) >> 8 * (3 - i)) as u8;
    }
    result
}
