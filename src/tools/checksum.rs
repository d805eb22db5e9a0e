//! CRC-32 over serialized frame bytes, as carried by the extended header.

extern crate crc;
use self::crc::crc32::checksum_ieee;

use crate::tools::decode_int_be_u32;

pub fn calculate(input: &[u8]) -> u32 {
    checksum_ieee(input)
}

/// `expected` is the big-endian checksum as stored in a v2.3 extended header.
pub fn validate(input: &[u8], expected: &[u8; 4]) -> bool {
    calculate(input) == decode_int_be_u32(expected)
}
