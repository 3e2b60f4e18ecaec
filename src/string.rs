//! The Redis string codec.
//!
//! A "string" in RDB is one of: raw bytes of a declared length, a packed
//! signed integer (8, 16, or 32 bits, little-endian), or an LZF-compressed
//! payload prefixed with its compressed and uncompressed lengths.

use bytes::Bytes;

use crate::error::RdbError;
use crate::length::{self, Length};
use crate::lzf;
use crate::record::Element;

// Special encoding subtypes (within the 0b11 length-encoding prefix)
const ENC_INT8: u8 = 0;
const ENC_INT16: u8 = 1;
const ENC_INT32: u8 = 2;
const ENC_LZF: u8 = 3;

/// Decodes one Redis-encoded string, packed integers included.
pub(crate) fn read_string(input: &[u8]) -> Result<(Element, &[u8]), RdbError> {
    match length::read_length_or_special(input)? {
        (Length::Simple(declared), rest) => {
            let count = length::to_count(declared)?;
            let (raw, rest) = length::take(rest, count)?;
            Ok((Element::Bytes(Bytes::copy_from_slice(raw)), rest))
        }
        (Length::Special(encoding), rest) => match encoding {
            ENC_INT8 => {
                let (byte, rest) = length::take_byte(rest)?;
                Ok((Element::Int(byte as i8 as i64), rest))
            }
            ENC_INT16 => {
                let (raw, rest) = length::take(rest, 2)?;
                let value = i16::from_le_bytes(raw.try_into().unwrap());
                Ok((Element::Int(value as i64), rest))
            }
            ENC_INT32 => {
                let (raw, rest) = length::take(rest, 4)?;
                let value = i32::from_le_bytes(raw.try_into().unwrap());
                Ok((Element::Int(value as i64), rest))
            }
            ENC_LZF => {
                let (compressed_len, rest) = length::read_length(rest)?;
                let (uncompressed_len, rest) = length::read_length(rest)?;
                let (payload, rest) = length::take(rest, length::to_count(compressed_len)?)?;
                let expanded = lzf::decompress(payload, length::to_count(uncompressed_len)?)?;
                Ok((Element::Bytes(Bytes::from(expanded)), rest))
            }
            other => Err(RdbError::malformed(format!(
                "unknown special string encoding: {}",
                other
            ))),
        },
    }
}

/// Decodes a string that must be raw bytes. The compact container types
/// (ziplists, intsets) arrive through this path; a packed integer here
/// cannot hold a container and is malformed.
pub(crate) fn read_blob(input: &[u8]) -> Result<(Bytes, &[u8]), RdbError> {
    match read_string(input)? {
        (Element::Bytes(data), rest) => Ok((data, rest)),
        (Element::Int(_), _) => Err(RdbError::malformed(
            "expected a byte-string payload, got a packed integer",
        )),
    }
}
