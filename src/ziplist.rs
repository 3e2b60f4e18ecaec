//! The ziplist sub-format.
//!
//! A ziplist is a single contiguous buffer: a header of
//! `total_bytes:u32le, tail_offset:u32le, num_entries:u16le`, then the
//! entries, then a terminating 0xFF sentinel. Each entry starts with a
//! previous-entry-length back-pointer (opaque to a forward reader, only
//! skipped) followed by an encoding byte that selects a packed integer
//! width, a 4-bit immediate, or a length-prefixed byte string.
//!
//! Ziplists reach this module as fully materialized blobs (the string
//! codec reads them whole), so running out of bytes mid-entry is
//! malformed input rather than a chunk boundary.

use bytes::Bytes;

use crate::error::RdbError;
use crate::length::{self, Length};
use crate::record::Element;

const HEADER_LEN: usize = 10;
const SENTINEL: u8 = 0xFF;
const PREV_LEN_EXTENDED: u8 = 0xFE;

// Entry encoding bytes for packed integers
const ENC_INT8: u8 = 0xFE;
const ENC_INT16: u8 = 0xC0;
const ENC_INT24: u8 = 0xF0;
const ENC_INT32: u8 = 0xD0;
const ENC_INT64: u8 = 0xE0;

/// Parses a complete ziplist buffer into its entries, in file order.
pub(crate) fn read_entries(buf: &[u8]) -> Result<Vec<Element>, RdbError> {
    if buf.len() < HEADER_LEN + 1 {
        return Err(RdbError::malformed(format!(
            "ziplist buffer of {} bytes is shorter than its header",
            buf.len()
        )));
    }
    let declared_total = u32::from_le_bytes(buf[0..4].try_into().unwrap()) as usize;
    if declared_total != buf.len() {
        return Err(RdbError::malformed(format!(
            "ziplist declares {} total bytes but the buffer holds {}",
            declared_total,
            buf.len()
        )));
    }
    let num_entries = u16::from_le_bytes(buf[8..10].try_into().unwrap()) as usize;

    let mut entries = Vec::with_capacity(num_entries);
    let mut pos = HEADER_LEN;
    for _ in 0..num_entries {
        pos = skip_prev_length(buf, pos)?;
        let (entry, next) = read_entry(buf, pos)?;
        entries.push(entry);
        pos = next;
    }

    if pos >= buf.len() || buf[pos] != SENTINEL {
        return Err(RdbError::malformed(
            "ziplist entry count disagrees with its terminating sentinel",
        ));
    }
    if pos + 1 != buf.len() {
        return Err(RdbError::malformed(format!(
            "{} trailing bytes after the ziplist sentinel",
            buf.len() - pos - 1
        )));
    }
    Ok(entries)
}

/// The previous-entry-length field: one byte, or 0xFE plus four bytes.
/// Only its width matters when walking forward.
fn skip_prev_length(buf: &[u8], pos: usize) -> Result<usize, RdbError> {
    let first = *buf
        .get(pos)
        .ok_or_else(|| RdbError::malformed("ziplist entry truncated in prev-length field"))?;
    let width = if first == PREV_LEN_EXTENDED { 5 } else { 1 };
    if pos + width > buf.len() {
        return Err(RdbError::malformed(
            "ziplist entry truncated in prev-length field",
        ));
    }
    Ok(pos + width)
}

fn read_entry(buf: &[u8], pos: usize) -> Result<(Element, usize), RdbError> {
    let encoding = *buf
        .get(pos)
        .ok_or_else(|| RdbError::malformed("ziplist entry truncated before its encoding byte"))?;
    match encoding {
        ENC_INT8 => read_packed_int(buf, pos + 1, 1),
        ENC_INT16 => read_packed_int(buf, pos + 1, 2),
        ENC_INT24 => read_packed_int(buf, pos + 1, 3),
        ENC_INT32 => read_packed_int(buf, pos + 1, 4),
        ENC_INT64 => read_packed_int(buf, pos + 1, 8),
        0xF1..=0xFD => {
            // 4-bit immediate: the low nibble stores value + 1
            let value = (encoding & 0x0F) as i64 - 1;
            Ok((Element::Int(value), pos + 1))
        }
        SENTINEL => Err(RdbError::malformed(
            "ziplist sentinel reached before the declared entry count",
        )),
        _ => read_string_entry(buf, pos),
    }
}

/// Little-endian signed integer of `width` bytes, sign-extended.
fn read_packed_int(buf: &[u8], pos: usize, width: usize) -> Result<(Element, usize), RdbError> {
    if pos + width > buf.len() {
        return Err(RdbError::malformed(
            "ziplist entry truncated inside a packed integer",
        ));
    }
    let mut value = 0i64;
    for (i, &byte) in buf[pos..pos + width].iter().enumerate() {
        value |= (byte as i64) << (8 * i);
    }
    let shift = 64 - 8 * width as u32;
    value = value.wrapping_shl(shift).wrapping_shr(shift);
    Ok((Element::Int(value), pos + width))
}

/// A byte-string entry: the encoding byte begins a 6-, 14-, or 32-bit
/// length prefix in the same scheme the outer length codec uses.
fn read_string_entry(buf: &[u8], pos: usize) -> Result<(Element, usize), RdbError> {
    let (declared, rest) = match length::read_length_or_special(&buf[pos..]) {
        Ok((Length::Simple(declared), rest)) => (declared, rest),
        Ok((Length::Special(tag), _)) => {
            return Err(RdbError::malformed(format!(
                "invalid ziplist entry encoding byte {:#04x}",
                0xC0 | tag
            )))
        }
        Err(RdbError::Incomplete) => {
            return Err(RdbError::malformed(
                "ziplist entry truncated inside its length prefix",
            ))
        }
        Err(other) => return Err(other),
    };
    let count = length::to_count(declared)?;
    let start = buf.len() - rest.len();
    if start + count > buf.len() {
        return Err(RdbError::malformed(
            "ziplist string entry overruns its buffer",
        ));
    }
    let data = Bytes::copy_from_slice(&buf[start..start + count]);
    Ok((Element::Bytes(data), start + count))
}
