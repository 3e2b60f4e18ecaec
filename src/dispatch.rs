//! The top-level opcode dispatcher.
//!
//! After the 9-byte file header, an RDB stream is a sequence of framed
//! units: a framing opcode (0xFA..0xFF) or a value type byte (0..15),
//! each followed by its payload. The dispatcher decodes exactly one unit
//! per call. When a unit straddles the end of the buffered input it
//! reports `Incomplete` without touching its own state, so the same
//! unit is re-read from its first byte once more input arrives.

use log::{info, warn};

use crate::collections;
use crate::error::RdbError;
use crate::length;
use crate::record::{Expiry, Record, Value};
use crate::string;

// Opcodes
const RDB_OPCODE_AUX: u8 = 0xFA;
const RDB_OPCODE_RESIZEDB: u8 = 0xFB;
const RDB_OPCODE_EXPIRETIMEMS: u8 = 0xFC;
const RDB_OPCODE_EXPIRETIME: u8 = 0xFD;
const RDB_OPCODE_SELECTDB: u8 = 0xFE;
const RDB_OPCODE_EOF: u8 = 0xFF;

// Value type codes
const RDB_TYPE_STRING: u8 = 0;
const RDB_TYPE_LIST: u8 = 1;
const RDB_TYPE_SET: u8 = 2;
const RDB_TYPE_ZSET: u8 = 3;
const RDB_TYPE_HASH: u8 = 4;
const RDB_TYPE_ZSET_2: u8 = 5;
const RDB_TYPE_ZIPMAP: u8 = 9;
const RDB_TYPE_LIST_ZIPLIST: u8 = 10;
const RDB_TYPE_SET_INTSET: u8 = 11;
const RDB_TYPE_ZSET_ZIPLIST: u8 = 12;
const RDB_TYPE_HASH_ZIPLIST: u8 = 13;
const RDB_TYPE_LIST_QUICKLIST: u8 = 14;

/// Highest byte that denotes a value type rather than a framing opcode.
const RDB_TYPE_MAX: u8 = 15;

const MAGIC: &[u8] = b"REDIS";
const HEADER_LEN: usize = 9;
const CHECKSUM_LEN: usize = 8;

pub(crate) struct Dispatcher {
    header_read: bool,
}

impl Dispatcher {
    pub(crate) fn new() -> Dispatcher {
        Dispatcher { header_read: false }
    }

    /// Decodes the next unit of `input`.
    ///
    /// `Ok((Some(record), rest))` means one record completed.
    /// `Ok((None, rest))` means a unit was consumed without producing a
    /// record (an unsupported value type that was skipped).
    /// `Err(Incomplete)` means the unit straddles the end of `input`; the
    /// caller retries with the same bytes plus more.
    pub(crate) fn next_record<'a>(
        &mut self,
        input: &'a [u8],
    ) -> Result<(Option<Record>, &'a [u8]), RdbError> {
        if !self.header_read {
            let (record, rest) = read_header(input)?;
            self.header_read = true;
            return Ok((Some(record), rest));
        }

        let (opcode, rest) = length::take_byte(input)?;
        match opcode {
            RDB_OPCODE_AUX => {
                let (key, rest) = string::read_string(rest)?;
                let (value, rest) = string::read_string(rest)?;
                info!("aux field: {} = {}", key, value);
                Ok((Some(Record::Aux { key, value }), rest))
            }

            RDB_OPCODE_RESIZEDB => {
                let (main, rest) = length::read_length(rest)?;
                let (expires, rest) = length::read_length(rest)?;
                info!("resize hint: {} keys, {} with expiry", main, expires);
                Ok((Some(Record::ResizeDb { main, expires }), rest))
            }

            RDB_OPCODE_EXPIRETIMEMS => {
                let (raw, rest) = length::take(rest, 8)?;
                let expire_ms = u64::from_le_bytes(raw.try_into().unwrap());
                let (type_byte, rest) = read_type_byte(rest)?;
                read_entry(type_byte, rest, Some(Expiry::Millis(expire_ms)))
            }

            RDB_OPCODE_EXPIRETIME => {
                let (raw, rest) = length::take(rest, 4)?;
                let expire_seconds = u32::from_le_bytes(raw.try_into().unwrap());
                let (type_byte, rest) = read_type_byte(rest)?;
                read_entry(type_byte, rest, Some(Expiry::Seconds(expire_seconds)))
            }

            RDB_OPCODE_SELECTDB => {
                // Single-byte database id; the standard format allows a
                // length-encoded id for databases above 255 (DESIGN.md).
                let (id, rest) = length::take_byte(rest)?;
                info!("selecting database {}", id);
                Ok((Some(Record::SelectDb(id)), rest))
            }

            RDB_OPCODE_EOF => {
                let (raw, rest) = length::take(rest, CHECKSUM_LEN)?;
                let checksum: [u8; 8] = raw.try_into().unwrap();
                Ok((Some(Record::Eof(checksum)), rest))
            }

            type_byte if type_byte <= RDB_TYPE_MAX => read_entry(type_byte, rest, None),

            unknown => Err(RdbError::malformed(format!(
                "unknown opcode {:#04x}",
                unknown
            ))),
        }
    }
}

/// The file prefix: the ASCII literal `REDIS` followed by four decimal
/// digits giving the format version.
fn read_header(input: &[u8]) -> Result<(Record, &[u8]), RdbError> {
    let (header, rest) = length::take(input, HEADER_LEN)?;
    if !header.starts_with(MAGIC) {
        return Err(RdbError::malformed("not an RDB stream: missing REDIS magic"));
    }
    let digits = std::str::from_utf8(&header[5..HEADER_LEN])
        .map_err(|_| RdbError::malformed("RDB version field is not ASCII"))?;
    let version: u32 = digits
        .parse()
        .map_err(|_| RdbError::malformed(format!("invalid RDB version: {:?}", digits)))?;
    info!("RDB version {:04}", version);
    Ok((Record::Version(version), rest))
}

fn read_type_byte(input: &[u8]) -> Result<(u8, &[u8]), RdbError> {
    let (type_byte, rest) = length::take_byte(input)?;
    if type_byte > RDB_TYPE_MAX {
        return Err(RdbError::malformed(format!(
            "expiry followed by invalid value type byte {:#04x}",
            type_byte
        )));
    }
    Ok((type_byte, rest))
}

/// Key plus typed value. Unsupported types with self-delimiting framing
/// are consumed and dropped with a warning; the record slot stays empty.
fn read_entry(
    type_byte: u8,
    input: &[u8],
    expiry: Option<Expiry>,
) -> Result<(Option<Record>, &[u8]), RdbError> {
    let (key, rest) = string::read_string(input)?;
    let (value, rest) = match type_byte {
        RDB_TYPE_STRING => {
            let (element, rest) = string::read_string(rest)?;
            (Value::from(element), rest)
        }
        RDB_TYPE_LIST => collections::read_list(rest)?,
        RDB_TYPE_SET => collections::read_set(rest)?,
        RDB_TYPE_HASH => collections::read_hash(rest)?,
        RDB_TYPE_LIST_ZIPLIST => collections::read_ziplist_list(rest)?,
        RDB_TYPE_SET_INTSET => collections::read_intset(rest)?,
        RDB_TYPE_HASH_ZIPLIST => collections::read_ziplist_hash(rest)?,
        RDB_TYPE_LIST_QUICKLIST => collections::read_quicklist(rest)?,
        unsupported => {
            let rest = skip_value(unsupported, rest)?;
            warn!("skipping unsupported value type {} for key '{}'", unsupported, key);
            return Ok((None, rest));
        }
    };
    Ok((Some(Record::Entry { key, value, expiry }), rest))
}

/// Consumes a value of an unsupported type without decoding it, where
/// the framing permits. Types with opaque framing cannot be walked past
/// and abort the stream.
fn skip_value(type_byte: u8, input: &[u8]) -> Result<&[u8], RdbError> {
    match type_byte {
        RDB_TYPE_ZSET => {
            // Pairs of (member string, score as a length-prefixed ASCII
            // double; 0xFD=NaN, 0xFE=+inf, 0xFF=-inf carry no bytes)
            let (declared, mut rest) = length::read_length(input)?;
            for _ in 0..length::to_count(declared)? {
                let (_, after_member) = string::read_string(rest)?;
                let (score_len, after_len) = length::take_byte(after_member)?;
                rest = if score_len < 0xFD {
                    length::take(after_len, score_len as usize)?.1
                } else {
                    after_len
                };
            }
            Ok(rest)
        }
        RDB_TYPE_ZSET_2 => {
            // Pairs of (member string, 8-byte binary double)
            let (declared, mut rest) = length::read_length(input)?;
            for _ in 0..length::to_count(declared)? {
                let (_, after_member) = string::read_string(rest)?;
                rest = length::take(after_member, 8)?.1;
            }
            Ok(rest)
        }
        RDB_TYPE_ZIPMAP | RDB_TYPE_ZSET_ZIPLIST => {
            // Compact encodings stored as a single string blob
            let (_, rest) = string::read_string(input)?;
            Ok(rest)
        }
        other => Err(RdbError::malformed(format!(
            "value type {} cannot be skipped",
            other
        ))),
    }
}
