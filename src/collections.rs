//! Decoders for the aggregate value types: plain lists, sets and hashes,
//! intsets, ziplist-backed lists and hashes, and quicklists.
//!
//! Every decoder consumes exactly its own sub-unit and returns the
//! decoded `Value` plus the unconsumed remainder, reporting `Incomplete`
//! when the enclosing chunk ends mid-unit.

use std::collections::{HashMap, HashSet};

use crate::error::RdbError;
use crate::length;
use crate::record::{Element, Value};
use crate::string;
use crate::ziplist;

/// Plain list: a length followed by that many strings, order preserved.
pub(crate) fn read_list(input: &[u8]) -> Result<(Value, &[u8]), RdbError> {
    let (elements, rest) = read_elements(input)?;
    Ok((Value::List(elements), rest))
}

/// Plain set: same framing as a list, deduplicated. RDB sources never
/// emit duplicates, so silently absorbing them loses nothing.
pub(crate) fn read_set(input: &[u8]) -> Result<(Value, &[u8]), RdbError> {
    let (elements, rest) = read_elements(input)?;
    Ok((Value::Set(elements.into_iter().collect()), rest))
}

/// Plain hash: a pair count followed by alternating key/value strings.
/// Duplicate keys overwrite.
pub(crate) fn read_hash(input: &[u8]) -> Result<(Value, &[u8]), RdbError> {
    let (declared, mut rest) = length::read_length(input)?;
    let count = length::to_count(declared)?;
    let mut pairs = HashMap::with_capacity(count.min(1 << 16));
    for _ in 0..count {
        let (key, after_key) = string::read_string(rest)?;
        let (value, after_value) = string::read_string(after_key)?;
        pairs.insert(key, value);
        rest = after_value;
    }
    Ok((Value::Hash(pairs), rest))
}

/// Intset: a blob whose header declares the integer width (2, 4, or 8
/// bytes) and the element count, followed by exactly that many
/// little-endian signed integers.
pub(crate) fn read_intset(input: &[u8]) -> Result<(Value, &[u8]), RdbError> {
    let (blob, rest) = string::read_blob(input)?;
    if blob.len() < 8 {
        return Err(RdbError::malformed(format!(
            "intset blob of {} bytes is shorter than its header",
            blob.len()
        )));
    }
    let width = u32::from_le_bytes(blob[0..4].try_into().unwrap()) as usize;
    let count = u32::from_le_bytes(blob[4..8].try_into().unwrap()) as usize;
    if !matches!(width, 2 | 4 | 8) {
        return Err(RdbError::malformed(format!(
            "intset declares unsupported integer width {}",
            width
        )));
    }
    if blob.len() - 8 != width * count {
        return Err(RdbError::malformed(format!(
            "intset payload of {} bytes disagrees with {} integers of width {}",
            blob.len() - 8,
            count,
            width
        )));
    }
    let mut members = HashSet::with_capacity(count);
    for raw in blob[8..].chunks_exact(width) {
        let value = match width {
            2 => i16::from_le_bytes(raw.try_into().unwrap()) as i64,
            4 => i32::from_le_bytes(raw.try_into().unwrap()) as i64,
            _ => i64::from_le_bytes(raw.try_into().unwrap()),
        };
        members.insert(Element::Int(value));
    }
    Ok((Value::Set(members), rest))
}

/// A list stored as one ziplist blob.
pub(crate) fn read_ziplist_list(input: &[u8]) -> Result<(Value, &[u8]), RdbError> {
    let (blob, rest) = string::read_blob(input)?;
    let entries = ziplist::read_entries(&blob)?;
    Ok((Value::List(entries), rest))
}

/// A hash stored as one ziplist blob, entries taken pairwise.
pub(crate) fn read_ziplist_hash(input: &[u8]) -> Result<(Value, &[u8]), RdbError> {
    let (blob, rest) = string::read_blob(input)?;
    let entries = ziplist::read_entries(&blob)?;
    Ok((Value::Hash(pair_up(entries)?), rest))
}

/// Quicklist: a count of ziplist blobs whose entries concatenate into
/// one list, preserving order across blob boundaries.
pub(crate) fn read_quicklist(input: &[u8]) -> Result<(Value, &[u8]), RdbError> {
    let (declared, mut rest) = length::read_length(input)?;
    let count = length::to_count(declared)?;
    let mut elements = Vec::new();
    for _ in 0..count {
        let (blob, after_blob) = string::read_blob(rest)?;
        elements.extend(ziplist::read_entries(&blob)?);
        rest = after_blob;
    }
    Ok((Value::List(elements), rest))
}

fn read_elements(input: &[u8]) -> Result<(Vec<Element>, &[u8]), RdbError> {
    let (declared, mut rest) = length::read_length(input)?;
    let count = length::to_count(declared)?;
    let mut elements = Vec::with_capacity(count.min(1 << 16));
    for _ in 0..count {
        let (element, after) = string::read_string(rest)?;
        elements.push(element);
        rest = after;
    }
    Ok((elements, rest))
}

fn pair_up(entries: Vec<Element>) -> Result<HashMap<Element, Element>, RdbError> {
    if entries.len() % 2 != 0 {
        return Err(RdbError::malformed(format!(
            "hash ziplist holds an odd number of entries ({})",
            entries.len()
        )));
    }
    let mut pairs = HashMap::with_capacity(entries.len() / 2);
    let mut iter = entries.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        pairs.insert(key, value);
    }
    Ok(pairs)
}
