//! The records emitted by the decoder and their value types.
//!
//! Records come out in strict file order: `Version` first, then framing
//! records (`SelectDb`, `ResizeDb`, `Aux`) interleaved with `Entry`
//! records, and finally `Eof` carrying the stored checksum bytes.

use std::collections::{HashMap, HashSet};
use std::fmt;

use bytes::Bytes;

/// A Redis-encoded string: raw bytes, or an integer that was stored in
/// one of the packed integer encodings. Packed integers keep their
/// numeric identity instead of being rendered as ASCII.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    Bytes(Bytes),
    Int(i64),
}

impl Element {
    /// Builds a byte-string element by copying `data`.
    pub fn from_slice(data: impl AsRef<[u8]>) -> Element {
        Element::Bytes(Bytes::copy_from_slice(data.as_ref()))
    }

    /// The raw bytes, if this element is a byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Element::Bytes(data) => Some(data),
            Element::Int(_) => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Element::Bytes(data) => write!(f, "{}", String::from_utf8_lossy(data)),
            Element::Int(n) => write!(f, "{}", n),
        }
    }
}

/// The payload of a key/value entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bytes(Bytes),
    Int(i64),
    List(Vec<Element>),
    Set(HashSet<Element>),
    Hash(HashMap<Element, Element>),
}

impl From<Element> for Value {
    fn from(element: Element) -> Value {
        match element {
            Element::Bytes(data) => Value::Bytes(data),
            Element::Int(n) => Value::Int(n),
        }
    }
}

/// Key expiration attached to an entry, in the unit the file used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Absolute UNIX timestamp in seconds.
    Seconds(u32),
    /// Absolute UNIX timestamp in milliseconds.
    Millis(u64),
}

/// One decoded unit of an RDB stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// The file header's 4-digit version number.
    Version(u32),
    /// Database selector. The id is a single byte here; see DESIGN.md.
    SelectDb(u8),
    /// Hash-table sizing hints for the selected database.
    ResizeDb { main: u64, expires: u64 },
    /// Auxiliary metadata field such as `redis-ver` or `ctime`.
    Aux { key: Element, value: Element },
    /// A key/value pair, optionally carrying an expiration.
    Entry {
        key: Element,
        value: Value,
        expiry: Option<Expiry>,
    },
    /// End of stream; the 8 stored checksum bytes, uninterpreted.
    Eof([u8; 8]),
}
