//! Incremental decoder for the Redis RDB snapshot format.
//!
//! Turns an arbitrarily long, chunk-delivered byte stream into a lazy
//! sequence of typed records without ever holding the whole file:
//! - All framing opcodes: AUX (0xFA), RESIZEDB (0xFB), EXPIRETIMEMS
//!   (0xFC), EXPIRETIME (0xFD), SELECTDB (0xFE), EOF (0xFF)
//! - Value types: string, list, set, hash, intset, ziplist-backed list
//!   and hash, quicklist
//! - String encodings: raw, integer (int8/16/32), LZF compressed
//! - Chunk boundaries anywhere, including inside a single encoded unit:
//!   partial units are buffered and re-read once more bytes arrive
//!
//! Spec reference: https://rdb.fnordig.de/file_format.html
//!
//! # Examples
//! ```ignore
//! use rdb_stream::{Records, Record};
//!
//! let file = std::fs::File::open("dump.rdb")?;
//! for record in Records::new(file) {
//!     match record? {
//!         Record::Entry { key, value, .. } => println!("{} = {:?}", key, value),
//!         other => println!("{:?}", other),
//!     }
//! }
//! ```

mod collections;
mod dispatch;
mod length;
mod string;
mod ziplist;

pub mod error;
pub mod lzf;
pub mod record;
pub mod scanner;
pub mod stream;

pub use error::RdbError;
pub use record::{Element, Expiry, Record, Value};
pub use scanner::{ChunkScanner, Records, ScanOptions, DEFAULT_CHUNK_SIZE};
