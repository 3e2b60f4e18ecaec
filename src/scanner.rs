//! Chunk-boundary-tolerant scanning.
//!
//! `ChunkScanner` owns the leftover buffer that makes chunk boundaries
//! invisible: each pushed chunk is appended, the dispatcher is driven
//! until a unit comes up short, and the unit's bytes stay buffered for
//! the next push. `Records` wraps a scanner around any `Read` source and
//! exposes the decoded stream as a lazy iterator.

use std::collections::VecDeque;
use std::io::Read;

use bytes::{Buf, BytesMut};
use log::debug;

use crate::dispatch::Dispatcher;
use crate::error::RdbError;
use crate::record::Record;

/// Default granularity for pulling bytes out of a `Read` source.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Tuning knobs for the record stream.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Upstream chunk granularity in bytes. Larger values reduce
    /// per-chunk overhead; smaller values reduce peak memory. Decoding
    /// is correct for any positive value including 1.
    pub chunk_size: usize,
    /// Maintain a running CRC-64 and check it against the stored
    /// checksum when the EOF unit arrives. A stored checksum of all
    /// zeroes means checksumming was disabled and is accepted.
    pub verify_checksum: bool,
}

impl Default for ScanOptions {
    fn default() -> ScanOptions {
        ScanOptions {
            chunk_size: DEFAULT_CHUNK_SIZE,
            verify_checksum: false,
        }
    }
}

/// The boundary-tolerant driver around the opcode dispatcher.
pub struct ChunkScanner {
    buf: BytesMut,
    dispatcher: Dispatcher,
    finished: bool,
    verify_checksum: bool,
    crc: u64,
}

impl ChunkScanner {
    pub fn new() -> ChunkScanner {
        ChunkScanner::with_verification(false)
    }

    pub fn with_verification(verify_checksum: bool) -> ChunkScanner {
        ChunkScanner {
            buf: BytesMut::new(),
            dispatcher: Dispatcher::new(),
            finished: false,
            verify_checksum,
            crc: 0,
        }
    }

    /// Feeds one chunk and returns every record it completed. Chunks may
    /// be empty. Bytes arriving after the EOF unit are ignored.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Record>, RdbError> {
        if self.finished {
            if !chunk.is_empty() {
                debug!("ignoring {} bytes after the EOF unit", chunk.len());
            }
            return Ok(Vec::new());
        }
        self.buf.extend_from_slice(chunk);

        let mut records = Vec::new();
        while !self.finished {
            let (maybe_record, consumed) = match self.dispatcher.next_record(&self.buf) {
                Ok((maybe_record, rest)) => (maybe_record, self.buf.len() - rest.len()),
                Err(RdbError::Incomplete) => break,
                Err(other) => return Err(other),
            };

            if self.verify_checksum {
                // The stored checksum covers everything before itself,
                // the EOF opcode byte included
                let covered = match maybe_record {
                    Some(Record::Eof(_)) => consumed - 8,
                    _ => consumed,
                };
                self.crc = crc64::crc64(self.crc, &self.buf[..covered]);
            }
            self.buf.advance(consumed);

            if let Some(record) = maybe_record {
                if let Record::Eof(stored) = &record {
                    self.finished = true;
                    if self.verify_checksum {
                        self.check_stored_checksum(stored)?;
                    }
                }
                records.push(record);
            }
        }
        Ok(records)
    }

    /// True once the EOF unit has been decoded.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// The bytes buffered for the next push.
    pub fn leftover(&self) -> &[u8] {
        &self.buf
    }

    /// Declares the byte source exhausted. Leftover bytes without a
    /// preceding EOF unit surface as `Truncated`.
    pub fn finish(&mut self) -> Result<(), RdbError> {
        if self.finished || self.buf.is_empty() {
            return Ok(());
        }
        Err(RdbError::Truncated(self.buf.to_vec()))
    }

    fn check_stored_checksum(&self, stored: &[u8; 8]) -> Result<(), RdbError> {
        let stored = u64::from_le_bytes(*stored);
        // All-zeros means the writer disabled checksumming
        if stored != 0 && stored != self.crc {
            return Err(RdbError::malformed(format!(
                "CRC64 mismatch: stored {:016x}, computed {:016x}",
                stored, self.crc
            )));
        }
        Ok(())
    }
}

impl Default for ChunkScanner {
    fn default() -> ChunkScanner {
        ChunkScanner::new()
    }
}

/// Lazy record iterator over any `Read` source.
///
/// Yields records in file order and terminates after the `Eof` record,
/// after a terminal error, or when the source ends cleanly on a record
/// boundary with nothing buffered.
pub struct Records<R> {
    source: R,
    scanner: ChunkScanner,
    chunk: Vec<u8>,
    pending: VecDeque<Record>,
    done: bool,
}

impl<R: Read> Records<R> {
    pub fn new(source: R) -> Records<R> {
        Records::with_options(source, ScanOptions::default())
    }

    pub fn with_options(source: R, options: ScanOptions) -> Records<R> {
        Records {
            source,
            scanner: ChunkScanner::with_verification(options.verify_checksum),
            chunk: vec![0u8; options.chunk_size.max(1)],
            pending: VecDeque::new(),
            done: false,
        }
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<Record, RdbError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }
            if self.done {
                return None;
            }
            let read = match self.source.read(&mut self.chunk) {
                Ok(read) => read,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err.into()));
                }
            };
            if read == 0 {
                self.done = true;
                match self.scanner.finish() {
                    Ok(()) => return None,
                    Err(err) => return Some(Err(err)),
                }
            }
            match self.scanner.push(&self.chunk[..read]) {
                Ok(records) => {
                    self.pending.extend(records);
                    if self.scanner.finished() {
                        self.done = true;
                    }
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
