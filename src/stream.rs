//! Async adapter for consuming an RDB dump from a non-blocking source,
//! such as a replication socket that streams the master's snapshot.
//!
//! This is a thin layer: it reads chunks, feeds the one `ChunkScanner`,
//! and hands each completed record to the caller. All decoding semantics
//! live in the scanner.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::RdbError;
use crate::record::Record;
use crate::scanner::{ChunkScanner, ScanOptions};

/// Drives a scanner from `source` until the EOF record or the end of the
/// stream, invoking `on_record` for every record in file order.
///
/// Ends with `Truncated` if the source closes mid-unit, mirroring the
/// sync iterator.
pub async fn scan<R, F>(
    mut source: R,
    options: ScanOptions,
    mut on_record: F,
) -> Result<(), RdbError>
where
    R: AsyncRead + Unpin,
    F: FnMut(Record),
{
    let mut scanner = ChunkScanner::with_verification(options.verify_checksum);
    let mut chunk = vec![0u8; options.chunk_size.max(1)];
    loop {
        let read = source.read(&mut chunk).await?;
        if read == 0 {
            return scanner.finish();
        }
        for record in scanner.push(&chunk[..read])? {
            on_record(record);
        }
        if scanner.finished() {
            return Ok(());
        }
    }
}

/// Convenience wrapper that collects the whole record sequence.
pub async fn scan_to_vec<R>(source: R, options: ScanOptions) -> Result<Vec<Record>, RdbError>
where
    R: AsyncRead + Unpin,
{
    let mut records = Vec::new();
    scan(source, options, |record| records.push(record)).await?;
    Ok(records)
}
