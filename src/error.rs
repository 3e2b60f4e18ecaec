/// Error types shared by the RDB decoders.
///
/// The decoder distinguishes three situations: `Incomplete` drives the
/// chunk-boundary restart protocol and never escapes the public API,
/// while `Malformed` and `Truncated` end the record stream.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RdbError {
    /// The current unit straddles the end of the buffered input. The
    /// scanner reacts by keeping the unit's bytes and waiting for the
    /// next chunk; callers of the public API never observe this variant.
    #[error("need more input to finish the current unit")]
    Incomplete,

    /// The input violates the RDB format. No further records are emitted.
    #[error("malformed RDB data: {0}")]
    Malformed(String),

    /// The byte source ended before the EOF opcode, leaving unparsed
    /// bytes behind. Carries the leftover buffer for diagnostics.
    #[error("input ended before the EOF opcode ({} bytes left unparsed)", .0.len())]
    Truncated(Vec<u8>),

    /// Reading from the byte source failed.
    #[error("failed to read from the RDB byte source")]
    Io(#[from] std::io::Error),
}

impl RdbError {
    pub(crate) fn malformed(message: impl Into<String>) -> RdbError {
        RdbError::Malformed(message.into())
    }
}
