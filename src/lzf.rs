//! LZF decompression.
//!
//! Redis compresses long, repetitive strings with LZF. Only decompression
//! is needed for reading: control bytes interleave literal runs with
//! back-references into the already-produced output.

use crate::error::RdbError;

/// Decompresses an LZF payload into exactly `expected_len` bytes.
///
/// A length mismatch or a reference outside the produced output is
/// malformed input; the string codec treats both as terminal.
pub fn decompress(input: &[u8], expected_len: usize) -> Result<Vec<u8>, RdbError> {
    let mut output = Vec::with_capacity(expected_len);
    let mut i = 0;
    while i < input.len() {
        let ctrl = input[i] as usize;
        i += 1;
        if ctrl < 32 {
            // Literal run: ctrl + 1 bytes
            let run_len = ctrl + 1;
            if i + run_len > input.len() {
                return Err(RdbError::malformed("LZF literal run overruns input"));
            }
            output.extend_from_slice(&input[i..i + run_len]);
            i += run_len;
        } else {
            // Back-reference: high 3 bits encode length, low 5 bits plus
            // the next byte encode the offset
            let mut len = (ctrl >> 5) + 2;
            if len == 9 {
                // Length field maxed out: an extension byte follows
                if i >= input.len() {
                    return Err(RdbError::malformed("LZF missing extended length byte"));
                }
                len += input[i] as usize;
                i += 1;
            }
            if i >= input.len() {
                return Err(RdbError::malformed("LZF missing offset byte"));
            }
            let offset = (((ctrl & 0x1F) << 8) | input[i] as usize) + 1;
            i += 1;
            if offset > output.len() {
                return Err(RdbError::malformed(
                    "LZF back-reference points before start of output",
                ));
            }
            let start = output.len() - offset;
            for j in 0..len {
                output.push(output[start + j]);
            }
        }
    }
    if output.len() != expected_len {
        return Err(RdbError::malformed(format!(
            "LZF payload expanded to {} bytes, expected {}",
            output.len(),
            expected_len
        )));
    }
    Ok(output)
}
