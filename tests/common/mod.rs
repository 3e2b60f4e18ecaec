//! Shared fixture builders: the encoder side of the format, just enough
//! to generate test dumps the way a Redis server would lay them out.

#![allow(dead_code)]

// Opcodes and type bytes used by the fixtures
pub const OPCODE_AUX: u8 = 0xFA;
pub const OPCODE_RESIZEDB: u8 = 0xFB;
pub const OPCODE_EXPIRETIMEMS: u8 = 0xFC;
pub const OPCODE_EXPIRETIME: u8 = 0xFD;
pub const OPCODE_SELECTDB: u8 = 0xFE;
pub const TYPE_STRING: u8 = 0x00;
pub const TYPE_LIST: u8 = 0x01;
pub const TYPE_SET: u8 = 0x02;
pub const TYPE_ZSET: u8 = 0x03;
pub const TYPE_HASH: u8 = 0x04;
pub const TYPE_LIST_ZIPLIST: u8 = 0x0A;
pub const TYPE_SET_INTSET: u8 = 0x0B;
pub const TYPE_HASH_ZIPLIST: u8 = 0x0D;
pub const TYPE_LIST_QUICKLIST: u8 = 0x0E;

/// Length prefix: 6-bit, 14-bit, or 32-bit little-endian.
pub fn encode_length(len: usize) -> Vec<u8> {
    if len < 1 << 6 {
        vec![len as u8]
    } else if len < 1 << 14 {
        vec![0x40 | (len >> 8) as u8, (len & 0xFF) as u8]
    } else {
        let mut out = vec![0x80];
        out.extend_from_slice(&(len as u32).to_le_bytes());
        out
    }
}

/// Raw length-prefixed string.
pub fn write_string(buf: &mut Vec<u8>, data: &[u8]) {
    buf.extend(encode_length(data.len()));
    buf.extend_from_slice(data);
}

/// Packed-integer string encodings (0xC0/0xC1/0xC2).
pub fn write_int8_string(buf: &mut Vec<u8>, value: i8) {
    buf.push(0xC0);
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn write_int16_string(buf: &mut Vec<u8>, value: i16) {
    buf.push(0xC1);
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn write_int32_string(buf: &mut Vec<u8>, value: i32) {
    buf.push(0xC2);
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Build a complete dump: header + body + EOF + CRC64.
pub fn build_rdb(version: &str, body: &[u8]) -> Vec<u8> {
    let mut rdb = Vec::new();
    rdb.extend_from_slice(b"REDIS");
    rdb.extend_from_slice(version.as_bytes());
    rdb.extend_from_slice(body);
    rdb.push(0xFF);
    let checksum = crc64::crc64(0, &rdb);
    rdb.extend_from_slice(&checksum.to_le_bytes());
    rdb
}

/// Ziplist blob of byte-string entries.
pub fn ziplist_of_strings<S: AsRef<[u8]>>(entries: &[S]) -> Vec<u8> {
    let mut buf = vec![0u8; 10];
    for entry in entries {
        let data = entry.as_ref();
        buf.push(0x00); // prev-entry-length
        if data.len() < 64 {
            buf.push(data.len() as u8);
        } else {
            assert!(data.len() < 16384, "fixture string too long for a 14-bit length");
            buf.push(0x40 | (data.len() >> 8) as u8);
            buf.push((data.len() & 0xFF) as u8);
        }
        buf.extend_from_slice(data);
    }
    finish_ziplist(buf, entries.len())
}

/// Ziplist blob of packed-integer entries, narrowest encoding per value.
pub fn ziplist_of_ints(values: &[i64]) -> Vec<u8> {
    let mut buf = vec![0u8; 10];
    for &value in values {
        buf.push(0x00); // prev-entry-length
        if (0..=12).contains(&value) {
            buf.push(0xF1 + value as u8);
        } else if let Ok(v) = i8::try_from(value) {
            buf.push(0xFE);
            buf.extend_from_slice(&v.to_le_bytes());
        } else if let Ok(v) = i16::try_from(value) {
            buf.push(0xC0);
            buf.extend_from_slice(&v.to_le_bytes());
        } else if (-(1i64 << 23)..(1i64 << 23)).contains(&value) {
            buf.push(0xF0);
            buf.extend_from_slice(&(value as i32).to_le_bytes()[..3]);
        } else if let Ok(v) = i32::try_from(value) {
            buf.push(0xD0);
            buf.extend_from_slice(&v.to_le_bytes());
        } else {
            buf.push(0xE0);
            buf.extend_from_slice(&value.to_le_bytes());
        }
    }
    finish_ziplist(buf, values.len())
}

fn finish_ziplist(mut buf: Vec<u8>, entries: usize) -> Vec<u8> {
    buf.push(0xFF);
    let total = buf.len() as u32;
    buf[0..4].copy_from_slice(&total.to_le_bytes());
    buf[8..10].copy_from_slice(&(entries as u16).to_le_bytes());
    buf
}

/// Intset blob: width/count header plus little-endian integers.
pub fn intset_blob(width: usize, values: &[i64]) -> Vec<u8> {
    let mut blob = Vec::new();
    blob.extend_from_slice(&(width as u32).to_le_bytes());
    blob.extend_from_slice(&(values.len() as u32).to_le_bytes());
    for &value in values {
        match width {
            2 => blob.extend_from_slice(&(value as i16).to_le_bytes()),
            4 => blob.extend_from_slice(&(value as i32).to_le_bytes()),
            8 => blob.extend_from_slice(&value.to_le_bytes()),
            other => panic!("unsupported intset width {}", other),
        }
    }
    blob
}

/// LZF-compress `data` with a literal-runs-only encoding: always valid,
/// never smaller, good enough for fixtures.
pub fn lzf_literal_compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for run in data.chunks(32) {
        out.push((run.len() - 1) as u8);
        out.extend_from_slice(run);
    }
    out
}

/// LZF-compressed string unit: 0xC3, both lengths, payload.
pub fn write_lzf_string(buf: &mut Vec<u8>, compressed: &[u8], uncompressed_len: usize) {
    buf.push(0xC3);
    buf.extend(encode_length(compressed.len()));
    buf.extend(encode_length(uncompressed_len));
    buf.extend_from_slice(compressed);
}
