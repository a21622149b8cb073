//! Record codec
//!
//! Encoding to and decoding from in-memory buffers, plus positioned
//! decoding straight out of a table file.

use bytes::{Buf, BufMut};

use crate::error::{Result, TableError};

use super::handle::ReadAt;
use super::{Record, RECORD_OVERHEAD};

// =============================================================================
// Encoding
// =============================================================================

/// Encode a record to bytes
///
/// Format: key_len (4) + key + value_len (4) + value + version (8)
pub fn encode(record: &Record) -> Vec<u8> {
    let mut buf = Vec::with_capacity(record.encoded_len());
    encode_into(record, &mut buf);
    buf
}

/// Append the encoding of `record` to `buf`
pub fn encode_into<B: BufMut>(record: &Record, buf: &mut B) {
    debug_assert!(record.key.len() <= u32::MAX as usize);
    debug_assert!(record.value.len() <= u32::MAX as usize);

    buf.put_u32_le(record.key.len() as u32);
    buf.put_slice(&record.key);
    buf.put_u32_le(record.value.len() as u32);
    buf.put_slice(&record.value);
    buf.put_u64_le(record.version);
}

// =============================================================================
// Decoding from memory
// =============================================================================

/// Decode the record at the start of `bytes`
///
/// Trailing bytes after the record are ignored.
pub fn decode(bytes: &[u8]) -> Result<Record> {
    decode_prefix(bytes).map(|(record, _)| record)
}

/// Decode the record at the start of `bytes`, returning it with the
/// number of bytes it occupied
pub fn decode_prefix(bytes: &[u8]) -> Result<(Record, usize)> {
    let mut buf = bytes;

    let key_len = take_u32(&mut buf, bytes.len(), "key length")? as usize;
    let key = take_vec(&mut buf, bytes.len(), key_len, "key")?;
    let value_len = take_u32(&mut buf, bytes.len(), "value length")? as usize;
    let value = take_vec(&mut buf, bytes.len(), value_len, "value")?;
    let version = take_u64(&mut buf, bytes.len(), "version")?;

    let consumed = bytes.len() - buf.remaining();
    debug_assert_eq!(consumed, RECORD_OVERHEAD + key_len + value_len);

    Ok((Record { key, value, version }, consumed))
}

fn take_u32(buf: &mut &[u8], total: usize, what: &str) -> Result<u32> {
    ensure_remaining(buf, total, 4, what)?;
    Ok(buf.get_u32_le())
}

fn take_u64(buf: &mut &[u8], total: usize, what: &str) -> Result<u64> {
    ensure_remaining(buf, total, 8, what)?;
    Ok(buf.get_u64_le())
}

fn take_vec(buf: &mut &[u8], total: usize, len: usize, what: &str) -> Result<Vec<u8>> {
    ensure_remaining(buf, total, len, what)?;
    let out = buf[..len].to_vec();
    buf.advance(len);
    Ok(out)
}

fn ensure_remaining(buf: &&[u8], total: usize, needed: usize, what: &str) -> Result<()> {
    if buf.remaining() < needed {
        return Err(TableError::CorruptRecord(format!(
            "{} needs {} bytes at offset {}, only {} left",
            what,
            needed,
            total - buf.remaining(),
            buf.remaining()
        )));
    }
    Ok(())
}

// =============================================================================
// Decoding from a handle
// =============================================================================

/// Decode the full record starting at `offset` in `handle`
pub fn decode_at<H: ReadAt + ?Sized>(handle: &H, offset: u64) -> Result<Record> {
    let end = handle.size()?;
    decode_at_within(handle, offset, end)
}

/// Decode only the key of the record starting at `offset`
///
/// Returns the key and the offset of the value length field that follows
/// it, so a caller can finish the record without re-reading the key.
pub fn decode_key_at<H: ReadAt + ?Sized>(handle: &H, offset: u64) -> Result<(Vec<u8>, u64)> {
    let end = handle.size()?;
    decode_key_at_within(handle, offset, end)
}

/// `decode_at` for callers that already know where the handle ends
pub(crate) fn decode_at_within<H: ReadAt + ?Sized>(
    handle: &H,
    offset: u64,
    end: u64,
) -> Result<Record> {
    let (key, value_len_at) = decode_key_at_within(handle, offset, end)?;

    let value_len = read_u32_at(handle, value_len_at, end, "value length")?;
    let value_at = value_len_at + 4;
    let value = read_vec_at(handle, value_at, end, value_len as u64, "value")?;

    let mut version = [0u8; 8];
    let version_at = value_at + value_len as u64;
    read_exact_within(handle, &mut version, version_at, end, "version")?;

    Ok(Record {
        key,
        value,
        version: u64::from_le_bytes(version),
    })
}

/// `decode_key_at` for callers that already know where the handle ends
pub(crate) fn decode_key_at_within<H: ReadAt + ?Sized>(
    handle: &H,
    offset: u64,
    end: u64,
) -> Result<(Vec<u8>, u64)> {
    let key_len = read_u32_at(handle, offset, end, "key length")?;
    let key_at = offset + 4;
    let key = read_vec_at(handle, key_at, end, key_len as u64, "key")?;
    Ok((key, key_at + key_len as u64))
}

fn read_u32_at<H: ReadAt + ?Sized>(handle: &H, offset: u64, end: u64, what: &str) -> Result<u32> {
    let mut raw = [0u8; 4];
    read_exact_within(handle, &mut raw, offset, end, what)?;
    Ok(u32::from_le_bytes(raw))
}

/// Read `len` bytes, checking the length against the handle before allocating
fn read_vec_at<H: ReadAt + ?Sized>(
    handle: &H,
    offset: u64,
    end: u64,
    len: u64,
    what: &str,
) -> Result<Vec<u8>> {
    check_bounds(offset, len, end, what)?;
    let mut out = vec![0u8; len as usize];
    read_exact_within(handle, &mut out, offset, end, what)?;
    Ok(out)
}

fn read_exact_within<H: ReadAt + ?Sized>(
    handle: &H,
    buf: &mut [u8],
    offset: u64,
    end: u64,
    what: &str,
) -> Result<()> {
    check_bounds(offset, buf.len() as u64, end, what)?;
    handle
        .read_exact_at(buf, offset)
        .map_err(|e| TableError::from_read(e, what, offset))
}

fn check_bounds(offset: u64, len: u64, end: u64, what: &str) -> Result<()> {
    match offset.checked_add(len) {
        Some(stop) if stop <= end => Ok(()),
        _ => Err(TableError::CorruptRecord(format!(
            "{} of {} bytes at offset {} runs past end of table ({} bytes)",
            what, len, offset, end
        ))),
    }
}
