//! Fixed-width little-endian reads and writes with bounds checking.
//!
//! Readers advance a caller-owned cursor and fail with [`Error::Bounds`]
//! whenever `offset + width` would run past the end of the buffer.  Writers
//! append to a `Vec<u8>` and cannot fail.  Strings are encoded as a 32-bit
//! little-endian length prefix followed by the UTF-8 bytes, the same shape
//! Borsh uses for byte vectors.

use solana_sdk::pubkey::Pubkey;

use crate::error::{Error, Result};

/// Returns `len` bytes starting at `*offset` and advances the cursor.
fn take<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = offset
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or(Error::Bounds { offset: *offset, need: len, have: data.len() })?;
    let out = &data[*offset..end];
    *offset = end;
    Ok(out)
}

pub fn read_u8(data: &[u8], offset: &mut usize) -> Result<u8> {
    Ok(take(data, offset, 1)?[0])
}

pub fn read_u16_le(data: &[u8], offset: &mut usize) -> Result<u16> {
    let b = take(data, offset, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

pub fn read_u32_le(data: &[u8], offset: &mut usize) -> Result<u32> {
    let b = take(data, offset, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub fn read_u64_le(data: &[u8], offset: &mut usize) -> Result<u64> {
    let b = take(data, offset, 8)?;
    Ok(u64::from_le_bytes([
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
    ]))
}

pub fn read_pubkey(data: &[u8], offset: &mut usize) -> Result<Pubkey> {
    let b = take(data, offset, 32)?;
    let mut out = [0u8; 32];
    out.copy_from_slice(b);
    Ok(Pubkey::new_from_array(out))
}

/// Advances the cursor past `len` bytes without returning them.
pub fn skip(data: &[u8], offset: &mut usize, len: usize) -> Result {
    take(data, offset, len).map(|_| ())
}

/// Reads a length-prefixed UTF-8 string.
///
/// The declared length is validated against the remaining buffer before any
/// byte of the string is touched; an overlong declaration is a bounds error,
/// never a silent truncation.
pub fn read_str(data: &[u8], offset: &mut usize) -> Result<String> {
    let len = read_u32_le(data, offset)? as usize;
    let bytes = take(data, offset, len)?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub fn write_u16_le(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn write_u32_le(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn write_u64_le(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Appends a 32-bit little-endian length prefix followed by the UTF-8 bytes.
pub fn write_str(out: &mut Vec<u8>, value: &str) {
    write_u32_le(out, value.len() as u32);
    out.extend_from_slice(value.as_bytes());
}
