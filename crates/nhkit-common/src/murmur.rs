//! MurmurHash3 (x86, 32-bit) hashing utilities.
//!
//! The game uses this hash for save-file section checksums and to name the
//! fields of its layout documents, which store the lowercase hex of the
//! hash of each field name as the key.

use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};

use crate::{Error, Result};

const C1: u32 = 0xCC9E_2D51;
const C2: u32 = 0x1B87_3593;

#[inline]
fn scramble(k: u32) -> u32 {
    k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

/// Compute the MurmurHash3 of a byte slice with a seed value.
pub fn hash_with_seed(data: &[u8], seed: u32) -> u32 {
    let mut h = seed;

    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        h ^= scramble(LittleEndian::read_u32(block));
        h = h.rotate_left(13);
        h = h.wrapping_mul(5).wrapping_add(0xE654_6B64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let k = tail
            .iter()
            .rev()
            .fold(0u32, |k, &b| (k << 8) | u32::from(b));
        h ^= scramble(k);
    }

    h ^= data.len() as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^= h >> 16;
    h
}

/// Compute the MurmurHash3 of a byte slice (seed 0).
#[inline]
pub fn hash_bytes(data: &[u8]) -> u32 {
    hash_with_seed(data, 0)
}

/// Compute the MurmurHash3 of a string.
#[inline]
pub fn hash_str(s: &str) -> u32 {
    hash_bytes(s.as_bytes())
}

/// The key under which a layout document stores a named field.
///
/// ```
/// assert_eq!(nhkit_common::murmur::field_key("TypeName"), "5c65d8b5");
/// ```
pub fn field_key(name: &str) -> String {
    format!("{:08x}", hash_str(name))
}

fn checked_range(buf: &[u8], range: &Range<usize>) -> Result<()> {
    if range.start > range.end || range.end > buf.len() {
        return Err(Error::UnexpectedEof {
            offset: range.start,
            needed: range.end.saturating_sub(range.start),
            available: buf.len().saturating_sub(range.start),
        });
    }
    Ok(())
}

fn checked_slot(buf: &[u8], hash_offset: usize) -> Result<()> {
    if hash_offset.checked_add(4).map_or(true, |end| end > buf.len()) {
        return Err(Error::UnexpectedEof {
            offset: hash_offset,
            needed: 4,
            available: buf.len().saturating_sub(hash_offset),
        });
    }
    Ok(())
}

/// Recompute the checksum of `range` and store it at `hash_offset`.
///
/// Returns the new checksum.
pub fn update(buf: &mut [u8], hash_offset: usize, range: Range<usize>) -> Result<u32> {
    checked_range(buf, &range)?;
    checked_slot(buf, hash_offset)?;

    let hash = hash_bytes(&buf[range]);
    LittleEndian::write_u32(&mut buf[hash_offset..hash_offset + 4], hash);
    Ok(hash)
}

/// Check that the checksum stored at `hash_offset` matches `range`.
pub fn verify(buf: &[u8], hash_offset: usize, range: Range<usize>) -> Result<bool> {
    checked_range(buf, &range)?;
    checked_slot(buf, hash_offset)?;

    let stored = LittleEndian::read_u32(&buf[hash_offset..hash_offset + 4]);
    Ok(hash_bytes(&buf[range]) == stored)
}
