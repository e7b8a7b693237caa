//! Binary reader for zero-copy parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that reads
//! binary data from a byte slice without copying. Every multi-byte read
//! honors the reader's [`Endian`], and every read is bounds-checked.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use zerocopy::FromBytes;

use crate::{Error, Result};

/// Byte order of a file, usually detected from a magic or BOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    /// Interpret a two-byte byte-order mark as written by Nintendo tools.
    ///
    /// `FF FE` is little-endian, `FE FF` is big-endian.
    pub fn from_bom(bom: [u8; 2]) -> Option<Self> {
        match bom {
            [0xFF, 0xFE] => Some(Self::Little),
            [0xFE, 0xFF] => Some(Self::Big),
            _ => None,
        }
    }
}

/// A binary reader that provides zero-copy reading from a byte slice.
///
/// The reader keeps a cursor for sequential reads, and also offers
/// `*_at` methods for the offset-addressed formats, which jump around the
/// buffer without moving the cursor.
///
/// # Example
///
/// ```
/// use nhkit_common::{BinaryReader, Endian};
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.u32_at(4).unwrap(), 0x08070605);
///
/// let be = BinaryReader::with_endian(&data, Endian::Big);
/// assert_eq!(be.u16_at(0).unwrap(), 0x0102);
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
    endian: Endian,
}

impl<'a> BinaryReader<'a> {
    /// Create a new little-endian reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            endian: Endian::Little,
        }
    }

    /// Create a new reader with an explicit byte order.
    #[inline]
    pub const fn with_endian(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            position: 0,
            endian,
        }
    }

    /// Change the byte order used for subsequent reads.
    #[inline]
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Seek to an absolute position.
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Borrow `count` bytes at an absolute offset.
    #[inline]
    pub fn bytes_at(&self, offset: usize, count: usize) -> Result<&'a [u8]> {
        let end = offset.checked_add(count).filter(|&end| end <= self.data.len());
        match end {
            Some(end) => Ok(&self.data[offset..end]),
            None => Err(Error::UnexpectedEof {
                offset,
                needed: count,
                available: self.data.len().saturating_sub(offset),
            }),
        }
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        self.bytes_at(self.position, count)
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    #[inline]
    fn read_with<T>(&mut self, size: usize, le: fn(&[u8]) -> T, be: fn(&[u8]) -> T) -> Result<T> {
        let value = self.at_with(self.position, size, le, be)?;
        self.position += size;
        Ok(value)
    }

    #[inline]
    fn at_with<T>(&self, offset: usize, size: usize, le: fn(&[u8]) -> T, be: fn(&[u8]) -> T) -> Result<T> {
        let bytes = self.bytes_at(offset, size)?;
        Ok(match self.endian {
            Endian::Little => le(bytes),
            Endian::Big => be(bytes),
        })
    }

    /// Read a u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_with(2, LittleEndian::read_u16, BigEndian::read_u16)
    }

    /// Read a u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_with(4, LittleEndian::read_u32, BigEndian::read_u32)
    }

    /// Read the byte at an absolute offset.
    #[inline]
    pub fn u8_at(&self, offset: usize) -> Result<u8> {
        self.bytes_at(offset, 1).map(|b| b[0])
    }

    /// Read a u16 at an absolute offset.
    #[inline]
    pub fn u16_at(&self, offset: usize) -> Result<u16> {
        self.at_with(offset, 2, LittleEndian::read_u16, BigEndian::read_u16)
    }

    /// Read a 24-bit unsigned integer at an absolute offset.
    #[inline]
    pub fn u24_at(&self, offset: usize) -> Result<u32> {
        self.at_with(offset, 3, LittleEndian::read_u24, BigEndian::read_u24)
    }

    /// Read a u32 at an absolute offset.
    #[inline]
    pub fn u32_at(&self, offset: usize) -> Result<u32> {
        self.at_with(offset, 4, LittleEndian::read_u32, BigEndian::read_u32)
    }

    /// Read an i32 at an absolute offset.
    #[inline]
    pub fn i32_at(&self, offset: usize) -> Result<i32> {
        self.at_with(offset, 4, LittleEndian::read_i32, BigEndian::read_i32)
    }

    /// Read a u64 at an absolute offset.
    #[inline]
    pub fn u64_at(&self, offset: usize) -> Result<u64> {
        self.at_with(offset, 8, LittleEndian::read_u64, BigEndian::read_u64)
    }

    /// Read an i64 at an absolute offset.
    #[inline]
    pub fn i64_at(&self, offset: usize) -> Result<i64> {
        self.at_with(offset, 8, LittleEndian::read_i64, BigEndian::read_i64)
    }

    /// Read an f32 at an absolute offset.
    #[inline]
    pub fn f32_at(&self, offset: usize) -> Result<f32> {
        self.at_with(offset, 4, LittleEndian::read_f32, BigEndian::read_f32)
    }

    /// Read an f64 at an absolute offset.
    #[inline]
    pub fn f64_at(&self, offset: usize) -> Result<f64> {
        self.at_with(offset, 8, LittleEndian::read_f64, BigEndian::read_f64)
    }

    /// Borrow the bytes of a null-terminated string at an absolute offset,
    /// without the terminator.
    pub fn cbytes_at(&self, offset: usize) -> Result<&'a [u8]> {
        let tail = self.bytes_at(offset, 0).map(|_| &self.data[offset..])?;
        let end = memchr::memchr(0, tail).ok_or(Error::MissingNullTerminator)?;
        Ok(&tail[..end])
    }

    /// Read a null-terminated UTF-8 string at an absolute offset.
    pub fn cstr_at(&self, offset: usize) -> Result<&'a str> {
        std::str::from_utf8(self.cbytes_at(offset)?).map_err(Error::Utf8)
    }

    /// Read a null-terminated UTF-8 string and advance past the terminator.
    pub fn read_cstring(&mut self) -> Result<&'a str> {
        let bytes = self.cbytes_at(self.position)?;
        self.position += bytes.len() + 1;
        std::str::from_utf8(bytes).map_err(Error::Utf8)
    }

    /// Read a fixed-layout structure and advance past it.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let offset = self.position;
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            offset,
            needed: size,
            available: bytes.len(),
        })
    }

    /// Expect specific magic bytes.
    pub fn expect_magic(&mut self, expected: &[u8]) -> Result<()> {
        let actual = self.read_bytes(expected.len())?;
        if actual != expected {
            return Err(Error::InvalidMagic {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            });
        }
        Ok(())
    }
}

/// Round `offset` up to the next multiple of `alignment`.
///
/// `alignment` must be non-zero.
#[inline]
pub const fn align_up(offset: usize, alignment: usize) -> usize {
    offset + (alignment - offset % alignment) % alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, 0xFF, 0xFF, // u32: 0xFFFFFFFF
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_u32().unwrap(), 0xFFFFFFFF);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_big_endian_reads() {
        let data = [0x12, 0x34, 0x56, 0x78];
        let mut reader = BinaryReader::with_endian(&data, Endian::Big);

        assert_eq!(reader.u24_at(1).unwrap(), 0x345678);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u16().unwrap(), 0x5678);
    }

    #[test]
    fn test_u24_little_endian() {
        let data = [0xC1, 0x03, 0x02, 0x01];
        let reader = BinaryReader::new(&data);
        assert_eq!(reader.u24_at(1).unwrap(), 0x010203);
    }

    #[test]
    fn test_float_bits_are_reinterpreted() {
        let data = 1.5f32.to_le_bytes();
        let reader = BinaryReader::new(&data);
        assert_eq!(reader.f32_at(0).unwrap(), 1.5);
    }

    #[test]
    fn test_read_cstring() {
        let data = b"hello\0world\0";
        let mut reader = BinaryReader::new(data);

        assert_eq!(reader.read_cstring().unwrap(), "hello");
        assert_eq!(reader.read_cstring().unwrap(), "world");
        assert_eq!(reader.cstr_at(6).unwrap(), "world");
    }

    #[test]
    fn test_cstr_without_terminator() {
        let reader = BinaryReader::new(b"abc");
        assert!(matches!(reader.cstr_at(0), Err(Error::MissingNullTerminator)));
        assert!(matches!(reader.cstr_at(10), Err(Error::UnexpectedEof { .. })));
    }

    #[test]
    fn test_positional_reads_do_not_advance() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.u32_at(0).unwrap(), 0x04030201);
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_eof_error() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(reader.read_u32().is_err());
        assert!(reader.u32_at(usize::MAX - 1).is_err());
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(1, 4), 4);
        assert_eq!(align_up(4, 4), 4);
        assert_eq!(align_up(5, 16), 16);
    }

    #[test]
    fn test_set_endian_after_bom() {
        let data = [0xFE, 0xFF, 0x12, 0x34];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.u16_at(2).unwrap(), 0x3412);

        let bom = [reader.u8_at(0).unwrap(), reader.u8_at(1).unwrap()];
        reader.set_endian(Endian::from_bom(bom).unwrap());
        assert_eq!(reader.u16_at(2).unwrap(), 0x1234);
    }

    #[test]
    fn test_bom() {
        assert_eq!(Endian::from_bom([0xFF, 0xFE]), Some(Endian::Little));
        assert_eq!(Endian::from_bom([0xFE, 0xFF]), Some(Endian::Big));
        assert_eq!(Endian::from_bom([0x00, 0x00]), None);
    }
}
