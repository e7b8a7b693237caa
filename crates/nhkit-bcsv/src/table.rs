//! BCSV table parser.
//!
//! ```text
//! [0x00] BcsvHeader (12 bytes)
//! [0x0C] "VSCB" + 12 reserved bytes (version 1 only)
//! [0x0C or 0x1C] column count x BcsvColumn
//!                row count x row size bytes
//! ```

use std::fmt;
use std::path::Path;

use hashbrown::HashMap as FastHashMap;
use nhkit_common::BinaryReader;
use rustc_hash::FxHasher;

use crate::{BcsvColumn, BcsvHeader, Error, FieldValue, Result};

type FxHashMap<K, V> = FastHashMap<K, V, std::hash::BuildHasherDefault<FxHasher>>;

/// A decoded BCSV table.
#[derive(Debug, Clone)]
pub struct Bcsv {
    version: u8,
    flag: u8,
    columns: Vec<BcsvColumn>,
    column_index: FxHashMap<u32, usize>,
    rows: Vec<Vec<FieldValue>>,
}

impl Bcsv {
    /// Read and parse a BCSV file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    /// Parse a BCSV table from a buffer.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let header: BcsvHeader = reader.read_struct()?;
        let (row_count, row_size, column_count) =
            (header.row_count, header.row_size, header.column_count);

        if row_count == 0 || row_size == 0 || column_count == 0 {
            return Err(Error::InvalidHeader {
                rows: row_count,
                row_size,
                columns: column_count,
            });
        }

        let start = BcsvHeader::column_table_offset(header.version)
            .ok_or(Error::InvalidVersion(header.version))?;
        if header.version == 1 {
            let magic = reader.bytes_at(0x0C, 4)?;
            if magic != BcsvHeader::MAGIC_V1 {
                return Err(Error::InvalidMagic([magic[0], magic[1], magic[2], magic[3]]));
            }
        }

        reader.seek(start);
        let mut columns = Vec::with_capacity(column_count as usize);
        for _ in 0..column_count {
            columns.push(reader.read_struct::<BcsvColumn>()?);
        }
        let widths = column_widths(&columns, row_size)?;

        let rows_start = reader.position();
        let row_size = row_size as usize;
        // Bounds-check the whole row block before allocating for it.
        reader.bytes_at(rows_start, (row_count as usize).saturating_mul(row_size))?;

        let mut rows = Vec::with_capacity(row_count as usize);
        for i in 0..row_count as usize {
            let row = reader.bytes_at(rows_start + i * row_size, row_size)?;
            let fields = columns
                .iter()
                .zip(&widths)
                .map(|(column, &width)| {
                    let offset = column.offset as usize;
                    FieldValue::decode(&row[offset..offset + width])
                })
                .collect();
            rows.push(fields);
        }

        let mut column_index = FxHashMap::default();
        for (i, column) in columns.iter().enumerate() {
            column_index.entry(column.hash).or_insert(i);
        }

        tracing::debug!(
            version = header.version,
            rows = rows.len(),
            columns = columns.len(),
            "parsed BCSV table"
        );

        Ok(Self {
            version: header.version,
            flag: header.flag,
            columns,
            column_index,
            rows,
        })
    }

    /// Table version (0 or 1).
    #[inline]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Whether enum columns hold Japanese names.
    #[inline]
    pub fn has_jp_enums(&self) -> bool {
        self.flag == 0
    }

    /// Number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column definitions in table order.
    #[inline]
    pub fn columns(&self) -> &[BcsvColumn] {
        &self.columns
    }

    /// Column name hashes in table order.
    pub fn column_hashes(&self) -> impl Iterator<Item = u32> + '_ {
        self.columns.iter().map(|c| c.hash)
    }

    /// All rows.
    #[inline]
    pub fn rows(&self) -> &[Vec<FieldValue>] {
        &self.rows
    }

    /// Get a row by index.
    #[inline]
    pub fn row(&self, index: usize) -> Option<&[FieldValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Position of a column by name hash.
    #[inline]
    pub fn column_position(&self, hash: u32) -> Option<usize> {
        self.column_index.get(&hash).copied()
    }

    /// Every row's value for one column.
    pub fn column(&self, hash: u32) -> Option<Vec<&FieldValue>> {
        let index = self.column_position(hash)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// One field by row index and column hash.
    pub fn get(&self, row: usize, hash: u32) -> Option<&FieldValue> {
        let index = self.column_position(hash)?;
        self.rows.get(row).map(|r| &r[index])
    }
}

/// Width of each column, from its offset to the next one (or the row end).
fn column_widths(columns: &[BcsvColumn], row_size: u32) -> Result<Vec<usize>> {
    let mut widths = Vec::with_capacity(columns.len());
    for (i, column) in columns.iter().enumerate() {
        let end = columns.get(i + 1).map_or(row_size, |next| next.offset);
        let offset = column.offset;
        if offset > end || end > row_size {
            return Err(Error::InvalidColumn {
                index: i,
                offset,
                row_size,
            });
        }
        widths.push((end - offset) as usize);
    }
    Ok(widths)
}

impl fmt::Display for Bcsv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = self.column_hashes().map(|h| format!("{h:08X}")).collect();
        writeln!(f, "{}", header.join(" "))?;

        for row in &self.rows {
            let fields: Vec<String> = row.iter().map(ToString::to_string).collect();
            writeln!(f, "{}", fields.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a table with columns at the given offsets.
    fn build(version: u8, columns: &[(u32, u32)], row_size: u32, rows: &[Vec<u8>]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&(rows.len() as u32).to_le_bytes());
        data.extend_from_slice(&row_size.to_le_bytes());
        data.extend_from_slice(&(columns.len() as u16).to_le_bytes());
        data.push(version);
        data.push(1);
        if version == 1 {
            data.extend_from_slice(b"VSCB");
            data.extend_from_slice(&[0; 12]);
        }
        for (hash, offset) in columns {
            data.extend_from_slice(&hash.to_le_bytes());
            data.extend_from_slice(&offset.to_le_bytes());
        }
        for row in rows {
            assert_eq!(row.len(), row_size as usize);
            data.extend_from_slice(row);
        }
        data
    }

    fn row(id: u8, count: u16, price: u32, scale: f32, label: &[u8; 8]) -> Vec<u8> {
        let mut r = vec![id];
        r.push(0);
        r.extend_from_slice(&count.to_le_bytes());
        r.extend_from_slice(&price.to_le_bytes());
        r.extend_from_slice(&scale.to_le_bytes());
        r.extend_from_slice(label);
        r
    }

    // id: 1 byte + 1 pad (width 2 by offsets, so u16), count u16, price u32, scale f32, label 8.
    const COLUMNS: [(u32, u32); 5] = [
        (0x54706054, 0),
        (0x11223344, 2),
        (0xAABBCCDD, 4),
        (0x0000BEEF, 8),
        (0xCAFEBABE, 12),
    ];

    #[test]
    fn test_parse_v1() {
        let data = build(
            1,
            &COLUMNS,
            20,
            &[
                row(1, 10, 500, 1.5, b"Apple\0\0\0"),
                row(2, 0, 0, 0.0, b"Pear\0\0\0\0"),
            ],
        );
        let table = Bcsv::parse(&data).unwrap();

        assert_eq!(table.version(), 1);
        assert!(!table.has_jp_enums());
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 5);

        let first = table.row(0).unwrap();
        assert_eq!(first[0], FieldValue::UInt16(1));
        assert_eq!(first[1], FieldValue::UInt16(10));
        assert_eq!(first[2], FieldValue::UInt32(500));
        assert_eq!(first[3], FieldValue::Float(1.5));
        assert_eq!(first[4], FieldValue::String("Apple".into()));

        // Zero bits decode as an integer, not a float.
        assert_eq!(table.get(1, 0x0000BEEF), Some(&FieldValue::UInt32(0)));
        assert_eq!(
            table.column(0xCAFEBABE).unwrap(),
            [&FieldValue::String("Apple".into()), &FieldValue::String("Pear".into())]
        );
        assert!(table.column(0x12345678).is_none());
    }

    #[test]
    fn test_parse_v0_single_byte_column() {
        let data = build(0, &[(1, 0), (2, 1)], 3, &[vec![9, 0x34, 0x12]]);
        let table = Bcsv::parse(&data).unwrap();

        assert_eq!(table.row(0).unwrap(), [FieldValue::UInt8(9), FieldValue::UInt16(0x1234)]);
        assert_eq!(table.column_hashes().collect::<Vec<_>>(), [1, 2]);
    }

    #[test]
    fn test_display() {
        let data = build(0, &[(0xAB, 0), (0xCD, 1)], 3, &[vec![7, 1, 0]]);
        let table = Bcsv::parse(&data).unwrap();
        assert_eq!(table.to_string(), "000000AB 000000CD\n7 1\n");
    }

    #[test]
    fn test_header_errors() {
        let mut data = build(0, &[(1, 0)], 1, &[vec![0]]);
        data[0..4].copy_from_slice(&0u32.to_le_bytes());
        assert!(matches!(Bcsv::parse(&data), Err(Error::InvalidHeader { .. })));

        let mut data = build(0, &[(1, 0)], 1, &[vec![0]]);
        data[0xA] = 2;
        assert!(matches!(Bcsv::parse(&data), Err(Error::InvalidVersion(2))));

        let mut data = build(1, &[(1, 0)], 1, &[vec![0]]);
        data[0xC] = b'X';
        assert!(matches!(Bcsv::parse(&data), Err(Error::InvalidMagic(_))));
    }

    #[test]
    fn test_bad_column_offset() {
        let data = build(0, &[(1, 2), (2, 1)], 4, &[vec![0; 4]]);
        assert!(matches!(
            Bcsv::parse(&data),
            Err(Error::InvalidColumn { index: 0, .. })
        ));
    }

    #[test]
    fn test_truncated_rows() {
        let mut data = build(0, &[(1, 0)], 4, &[vec![0; 4]]);
        data.truncate(data.len() - 1);
        assert!(matches!(Bcsv::parse(&data), Err(Error::Common(_))));
    }
}
