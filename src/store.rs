//! Memory-mapped binary store handling.
//!
//! Every lookup table consumed by this library is a read-only binary file
//! opened once and shared for the lifetime of the process. [`MmapFile`] wraps
//! the mapping itself and exposes bounds-checked little-endian readers: an
//! out-of-range read yields the zero value, and callers guard with the row
//! counts parsed at open time. No file is ever mutated through this library.

use std::fs::File;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;

use crate::error::{Result, StoreError};

/// A read-only memory-mapped binary file.
///
/// The handle follows a strict open/close discipline: [`close`](Self::close)
/// succeeds exactly once, and closing a handle that was never opened (or was
/// already closed) reports [`StoreError::NotOpen`]. Dropping an open handle
/// releases the mapping as well, so the error path only exists for callers
/// that track release explicitly.
#[derive(Debug, Default)]
pub struct MmapFile {
    inner: Option<Mmap>,
}

impl MmapFile {
    /// Memory-maps the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not a regular
    /// file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        if !file.metadata()?.is_file() {
            return Err(StoreError::IncompatibleFile.into());
        }
        // Safety: the mapping is read-only and the file is not mutated
        // through this library while mapped
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { inner: Some(mmap) })
    }

    /// Releases the mapping.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotOpen`] if the handle was never opened or was
    /// already closed.
    pub fn close(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(_) => Ok(()),
            None => Err(StoreError::NotOpen.into()),
        }
    }

    /// Whether the handle currently holds a mapping.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Mapped size in bytes (0 when closed).
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.as_ref().map_or(0, |m| m.len())
    }

    /// The mapped bytes (empty when closed).
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.inner.as_ref().map_or(&[], |m| &m[..])
    }

    /// Reads the byte at `offset`, or 0 when out of range.
    #[must_use]
    pub fn read_u8(&self, offset: usize) -> u8 {
        self.bytes().get(offset).copied().unwrap_or(0)
    }

    fn read_range(&self, offset: usize, width: usize) -> Option<&[u8]> {
        self.bytes().get(offset..offset.checked_add(width)?)
    }

    /// Reads a little-endian u16 at `offset`, or 0 when out of range.
    #[must_use]
    pub fn read_u16(&self, offset: usize) -> u16 {
        self.read_range(offset, 2).map_or(0, LittleEndian::read_u16)
    }

    /// Reads a little-endian u32 at `offset`, or 0 when out of range.
    #[must_use]
    pub fn read_u32(&self, offset: usize) -> u32 {
        self.read_range(offset, 4).map_or(0, LittleEndian::read_u32)
    }

    /// Reads a little-endian u64 at `offset`, or 0 when out of range.
    #[must_use]
    pub fn read_u64(&self, offset: usize) -> u64 {
        self.read_range(offset, 8).map_or(0, LittleEndian::read_u64)
    }
}

/// Geometry of a table of fixed-width rows behind a `u64` row-count header.
///
/// RSVK and VKRS files share this shape: the row count, then `nrows` rows of
/// `stride` bytes each, with the lookup and companion columns at fixed byte
/// offsets inside the row. Rows are not guaranteed to be aligned, which is
/// why cells go through the [`MmapFile`] readers instead of slice casts.
#[derive(Debug, Clone, Copy)]
pub struct FixedRows {
    nrows: u64,
    stride: usize,
    col_offsets: [usize; 2],
}

impl FixedRows {
    /// Size of the row-count header preceding the rows.
    pub const HEADER_SIZE: usize = 8;

    /// Parses the header and validates the mapped size against it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Truncated`] if the mapping cannot hold the
    /// declared number of rows.
    pub fn parse(mf: &MmapFile, stride: usize, col_offsets: [usize; 2]) -> Result<Self> {
        let mapped = mf.size();
        let nrows = mf.read_u64(0);
        let required = usize::try_from(nrows)
            .ok()
            .and_then(|n| n.checked_mul(stride))
            .and_then(|n| n.checked_add(Self::HEADER_SIZE))
            .unwrap_or(usize::MAX);
        if mapped < required {
            return Err(StoreError::Truncated { required, mapped }.into());
        }
        Ok(Self {
            nrows,
            stride,
            col_offsets,
        })
    }

    /// Number of rows declared by the header.
    #[must_use]
    pub fn nrows(&self) -> u64 {
        self.nrows
    }

    /// Byte offset of the cell at (`row`, `col`).
    #[must_use]
    pub fn cell(&self, row: u64, col: usize) -> usize {
        Self::HEADER_SIZE + (row as usize * self.stride) + self.col_offsets[col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_store(bytes: &[u8]) -> NamedTempFile {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(bytes).unwrap();
        tmp.flush().unwrap();
        tmp
    }

    #[test]
    fn test_open_missing_file() {
        assert!(MmapFile::open("./no/such/file.bin").is_err());
    }

    #[test]
    fn test_open_directory() {
        assert!(MmapFile::open(std::env::temp_dir()).is_err());
    }

    #[test]
    fn test_close_once() {
        let tmp = temp_store(&[1, 2, 3, 4]);
        let mut mf = MmapFile::open(tmp.path()).unwrap();
        assert!(mf.is_open());
        assert!(mf.close().is_ok());
        assert!(!mf.is_open());
    }

    #[test]
    fn test_double_close_fails() {
        let tmp = temp_store(&[1, 2, 3, 4]);
        let mut mf = MmapFile::open(tmp.path()).unwrap();
        mf.close().unwrap();
        assert!(mf.close().is_err());
    }

    #[test]
    fn test_close_never_opened() {
        let mut mf = MmapFile::default();
        assert!(mf.close().is_err());
    }

    #[test]
    fn test_typed_readers() {
        let tmp = temp_store(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0xff]);
        let mf = MmapFile::open(tmp.path()).unwrap();
        assert_eq!(mf.size(), 9);
        assert_eq!(mf.read_u8(0), 0x01);
        assert_eq!(mf.read_u16(0), 0x0201);
        assert_eq!(mf.read_u32(0), 0x0403_0201);
        assert_eq!(mf.read_u64(0), 0x0807_0605_0403_0201);
        assert_eq!(mf.read_u8(8), 0xff);
    }

    #[test]
    fn test_reads_out_of_range() {
        let tmp = temp_store(&[0xaa, 0xbb]);
        let mf = MmapFile::open(tmp.path()).unwrap();
        assert_eq!(mf.read_u8(2), 0);
        assert_eq!(mf.read_u16(1), 0); // straddles the end
        assert_eq!(mf.read_u32(0), 0);
        assert_eq!(mf.read_u64(1000), 0);
    }

    #[test]
    fn test_reads_after_close() {
        let tmp = temp_store(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut mf = MmapFile::open(tmp.path()).unwrap();
        mf.close().unwrap();
        assert_eq!(mf.size(), 0);
        assert_eq!(mf.read_u64(0), 0);
    }

    #[test]
    fn test_fixed_rows_parse() {
        // 2 rows of 12 bytes
        let mut bytes = 2u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 24]);
        let tmp = temp_store(&bytes);
        let mf = MmapFile::open(tmp.path()).unwrap();
        let rows = FixedRows::parse(&mf, 12, [0, 4]).unwrap();
        assert_eq!(rows.nrows(), 2);
        assert_eq!(rows.cell(0, 0), 8);
        assert_eq!(rows.cell(0, 1), 12);
        assert_eq!(rows.cell(1, 0), 20);
    }

    #[test]
    fn test_fixed_rows_truncated() {
        let mut bytes = 3u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 24]); // room for 2 rows only
        let tmp = temp_store(&bytes);
        let mf = MmapFile::open(tmp.path()).unwrap();
        assert!(FixedRows::parse(&mf, 12, [0, 4]).is_err());
    }
}
