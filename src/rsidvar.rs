//! rsID ⇄ VariantKey lookup tables.
//!
//! Two binary tables link dbSNP rsIDs and VariantKeys, each sorted by its
//! lookup column: RSVK rows are `(u32 rsid, u64 vk)` sorted by rsid, VKRS
//! rows are `(u64 vk, u32 rsid)` sorted by vk. Both map one-to-many, so the
//! find operations return the first matching row and a cursor that the
//! `next` operations advance across the remaining matches.
//!
//! All finds take an explicit `[first, last)` row range; a miss returns the
//! zero value with the `last` sentinel as the row. The `*_hinted` variants
//! take a [`SearchHint`] built over the lookup column; passing
//! [`SearchHint::empty`] forces plain binary search and both paths return
//! identical results.

use std::path::Path;

use crate::error::Result;
use crate::search::{lower_bound_by, upper_bound_by, SearchHint};
use crate::store::{FixedRows, MmapFile};
use crate::variantkey::VK_SHIFT_POS;

const ROW_STRIDE: usize = 12;

/// A memory-mapped rsID → VariantKey table.
pub struct RsvkCols {
    mf: MmapFile,
    rows: FixedRows,
}

impl RsvkCols {
    /// Maps an RSVK file and parses its header.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be mapped or cannot hold the row
    /// count it declares.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mf = MmapFile::open(path)?;
        let rows = FixedRows::parse(&mf, ROW_STRIDE, [0, 4])?;
        Ok(Self { mf, rows })
    }

    /// Releases the underlying mapping.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotOpen`](crate::StoreError::NotOpen) if
    /// already closed.
    pub fn close(&mut self) -> Result<()> {
        self.mf.close()
    }

    /// Number of rows in the table.
    #[must_use]
    pub fn nrows(&self) -> u64 {
        self.rows.nrows()
    }

    fn rsid_at(&self, row: u64) -> u32 {
        self.mf.read_u32(self.rows.cell(row, 0))
    }

    fn vk_at(&self, row: u64) -> u64 {
        self.mf.read_u64(self.rows.cell(row, 1))
    }

    /// Builds the per-top-byte interpolation hint over the rsid column.
    #[must_use]
    pub fn build_hint(&self) -> SearchHint {
        SearchHint::build(self.nrows(), |row| self.rsid_at(row), |b| u32::from(b) << 24)
    }

    /// Returns the first VariantKey mapped to `rsid` in `[first, last)`,
    /// with its row; `(0, last)` on miss.
    #[must_use]
    pub fn find_vk_by_rsid(&self, first: u64, last: u64, rsid: u32) -> (u64, u64) {
        self.find_vk_by_rsid_hinted(&SearchHint::empty(), first, last, rsid)
    }

    /// [`find_vk_by_rsid`](Self::find_vk_by_rsid) with hint narrowing.
    #[must_use]
    pub fn find_vk_by_rsid_hinted(
        &self,
        hint: &SearchHint,
        first: u64,
        last: u64,
        rsid: u32,
    ) -> (u64, u64) {
        let cap = last.min(self.nrows());
        let (lo, hi) = hint.narrow((rsid >> 24) as u8, first, cap);
        let row = lower_bound_by(|r| self.rsid_at(r), lo, hi, &rsid);
        if row < hi && self.rsid_at(row) == rsid {
            return (self.vk_at(row), row);
        }
        (0, last)
    }

    /// Advances the cursor to the next row still mapping `rsid`.
    ///
    /// Call after a successful find to walk multi-mapped rsIDs; returns
    /// `(0, cursor)` once the matches are exhausted.
    #[must_use]
    pub fn next_vk_by_rsid(&self, pos: u64, last: u64, rsid: u32) -> (u64, u64) {
        let cap = last.min(self.nrows());
        let next = pos + 1;
        if next < cap && self.rsid_at(next) == rsid {
            return (self.vk_at(next), next);
        }
        (0, next.min(last))
    }

    /// Collects every VariantKey mapped to `rsid` in `[first, last)`.
    #[must_use]
    pub fn find_all_vk_by_rsid(&self, first: u64, last: u64, rsid: u32) -> Vec<u64> {
        let mut out = Vec::new();
        let (mut vk, mut pos) = self.find_vk_by_rsid(first, last, rsid);
        while vk != 0 {
            out.push(vk);
            (vk, pos) = self.next_vk_by_rsid(pos, last, rsid);
        }
        out
    }
}

/// A memory-mapped VariantKey → rsID table.
pub struct VkrsCols {
    mf: MmapFile,
    rows: FixedRows,
}

impl VkrsCols {
    /// Maps a VKRS file and parses its header.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be mapped or cannot hold the row
    /// count it declares.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mf = MmapFile::open(path)?;
        let rows = FixedRows::parse(&mf, ROW_STRIDE, [0, 8])?;
        Ok(Self { mf, rows })
    }

    /// Releases the underlying mapping.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotOpen`](crate::StoreError::NotOpen) if
    /// already closed.
    pub fn close(&mut self) -> Result<()> {
        self.mf.close()
    }

    /// Number of rows in the table.
    #[must_use]
    pub fn nrows(&self) -> u64 {
        self.rows.nrows()
    }

    fn vk_at(&self, row: u64) -> u64 {
        self.mf.read_u64(self.rows.cell(row, 0))
    }

    fn rsid_at(&self, row: u64) -> u32 {
        self.mf.read_u32(self.rows.cell(row, 1))
    }

    /// Builds the per-top-byte interpolation hint over the vk column.
    #[must_use]
    pub fn build_hint(&self) -> SearchHint {
        SearchHint::build(self.nrows(), |row| self.vk_at(row), |b| u64::from(b) << 56)
    }

    /// Returns the first rsID mapped to `vk` in `[first, last)`, with its
    /// row; `(0, last)` on miss.
    #[must_use]
    pub fn find_rsid_by_vk(&self, first: u64, last: u64, vk: u64) -> (u32, u64) {
        self.find_rsid_by_vk_hinted(&SearchHint::empty(), first, last, vk)
    }

    /// [`find_rsid_by_vk`](Self::find_rsid_by_vk) with hint narrowing.
    #[must_use]
    pub fn find_rsid_by_vk_hinted(
        &self,
        hint: &SearchHint,
        first: u64,
        last: u64,
        vk: u64,
    ) -> (u32, u64) {
        let cap = last.min(self.nrows());
        let (lo, hi) = hint.narrow((vk >> 56) as u8, first, cap);
        let row = lower_bound_by(|r| self.vk_at(r), lo, hi, &vk);
        if row < hi && self.vk_at(row) == vk {
            return (self.rsid_at(row), row);
        }
        (0, last)
    }

    /// Advances the cursor to the next row still mapping `vk`.
    #[must_use]
    pub fn next_rsid_by_vk(&self, pos: u64, last: u64, vk: u64) -> (u32, u64) {
        let cap = last.min(self.nrows());
        let next = pos + 1;
        if next < cap && self.vk_at(next) == vk {
            return (self.rsid_at(next), next);
        }
        (0, next.min(last))
    }

    /// Collects every rsID mapped to `vk` in `[first, last)`.
    #[must_use]
    pub fn find_all_rsid_by_vk(&self, first: u64, last: u64, vk: u64) -> Vec<u32> {
        let mut out = Vec::new();
        let (mut rsid, mut pos) = self.find_rsid_by_vk(first, last, vk);
        while rsid != 0 {
            out.push(rsid);
            (rsid, pos) = self.next_rsid_by_vk(pos, last, vk);
        }
        out
    }

    /// Finds the rows whose chromosome and position fall in
    /// `[pos_min, pos_max]` on `chrom`.
    ///
    /// Bisects the top 33 bits of the vk column. Returns the rsID of the
    /// first row in range and the `[first, last)` row bracket; on an empty
    /// range, `(0, last, last)`.
    #[must_use]
    pub fn find_chrom_pos_range(
        &self,
        first: u64,
        last: u64,
        chrom: u8,
        pos_min: u32,
        pos_max: u32,
    ) -> (u32, u64, u64) {
        let cap = last.min(self.nrows());
        let key_min = (u64::from(chrom) << 28) | u64::from(pos_min);
        let key_max = (u64::from(chrom) << 28) | u64::from(pos_max);
        let lo = lower_bound_by(|r| self.vk_at(r) >> VK_SHIFT_POS, first, cap, &key_min);
        let hi = upper_bound_by(|r| self.vk_at(r) >> VK_SHIFT_POS, lo, cap, &key_max);
        if lo >= hi {
            return (0, last, last);
        }
        (self.rsid_at(lo), lo, hi)
    }
}
