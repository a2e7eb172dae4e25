//! Non-reversible VariantKey store.
//!
//! VariantKeys whose REF/ALT pair does not fit the reversible codec carry a
//! hash instead, so the full allele strings must be recovered from an NRVK
//! file: a sorted VariantKey column, a parallel payload-offset column and
//! variable-width `[sizeref][sizealt][REF][ALT]` records, all behind a `u64`
//! item count. The store also answers the derived length and end-position
//! queries that overlap arithmetic needs, falling back to the codec for
//! reversible keys so callers never have to branch on the key form.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::chrom::decode_chrom;
use crate::error::{Result, StoreError};
use crate::hex::hex;
use crate::refalt::decode_refalt;
use crate::regionkey::{
    are_overlapping_regions, encode_region_key, extract_region_key_chrom,
    extract_region_key_end_pos, extract_region_key_start_pos,
};
use crate::search::lower_bound_by;
use crate::store::MmapFile;
use crate::variantkey::{
    extract_variant_key_chrom, extract_variant_key_pos, extract_variant_key_refalt,
    VK_MASK_CHROM, VK_SHIFT_POS,
};

/// A VariantKey decoded back to its source representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantData {
    /// Chromosome name
    pub chrom: String,
    /// 0-based position
    pub pos: u32,
    /// Reference allele (empty when unresolvable)
    pub reference: String,
    /// Alternate allele (empty when unresolvable)
    pub alternate: String,
}

/// Returns the `(chrom << 28) | pos` projection of a VariantKey.
#[must_use]
pub fn get_variant_key_chrom_start_pos(vk: u64) -> u64 {
    vk >> VK_SHIFT_POS
}

/// A memory-mapped non-reversible VariantKey store.
pub struct NrvkCols {
    mf: MmapFile,
    nrows: u64,
}

impl NrvkCols {
    const HEADER_SIZE: usize = 8;

    /// Maps an NRVK file and validates its item count.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be mapped or is too small for
    /// the two columns it declares.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mf = MmapFile::open(path)?;
        let mapped = mf.size();
        let nrows = mf.read_u64(0);
        let required = usize::try_from(nrows)
            .ok()
            .and_then(|n| n.checked_mul(16))
            .and_then(|n| n.checked_add(Self::HEADER_SIZE))
            .unwrap_or(usize::MAX);
        if mapped < required {
            return Err(StoreError::Truncated { required, mapped }.into());
        }
        Ok(Self { mf, nrows })
    }

    /// Releases the underlying mapping.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotOpen`] if already closed.
    pub fn close(&mut self) -> Result<()> {
        self.mf.close()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn nrows(&self) -> u64 {
        self.nrows
    }

    fn vk_at(&self, row: u64) -> u64 {
        self.mf.read_u64(Self::HEADER_SIZE + row as usize * 8)
    }

    fn payload_offset(&self, row: u64) -> usize {
        let col = Self::HEADER_SIZE + self.nrows as usize * 8;
        self.mf.read_u64(col + row as usize * 8) as usize
    }

    fn payload_base(&self) -> usize {
        Self::HEADER_SIZE + self.nrows as usize * 16
    }

    fn find_row(&self, vk: u64) -> Option<u64> {
        let row = lower_bound_by(|r| self.vk_at(r), 0, self.nrows, &vk);
        if row < self.nrows && self.vk_at(row) == vk {
            return Some(row);
        }
        None
    }

    fn ref_alt_at(&self, row: u64) -> (String, String) {
        let record = self.payload_base().saturating_add(self.payload_offset(row));
        let sizeref = self.mf.read_u8(record) as usize;
        let sizealt = self.mf.read_u8(record.saturating_add(1)) as usize;
        let bytes = self.mf.bytes();
        let ref_start = record.saturating_add(2);
        let alt_start = ref_start.saturating_add(sizeref);
        let reference = bytes
            .get(ref_start..alt_start)
            .unwrap_or_default();
        let alternate = bytes
            .get(alt_start..alt_start.saturating_add(sizealt))
            .unwrap_or_default();
        (
            String::from_utf8_lossy(reference).into_owned(),
            String::from_utf8_lossy(alternate).into_owned(),
        )
    }

    /// Retrieves the REF and ALT strings for a non-reversible VariantKey.
    ///
    /// Returns `None` when the key is not in the store.
    #[must_use]
    pub fn find_ref_alt(&self, vk: u64) -> Option<(String, String)> {
        self.find_row(vk).map(|row| self.ref_alt_at(row))
    }

    /// Decodes a VariantKey back to its source representation.
    ///
    /// Reversible keys decode through the codec alone; non-reversible keys
    /// resolve their alleles through the store. The second element is the
    /// total allele length, 0 when the alleles could not be resolved.
    #[must_use]
    pub fn reverse_variant_key(&self, vk: u64) -> (VariantData, usize) {
        let (reference, alternate) = decode_refalt(extract_variant_key_refalt(vk))
            .or_else(|| self.find_ref_alt(vk))
            .unwrap_or_default();
        let len = reference.len() + alternate.len();
        (
            VariantData {
                chrom: decode_chrom(extract_variant_key_chrom(vk)).to_string(),
                pos: extract_variant_key_pos(vk),
                reference,
                alternate,
            },
            len,
        )
    }

    /// Reference allele length of a VariantKey, 0 when the key is
    /// non-reversible and absent from the store.
    #[must_use]
    pub fn ref_length(&self, vk: u64) -> usize {
        if vk & 0x1 == 0 {
            // reversible: the length sits in the code itself
            return ((vk & 0x0000_0000_7800_0000) >> 27) as usize;
        }
        match self.find_row(vk) {
            Some(row) => {
                let record = self.payload_base().saturating_add(self.payload_offset(row));
                self.mf.read_u8(record) as usize
            }
            None => 0,
        }
    }

    /// End position (pos + REF length) of a VariantKey.
    #[must_use]
    pub fn end_pos(&self, vk: u64) -> u32 {
        extract_variant_key_pos(vk) + self.ref_length(vk) as u32
    }

    /// Returns the `(chrom << 28) | end_pos` projection of a VariantKey.
    #[must_use]
    pub fn chrom_end_pos(&self, vk: u64) -> u64 {
        ((vk & VK_MASK_CHROM) >> VK_SHIFT_POS) | u64::from(self.end_pos(vk))
    }

    /// Converts a VariantKey into the RegionKey covering its REF span.
    #[must_use]
    pub fn variant_to_region_key(&self, vk: u64) -> u64 {
        encode_region_key(
            extract_variant_key_chrom(vk),
            extract_variant_key_pos(vk),
            self.end_pos(vk),
            0,
        )
    }

    /// Checks whether a variant overlaps a region.
    #[must_use]
    pub fn are_overlapping_variant_key_region_key(&self, vk: u64, rk: u64) -> bool {
        are_overlapping_regions(
            extract_variant_key_chrom(vk),
            extract_variant_key_pos(vk),
            self.end_pos(vk),
            extract_region_key_chrom(rk),
            extract_region_key_start_pos(rk),
            extract_region_key_end_pos(rk),
        )
    }

    /// Dumps the store as a `VariantKey\tREF\tALT` TSV for diagnostics.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the output file cannot be created or written.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<u64> {
        let mut out = BufWriter::new(File::create(path)?);
        let mut written = 0u64;
        for row in 0..self.nrows {
            let (reference, alternate) = self.ref_alt_at(row);
            let line = format!("{}\t{}\t{}\n", hex(self.vk_at(row)), reference, alternate);
            out.write_all(line.as_bytes())?;
            written += line.len() as u64;
        }
        out.flush()?;
        Ok(written)
    }
}
