//! Memory-mapped reference genome access.
//!
//! A GENOREF file is the packed reference: a 27-entry chromosome index (byte
//! offsets of each chromosome's sequence, entry 0 unused, entry 26 the file
//! length) followed by the raw ASCII bases of chromosomes 1..=25 back to
//! back. Random access by (chromosome, position) is a single index add; the
//! reference check is IUPAC-aware so degenerate bases in either the genome
//! or the observed allele still count as compatible.

use std::path::Path;

use crate::chrom::CHROM_MAX;
use crate::error::{Result, StoreError};
use crate::store::MmapFile;

/// Number of entries in the chromosome index.
pub const GENOREF_INDEX_LEN: usize = 27;

const GENOREF_HEADER_SIZE: usize = GENOREF_INDEX_LEN * 8;

/// Reference allele check: exact match over the whole allele.
pub const REF_MATCH_EXACT: i32 = 0;
/// Reference allele check: IUPAC-compatible match at one or more positions.
pub const REF_MATCH_COMPAT: i32 = 1;
/// Reference allele check: at least one incompatible base.
pub const REF_MISMATCH: i32 = -1;
/// Reference allele check: the allele runs past the chromosome end.
pub const REF_OUT_OF_RANGE: i32 = -2;

/// ACGT membership bitmask of an IUPAC nucleotide code (A=1 C=2 G=4 T=8).
fn iupac_mask(c: u8) -> u8 {
    match c {
        b'A' => 0b0001,
        b'C' => 0b0010,
        b'G' => 0b0100,
        b'T' => 0b1000,
        b'M' => 0b0011,
        b'K' => 0b1100,
        b'R' => 0b0101,
        b'Y' => 0b1010,
        b'S' => 0b0110,
        b'W' => 0b1001,
        b'B' => 0b1110,
        b'V' => 0b0111,
        b'D' => 0b1101,
        b'H' => 0b1011,
        b'N' => 0b1111,
        _ => 0,
    }
}

fn flip_base(c: u8) -> u8 {
    let upper = c.to_ascii_uppercase();
    match upper {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'M' => b'K',
        b'K' => b'M',
        b'R' => b'Y',
        b'Y' => b'R',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        b'W' | b'S' | b'N' => upper,
        _ => c,
    }
}

/// Returns the uppercased complement of an allele.
///
/// Covers the full IUPAC alphabet (`M`↔`K`, `R`↔`Y`, `B`↔`V`, `D`↔`H`, with
/// `W`, `S` and `N` self-complementary); bytes outside it pass through
/// unchanged. An involution on the uppercase alphabet.
///
/// ```
/// assert_eq!(genokey::flip_allele("ACGTn"), "TGCAN");
/// ```
#[must_use]
pub fn flip_allele(allele: &str) -> String {
    // the complement map never leaves ASCII
    allele.bytes().map(flip_base).map(char::from).collect()
}

/// A memory-mapped reference genome.
pub struct GenoRef {
    mf: MmapFile,
    index: [u64; GENOREF_INDEX_LEN],
}

impl GenoRef {
    /// Maps a GENOREF file and parses its chromosome index.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be mapped or is too small for the
    /// index it declares.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mf = MmapFile::open(path)?;
        let mapped = mf.size();
        if mapped < GENOREF_HEADER_SIZE {
            return Err(StoreError::Truncated {
                required: GENOREF_HEADER_SIZE,
                mapped,
            }
            .into());
        }
        let mut index = [0u64; GENOREF_INDEX_LEN];
        for (i, entry) in index.iter_mut().enumerate() {
            *entry = mf.read_u64(i * 8);
        }
        let required = index[GENOREF_INDEX_LEN - 1] as usize;
        if mapped < required {
            return Err(StoreError::Truncated { required, mapped }.into());
        }
        Ok(Self { mf, index })
    }

    /// Releases the underlying mapping.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotOpen`] if already closed.
    pub fn close(&mut self) -> Result<()> {
        self.mf.close()
    }

    /// Sequence length of a chromosome, 0 for invalid codes.
    #[must_use]
    pub fn chrom_len(&self, chrom: u8) -> u64 {
        if !(1..=CHROM_MAX).contains(&chrom) {
            return 0;
        }
        let c = chrom as usize;
        self.index[c + 1].saturating_sub(self.index[c])
    }

    /// Returns the ASCII base of `chrom` at the 0-based `pos`, or 0 when the
    /// position falls outside the chromosome.
    #[must_use]
    pub fn sequence(&self, chrom: u8, pos: u32) -> u8 {
        if !(1..=CHROM_MAX).contains(&chrom) {
            return 0;
        }
        let c = chrom as usize;
        let offset = self.index[c] + u64::from(pos);
        if offset >= self.index[c + 1] {
            return 0;
        }
        self.mf.read_u8(offset as usize)
    }

    pub(crate) fn check_reference_bytes(&self, chrom: u8, pos: u32, reference: &[u8]) -> i32 {
        let len = self.chrom_len(chrom);
        if u64::from(pos) + reference.len() as u64 > len {
            return REF_OUT_OF_RANGE;
        }
        let mut ret = REF_MATCH_EXACT;
        for (i, &c) in reference.iter().enumerate() {
            let uref = c.to_ascii_uppercase();
            let gref = self.sequence(chrom, pos + i as u32).to_ascii_uppercase();
            if uref == gref {
                continue;
            }
            if iupac_mask(uref) & iupac_mask(gref) == 0 {
                return REF_MISMATCH;
            }
            ret = REF_MATCH_COMPAT;
        }
        ret
    }

    /// Compares an observed reference allele against the genome.
    ///
    /// Returns [`REF_MATCH_EXACT`] on a full case-insensitive match,
    /// [`REF_MATCH_COMPAT`] when every difference is still IUPAC-compatible
    /// (e.g. genome `M` against observed `A`), [`REF_MISMATCH`] on any
    /// incompatible base and [`REF_OUT_OF_RANGE`] when the allele runs past
    /// the chromosome end. Callers must test the sign before interpreting
    /// the value.
    #[must_use]
    pub fn check_reference(&self, chrom: u8, pos: u32, reference: &str) -> i32 {
        self.check_reference_bytes(chrom, pos, reference.as_bytes())
    }
}
