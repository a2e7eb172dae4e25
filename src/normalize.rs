//! Variant normalization against the reference genome.
//!
//! VCF producers disagree on allele orientation, anchoring and padding, so
//! the same physical variant can arrive as many different tuples. This
//! module canonicalizes a (chromosome, position, REF, ALT) tuple before
//! encoding: remediate the REF against the genome (swap, flip), trim shared
//! bases from both ends, and left-extend anchorless indels. The returned
//! code is negative for unrecoverable inputs, otherwise a bitmask of the
//! transformations applied.

use crate::chrom::encode_chrom;
use crate::genoref::{flip_allele, GenoRef, REF_MATCH_EXACT, REF_OUT_OF_RANGE};
use crate::refalt::encode_refalt;
use crate::variantkey::encode_variant_key;

/// The REF does not exist at the given position, even after remediation.
pub const NORM_INVALID: i32 = -1;
/// The position falls outside the chromosome.
pub const NORM_WRONG_POS: i32 = -2;
/// The REF matched the genome only IUPAC-compatibly.
pub const NORM_VALID: i32 = 1;
/// REF and ALT were swapped.
pub const NORM_SWAP: i32 = 1 << 1;
/// Both alleles were flipped to their complements.
pub const NORM_FLIP: i32 = 1 << 2;
/// The alleles were left-extended by one reference base.
pub const NORM_LEXT: i32 = 1 << 3;
/// Shared trailing bases were trimmed.
pub const NORM_RTRIM: i32 = 1 << 4;
/// Shared leading bases were trimmed.
pub const NORM_LTRIM: i32 = 1 << 5;

/// A canonicalized variant tuple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedVariant {
    /// 0-based position after trimming/extension
    pub pos: u32,
    /// Canonical reference allele
    pub reference: String,
    /// Canonical alternate allele
    pub alternate: String,
}

fn to_string_lossy(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

impl GenoRef {
    /// Canonicalizes a variant tuple against the reference.
    ///
    /// Returns the status code and the normalized tuple. Negative codes
    /// ([`NORM_WRONG_POS`], [`NORM_INVALID`]) carry the inputs unchanged;
    /// non-negative codes are a bitmask of the remediation and trimming
    /// steps that fired. Callers must test the sign before interpreting the
    /// bits.
    #[must_use]
    pub fn normalize_variant(
        &self,
        chrom: u8,
        pos: u32,
        reference: &str,
        alternate: &str,
    ) -> (i32, NormalizedVariant) {
        let mut pos = pos;
        let mut reference = reference.as_bytes().to_vec();
        let mut alternate = alternate.as_bytes().to_vec();

        let mut status = self.check_reference_bytes(chrom, pos, &reference);
        if status == REF_OUT_OF_RANGE {
            return (
                NORM_WRONG_POS,
                NormalizedVariant {
                    pos,
                    reference: to_string_lossy(reference),
                    alternate: to_string_lossy(alternate),
                },
            );
        }
        if status < 0 {
            // the REF is wrong: try the ALT, then the complement strand
            if self.check_reference_bytes(chrom, pos, &alternate) == REF_MATCH_EXACT {
                std::mem::swap(&mut reference, &mut alternate);
                status = NORM_SWAP;
            } else {
                let fref = flip_allele(&to_string_lossy(reference.clone())).into_bytes();
                let falt = flip_allele(&to_string_lossy(alternate.clone())).into_bytes();
                if self.check_reference_bytes(chrom, pos, &fref) == REF_MATCH_EXACT {
                    reference = fref;
                    alternate = falt;
                    status = NORM_FLIP;
                } else if self.check_reference_bytes(chrom, pos, &falt) == REF_MATCH_EXACT {
                    reference = falt;
                    alternate = fref;
                    status = NORM_SWAP | NORM_FLIP;
                } else {
                    return (
                        NORM_INVALID,
                        NormalizedVariant {
                            pos,
                            reference: to_string_lossy(reference),
                            alternate: to_string_lossy(alternate),
                        },
                    );
                }
            }
        }

        // trim shared suffix
        while !reference.is_empty()
            && !alternate.is_empty()
            && reference.last() == alternate.last()
        {
            reference.pop();
            alternate.pop();
            status |= NORM_RTRIM;
        }

        // trim shared prefix, keeping at least one base on each side
        let mut shared = 0;
        while reference.len() - shared >= 2
            && alternate.len() - shared >= 2
            && reference[shared] == alternate[shared]
        {
            shared += 1;
        }
        if shared > 0 {
            reference.drain(..shared);
            alternate.drain(..shared);
            pos += shared as u32;
            status |= NORM_LTRIM;
        }

        // an empty allele has no anchor left: borrow one base from the genome
        if (reference.is_empty() || alternate.is_empty()) && pos > 0 {
            pos -= 1;
            let base = self.sequence(chrom, pos);
            reference.insert(0, base);
            alternate.insert(0, base);
            status |= NORM_LEXT;
        }

        (
            status,
            NormalizedVariant {
                pos,
                reference: to_string_lossy(reference),
                alternate: to_string_lossy(alternate),
            },
        )
    }

    /// Normalizes a variant and encodes the result as a VariantKey.
    ///
    /// `pos_index` (0 or 1) shifts 1-based input coordinates down to the
    /// 0-based positions the keys use. The key is composed from whatever
    /// normalization produced, also when the status code reports an error.
    #[must_use]
    pub fn normalized_variant_key(
        &self,
        chrom: &str,
        pos: u32,
        pos_index: u8,
        reference: &str,
        alternate: &str,
    ) -> (u64, i32) {
        let chrom_code = encode_chrom(chrom);
        let pos = pos.saturating_sub(u32::from(pos_index));
        let (code, nv) = self.normalize_variant(chrom_code, pos, reference, alternate);
        let vk = encode_variant_key(
            chrom_code,
            nv.pos,
            encode_refalt(&nv.reference, &nv.alternate),
        );
        (vk, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write_test_genoref;

    // (code, chrom, pos, expected_pos, expected_ref, expected_alt, ref, alt)
    const NORM_CASES: [(i32, u8, u32, u32, &str, &str, &str, &str); 12] = [
        (-2, 1, 26, 26, "A", "C", "A", "C"),            // invalid position
        (-1, 1, 0, 0, "J", "C", "J", "C"),              // invalid reference
        (4, 1, 0, 0, "A", "C", "T", "G"),               // flip
        (0, 1, 0, 0, "A", "C", "A", "C"),               // OK
        (32, 13, 2, 3, "DE", "D", "CDE", "CD"),         // left trim
        (48, 13, 2, 3, "D", "F", "CDE", "CFE"),         // left + right trim
        (48, 1, 0, 2, "C", "K", "aBCDEF", "aBKDEF"),    // left + right trim
        (0, 1, 0, 0, "A", "", "A", ""),                 // OK
        (8, 1, 3, 2, "CD", "C", "D", ""),               // left extend
        (0, 1, 24, 24, "Y", "CK", "Y", "CK"),           // OK
        (2, 1, 0, 0, "A", "G", "G", "A"),               // swap
        (6, 1, 0, 0, "A", "C", "G", "T"),               // swap + flip
    ];

    #[test]
    fn test_normalize_variant() -> anyhow::Result<()> {
        let tmp = write_test_genoref();
        let gref = GenoRef::open(tmp.path())?;
        for (code, chrom, pos, epos, eref, ealt, reference, alternate) in NORM_CASES {
            let (got, nv) = gref.normalize_variant(chrom, pos, reference, alternate);
            assert_eq!(got, code, "case ({chrom}, {pos}, {reference}, {alternate})");
            assert_eq!(nv.pos, epos, "case ({chrom}, {pos}, {reference}, {alternate})");
            assert_eq!(nv.reference, eref);
            assert_eq!(nv.alternate, ealt);
        }
        Ok(())
    }

    #[test]
    fn test_normalize_is_idempotent() -> anyhow::Result<()> {
        let tmp = write_test_genoref();
        let gref = GenoRef::open(tmp.path())?;
        for (code, chrom, pos, _, _, _, reference, alternate) in NORM_CASES {
            if code < 0 {
                continue;
            }
            let (_, first) = gref.normalize_variant(chrom, pos, reference, alternate);
            let (_, second) =
                gref.normalize_variant(chrom, first.pos, &first.reference, &first.alternate);
            assert_eq!(first, second);
        }
        Ok(())
    }

    #[test]
    fn test_normalized_variant_key() -> anyhow::Result<()> {
        let tmp = write_test_genoref();
        let gref = GenoRef::open(tmp.path())?;
        // (code, chrom, pos_index, pos, vk, ref, alt)
        let cases: &[(i32, &str, u8, u32, u64, &str, &str)] = &[
            (-2, "1", 0, 26, 0x0800000d08880000, "A", "C"),
            (-1, "1", 1, 1, 0x08000000736a947f, "J", "C"),
            (4, "1", 0, 0, 0x0800000008880000, "T", "G"),
            (0, "1", 0, 0, 0x0800000008880000, "A", "C"),
            (32, "13", 1, 3, 0x68000001fed6a22d, "CDE", "CD"),
            (48, "13", 0, 2, 0x68000001c7868961, "CDE", "CFE"),
            (48, "1", 0, 0, 0x0800000147df7d13, "aBCDEF", "aBKDEF"),
            (0, "1", 0, 0, 0x0800000008000000, "A", ""),
            (8, "1", 0, 3, 0x0800000150b13d0f, "D", ""),
            (0, "1", 1, 25, 0x0800000c111ea6eb, "Y", "CK"),
            (2, "1", 0, 0, 0x0800000008900000, "G", "A"),
            (6, "1", 1, 1, 0x0800000008880000, "G", "T"),
        ];
        for &(code, chrom, pos_index, pos, vk, reference, alternate) in cases {
            let (got_vk, got_code) =
                gref.normalized_variant_key(chrom, pos, pos_index, reference, alternate);
            assert_eq!(got_vk, vk, "case ({chrom}, {pos}, {reference}, {alternate})");
            assert_eq!(got_code, code);
        }
        Ok(())
    }
}
