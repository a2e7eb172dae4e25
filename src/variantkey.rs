//! 64 bit VariantKey encoding.
//!
//! A VariantKey packs a normalized variant into one sortable word:
//!
//! ```text
//! [ CCCCC PPPPPPPPPPPPPPPPPPPPPPPPPPPP RRRRRRRRRRRRRRRRRRRRRRRRRRRRRRR ]
//!   63:59 58:31 (0-based position)     30:0 (REF+ALT code)
//! ```
//!
//! Comparing keys as plain `u64` orders them by chromosome, then position.
//! Keys at the same locus differ only in the REF+ALT code, which is why
//! range brackets span `refalt = 0` to `refalt = 0x7FFFFFFF`.

use crate::chrom::encode_chrom;
use crate::refalt::encode_refalt;

/// VariantKey binary mask for the chromosome bits.
pub const VK_MASK_CHROM: u64 = 0xF800_0000_0000_0000;
/// VariantKey binary mask for the position bits.
pub const VK_MASK_POS: u64 = 0x07FF_FFFF_8000_0000;
/// VariantKey binary mask for chromosome and position together.
pub const VK_MASK_CHROM_POS: u64 = 0xFFFF_FFFF_8000_0000;
/// VariantKey binary mask for the REF+ALT code.
pub const VK_MASK_REFALT: u64 = 0x0000_0000_7FFF_FFFF;
/// Chromosome LSB offset from the VariantKey LSB.
pub const VK_SHIFT_CHROM: u8 = 59;
/// Position LSB offset from the VariantKey LSB.
pub const VK_SHIFT_POS: u8 = 31;
/// Largest encodable position (28 bits).
pub const VK_MAX_POS: u32 = 0x0FFF_FFFF;

/// The numerically decoded components of a VariantKey.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantKey {
    /// Chromosome code (low 5 bits used)
    pub chrom: u8,
    /// 0-based reference position (low 28 bits used)
    pub pos: u32,
    /// REF+ALT code (low 31 bits used)
    pub refalt: u32,
}

/// Minimum and maximum VariantKey values bracketing a locus range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VkRange {
    /// Smallest VariantKey with the given chromosome and start position
    pub min: u64,
    /// Largest VariantKey with the given chromosome and end position
    pub max: u64,
}

/// Assembles a VariantKey from pre-encoded components.
#[must_use]
pub fn encode_variant_key(chrom: u8, pos: u32, refalt: u32) -> u64 {
    (u64::from(chrom) << VK_SHIFT_CHROM) | (u64::from(pos) << VK_SHIFT_POS) | u64::from(refalt)
}

/// Extracts the chromosome code from a VariantKey.
#[must_use]
pub fn extract_variant_key_chrom(vk: u64) -> u8 {
    ((vk & VK_MASK_CHROM) >> VK_SHIFT_CHROM) as u8
}

/// Extracts the 0-based position from a VariantKey.
#[must_use]
pub fn extract_variant_key_pos(vk: u64) -> u32 {
    ((vk & VK_MASK_POS) >> VK_SHIFT_POS) as u32
}

/// Extracts the REF+ALT code from a VariantKey.
#[must_use]
pub fn extract_variant_key_refalt(vk: u64) -> u32 {
    (vk & VK_MASK_REFALT) as u32
}

/// Splits a VariantKey into its numerical components.
#[must_use]
pub fn decode_variant_key(vk: u64) -> VariantKey {
    VariantKey {
        chrom: extract_variant_key_chrom(vk),
        pos: extract_variant_key_pos(vk),
        refalt: extract_variant_key_refalt(vk),
    }
}

/// Returns the VariantKey for a (chromosome, position, REF, ALT) tuple.
///
/// The variant should already be normalized (see
/// [`GenoRef::normalized_variant_key`](crate::GenoRef::normalized_variant_key)).
///
/// ```
/// let vk = genokey::variant_key("X", 12345, "AC", "GT");
/// assert_eq!(vk, 0xB800181C910D8000);
/// ```
#[must_use]
pub fn variant_key(chrom: &str, pos: u32, reference: &str, alternate: &str) -> u64 {
    encode_variant_key(encode_chrom(chrom), pos, encode_refalt(reference, alternate))
}

/// Returns the VariantKey bracket for range searches over a locus interval.
///
/// Every key on `chrom` with a position in `[pos_min, pos_max]` sorts inside
/// the returned bracket.
#[must_use]
pub fn variant_key_range(chrom: u8, pos_min: u32, pos_max: u32) -> VkRange {
    let c = u64::from(chrom) << VK_SHIFT_CHROM;
    VkRange {
        min: c | (u64::from(pos_min) << VK_SHIFT_POS),
        max: c | (u64::from(pos_max) << VK_SHIFT_POS) | VK_MASK_REFALT,
    }
}

/// Compares two VariantKeys by chromosome only.
#[must_use]
pub fn compare_variant_key_chrom(vka: u64, vkb: u64) -> std::cmp::Ordering {
    (vka >> VK_SHIFT_CHROM).cmp(&(vkb >> VK_SHIFT_CHROM))
}

/// Compares two VariantKeys by chromosome and position.
#[must_use]
pub fn compare_variant_key_chrom_pos(vka: u64, vkb: u64) -> std::cmp::Ordering {
    (vka >> VK_SHIFT_POS).cmp(&(vkb >> VK_SHIFT_POS))
}
