//! Commonly used types and functions.
//!
//! ```
//! use genokey::prelude::*;
//!
//! let vk = variant_key("X", 12345, "AC", "GT");
//! assert_eq!(hex(vk), "b800181c910d8000");
//! ```

pub use crate::chrom::{decode_chrom, encode_chrom};
pub use crate::error::{Error, Result, StoreError};
pub use crate::esid::{decode_string_id, encode_string_id, encode_string_num_id, hash_string_id};
pub use crate::genoref::{flip_allele, GenoRef};
pub use crate::hex::{hex, parse_hex};
pub use crate::normalize::NormalizedVariant;
pub use crate::nrvk::{NrvkCols, VariantData};
pub use crate::refalt::{decode_refalt, encode_refalt};
pub use crate::regionkey::{
    are_overlapping_region_keys, are_overlapping_region_region_key, are_overlapping_regions,
    decode_region_key, encode_region_key, extend_region_key, region_key, reverse_region_key,
    Region, RegionKey,
};
pub use crate::rsidvar::{RsvkCols, VkrsCols};
pub use crate::search::SearchHint;
pub use crate::store::MmapFile;
pub use crate::variantkey::{
    decode_variant_key, encode_variant_key, variant_key, variant_key_range, VariantKey, VkRange,
};
