#![doc = include_str!("../README.md")]
//!
//! # Crate layout
//!
//! - [`chrom`], [`refalt`], [`hex`]: the pure codecs behind the keys
//! - [`variantkey`], [`regionkey`]: 64 bit key composition and arithmetic
//! - [`esid`]: packed and hashed external string identifiers
//! - [`store`], [`search`]: memory-mapped file access and sorted-column
//!   search primitives
//! - [`genoref`], [`normalize`]: reference genome access and variant
//!   canonicalization
//! - [`rsidvar`], [`nrvk`]: the binary lookup tables
//!
//! Every store is a value over its own mapping; there is no global state,
//! and all operations are safe for concurrent readers once a store is open.

/// Chromosome name codec
pub mod chrom;

/// Error definitions
pub mod error;

/// Extended string identifiers
pub mod esid;

/// Reference genome access
pub mod genoref;

/// Hexadecimal key rendering
pub mod hex;

/// Variant normalization
pub mod normalize;

/// Non-reversible VariantKey store
pub mod nrvk;

/// Prelude - Commonly used types and functions
pub mod prelude;

/// REF+ALT allele codec
pub mod refalt;

/// RegionKey encoding and overlaps
pub mod regionkey;

/// rsID ⇄ VariantKey lookup tables
pub mod rsidvar;

/// Sorted-column search primitives
pub mod search;

/// Memory-mapped store handling
pub mod store;

/// VariantKey encoding
pub mod variantkey;

#[cfg(test)]
mod testutil;

pub use chrom::{decode_chrom, encode_chrom};
pub use error::{Error, Result, StoreError};
pub use esid::{decode_string_id, encode_string_id, encode_string_num_id, hash_string_id};
pub use genoref::{flip_allele, GenoRef};
pub use hex::{hex, parse_hex};
pub use normalize::NormalizedVariant;
pub use nrvk::{get_variant_key_chrom_start_pos, NrvkCols, VariantData};
pub use refalt::{decode_refalt, encode_refalt};
pub use regionkey::{
    are_overlapping_region_keys, are_overlapping_region_region_key, are_overlapping_regions,
    decode_region_key, decode_region_strand, encode_region_key, encode_region_strand,
    extend_region_key, extract_region_key_chrom, extract_region_key_end_pos,
    extract_region_key_start_pos, extract_region_key_strand, get_region_key_chrom_end_pos,
    get_region_key_chrom_start_pos, region_key, reverse_region_key, Region, RegionKey,
};
pub use rsidvar::{RsvkCols, VkrsCols};
pub use search::SearchHint;
pub use store::MmapFile;
pub use variantkey::{
    compare_variant_key_chrom, compare_variant_key_chrom_pos, decode_variant_key,
    encode_variant_key, extract_variant_key_chrom, extract_variant_key_pos,
    extract_variant_key_refalt, variant_key, variant_key_range, VariantKey, VkRange,
};
