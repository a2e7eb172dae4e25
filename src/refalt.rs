//! REF+ALT allele codec.
//!
//! A REF/ALT pair is packed into the low 31 bits of a VariantKey. Pairs with
//! up to 11 total bases from the `ACGT` alphabet use a reversible layout:
//!
//! ```text
//! [ *RRRR AAAA 1122 3344 5566 7788 9900 11* ]
//! ```
//!
//! 4 bits of REF length, 4 bits of ALT length, then 2 bits per base packed
//! most-significant first, REF before ALT. Bit 0 is always clear in this
//! form. Everything else is reduced to a 31-bit hash with bit 0 set, so the
//! two forms can never collide and a key alone tells whether its alleles
//! are recoverable.

/// Total REF+ALT bases that still fit the reversible layout.
pub const REFALT_REV_MAXLEN: usize = 11;

/// Bit 0 of the 31-bit field, set for hashed (non-reversible) encodings.
const HASH_MODE_BIT: u32 = 0x1;

fn encode_base(c: u8) -> u32 {
    match c | 0x20 {
        b'a' => 0,
        b'c' => 1,
        b'g' => 2,
        b't' => 3,
        _ => 4,
    }
}

fn decode_base(code: u32, bitpos: u8) -> u8 {
    const BASE: [u8; 4] = [b'A', b'C', b'G', b'T'];
    BASE[((code >> bitpos) & 0x3) as usize]
}

fn encode_allele(h: &mut u32, bitpos: &mut u8, allele: &[u8]) -> bool {
    for &c in allele {
        let v = encode_base(c);
        if v > 3 {
            return false;
        }
        *bitpos -= 2;
        *h |= v << *bitpos;
    }
    true
}

fn encode_refalt_rev(reference: &[u8], alternate: &[u8]) -> Option<u32> {
    let mut h = ((reference.len() as u32) << 27) | ((alternate.len() as u32) << 23);
    let mut bitpos: u8 = 23;
    if encode_allele(&mut h, &mut bitpos, reference) && encode_allele(&mut h, &mut bitpos, alternate)
    {
        return Some(h);
    }
    None
}

/// Mixes a key into a running 32 bit hash, MurmurHash3 style.
fn muxhash(k: u32, h: u32) -> u32 {
    let mut k = k.wrapping_mul(0xcc9e_2d51);
    k = k.rotate_right(17);
    k = k.wrapping_mul(0x1b87_3593);
    let mut h = h ^ k;
    h = h.rotate_right(19);
    h.wrapping_mul(5).wrapping_add(0xe654_6b64)
}

fn encode_packchar(c: u8) -> u32 {
    if c < b'A' {
        return 27;
    }
    u32::from((c | 0x20) - b'a' + 1)
}

/// Packs up to 6 characters, 5 bits each, into a 32 bit word.
fn pack_chars(chunk: &[u8]) -> u32 {
    let mut h: u32 = 0;
    for (i, &c) in chunk.iter().enumerate() {
        h ^= encode_packchar(c) << (1 + 5 * (5 - i));
    }
    h
}

/// 32 bit hash of an allele string of any length.
fn hash32(allele: &[u8]) -> u32 {
    let mut h: u32 = 0;
    for chunk in allele.chunks(6) {
        h = muxhash(pack_chars(chunk), h);
    }
    h
}

fn encode_refalt_hash(reference: &[u8], alternate: &[u8]) -> u32 {
    // 0x3 is the separator mixed in between the REF and ALT hashes
    let mut h = muxhash(hash32(alternate), muxhash(0x3, hash32(reference)));
    // MurmurHash3 finalization mix - force all bits of a hash block to avalanche
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    (h >> 1) | HASH_MODE_BIT
}

/// Returns the 31 bit REF+ALT code for an allele pair.
///
/// The reversible layout is used whenever the pair fits it; otherwise the
/// pair is hashed (case-insensitively) and the result carries the hash-mode
/// bit. Encoding never fails.
///
/// ```
/// assert_eq!(genokey::encode_refalt("AC", "GT"), 286_097_408);
/// // Out of alphabet: hashed, bit 0 set.
/// assert_eq!(genokey::encode_refalt("N", "A") & 1, 1);
/// ```
#[must_use]
pub fn encode_refalt(reference: &str, alternate: &str) -> u32 {
    let reference = reference.as_bytes();
    let alternate = alternate.as_bytes();
    if reference.len() + alternate.len() <= REFALT_REV_MAXLEN {
        if let Some(h) = encode_refalt_rev(reference, alternate) {
            return h;
        }
    }
    encode_refalt_hash(reference, alternate)
}

/// Decodes a REF+ALT code back into its allele pair.
///
/// Returns `None` for hashed codes (the alleles must then be recovered from
/// the NRVK store) and for codes whose length fields are out of range.
#[must_use]
pub fn decode_refalt(code: u32) -> Option<(String, String)> {
    if code & HASH_MODE_BIT != 0 {
        return None; // non-reversible encoding
    }
    let sizeref = ((code & 0x7800_0000) >> 27) as usize;
    let sizealt = ((code & 0x0780_0000) >> 23) as usize;
    if sizeref + sizealt > REFALT_REV_MAXLEN {
        return None;
    }
    let mut reference = Vec::with_capacity(sizeref);
    for i in 0..sizeref {
        reference.push(decode_base(code, 21 - 2 * i as u8));
    }
    let altpos = 23 - 2 * sizeref as u8;
    let mut alternate = Vec::with_capacity(sizealt);
    for i in 0..sizealt {
        alternate.push(decode_base(code, altpos - 2 * (i as u8 + 1)));
    }
    // the codec alphabet is ASCII by construction
    Some((
        String::from_utf8(reference).expect("ACGT is valid UTF-8"),
        String::from_utf8(alternate).expect("ACGT is valid UTF-8"),
    ))
}
