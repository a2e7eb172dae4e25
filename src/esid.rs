//! Extended string identifiers.
//!
//! External variant IDs that are not rsIDs (UniProt accessions, submitter
//! IDs, probe names) are folded into 64 bit words so they can live in the
//! same sorted columns as every other key. Three forms exist:
//!
//! - up to 10 characters packed 6 bits each behind a 4 bit length header;
//! - a prefix+number form for IDs like `ABC:0000123456` (5 packed
//!   characters, 3 bits of zero padding, 27 bits of number), flagged by a
//!   header value above 10;
//! - a 64 bit fingerprint with the top bit forced on, for IDs outside both
//!   domains. Hashed IDs are not decodable.
//!
//! Characters fold into the 64-symbol alphabet `space..=_` (uppercased);
//! anything below `'!'` becomes `'_'`.

use byteorder::{ByteOrder, LittleEndian};

/// Maximum number of characters in the packed form.
pub const ESID_MAXLEN: usize = 10;

const ESID_SHIFTPOS: u32 = 60;
const ESID_CHARBIT: u32 = 6;
const ESID_NUMPOS: u32 = 27;
const ESID_MAXPAD: u8 = 7;
const ESID_MAXNUM: u64 = 0x07FF_FFFF;

fn esid_encode_char(c: u8) -> u64 {
    if c < b'!' {
        return u64::from(b'_' - b' ');
    }
    if c > b'_' {
        // folds a-z onto A-Z and `{|}~ onto @[\]^
        return u64::from(c) - 64;
    }
    u64::from(c - b' ')
}

fn esid_decode_char(esid: u64, bitpos: u32) -> char {
    ((((esid >> bitpos) & 0x3f) as u8) + b' ') as char
}

/// Encodes up to 10 characters of `s`, starting at `start`, into a 64 bit
/// string ID.
///
/// ```
/// assert_eq!(genokey::encode_string_id("A0A022YWF9", 0), 0xA850850492E77999);
/// ```
#[must_use]
pub fn encode_string_id(s: &str, start: usize) -> u64 {
    let bytes = s.as_bytes();
    if start >= bytes.len() {
        return 0;
    }
    let take = (bytes.len() - start).min(ESID_MAXLEN);
    let mut h = (take as u64) << ESID_SHIFTPOS;
    let mut hpos = ESID_SHIFTPOS;
    for &c in &bytes[start..start + take] {
        hpos -= ESID_CHARBIT;
        h |= esid_encode_char(c) << hpos;
    }
    h
}

/// Encodes a `PREFIX<sep>NUMBER` identifier into a 64 bit string ID.
///
/// Strings of 10 bytes or fewer use the plain packed form. Longer strings
/// keep up to 5 characters before the first `sep`, up to 7 leading zeros of
/// the numerical part, and the number itself (below 2^27); a number too
/// large for the packed form falls back to [`encode_string_id`].
#[must_use]
pub fn encode_string_num_id(s: &str, sep: u8) -> u64 {
    let bytes = s.as_bytes();
    if bytes.len() <= ESID_MAXLEN {
        return encode_string_id(s, 0);
    }
    let mut h: u64 = 0;
    let mut hpos = ESID_SHIFTPOS;
    let mut nchr: u64 = 0;
    let mut tail = &bytes[bytes.len()..];
    for (i, &c) in bytes.iter().enumerate() {
        if c == sep {
            tail = &bytes[i + 1..];
            break;
        }
        if nchr < 5 {
            hpos -= ESID_CHARBIT;
            h |= esid_encode_char(c) << hpos;
            nchr += 1;
        }
    }
    let mut num: u64 = 0;
    let mut npad: u8 = 0;
    for &c in tail {
        if !c.is_ascii_digit() {
            break;
        }
        if c == b'0' && num == 0 {
            if npad < ESID_MAXPAD {
                npad += 1;
            }
            continue;
        }
        num = num * 10 + u64::from(c - b'0');
        if num > ESID_MAXNUM {
            return encode_string_id(s, 0);
        }
    }
    h | ((ESID_MAXLEN as u64 + nchr) << ESID_SHIFTPOS) | (u64::from(npad) << ESID_NUMPOS) | num
}

fn decode_string_num_id(nchr: usize, esid: u64) -> String {
    let mut out = String::with_capacity(nchr + 12);
    let mut hpos = ESID_SHIFTPOS;
    for _ in 0..nchr {
        hpos -= ESID_CHARBIT;
        out.push(esid_decode_char(esid, hpos));
    }
    out.push(':');
    let npad = (esid >> ESID_NUMPOS) & 0x7;
    for _ in 0..npad {
        out.push('0');
    }
    out.push_str(&(esid & ESID_MAXNUM).to_string());
    out
}

/// Decodes a 64 bit string ID back into its (re-encoded) text form.
///
/// Plain IDs decode to their folded characters; prefix+number IDs decode to
/// `PREFIX:0…N`. Only values produced by the encoders are meaningful here:
/// hashed IDs carry no recoverable text.
#[must_use]
pub fn decode_string_id(esid: u64) -> String {
    let size = (esid >> ESID_SHIFTPOS) as usize;
    if size > ESID_MAXLEN {
        return decode_string_num_id(size - ESID_MAXLEN, esid);
    }
    let mut out = String::with_capacity(size);
    let mut hpos = ESID_SHIFTPOS;
    for _ in 0..size {
        hpos -= ESID_CHARBIT;
        out.push(esid_decode_char(esid, hpos));
    }
    out
}

/// Returns the 64 bit fingerprint of an ID outside the packed domain.
///
/// The string is consumed as little-endian 64 bit words (the last word
/// zero-padded) through the same MurmurHash3 mixing the REF+ALT codec uses
/// for its fallback, one register width up, and finished with the 64 bit
/// avalanche. The top bit is forced on to mark the hashed form. Unseeded:
/// the same string maps to the same ID in every process.
///
/// ```
/// assert_eq!(
///     genokey::hash_string_id("0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ"),
///     12_945_031_672_818_874_332,
/// );
/// ```
#[must_use]
pub fn hash_string_id(s: &str) -> u64 {
    let mut h: u64 = 0;
    for chunk in s.as_bytes().chunks(8) {
        h = muxhash64(LittleEndian::read_uint(chunk, chunk.len()), h);
    }
    fmix64(h) | 0x8000_0000_0000_0000
}

/// Mixes a 64 bit word into a running hash, MurmurHash3 style.
fn muxhash64(k: u64, h: u64) -> u64 {
    let mut k = k.wrapping_mul(0x87c3_7b91_1142_53d5);
    k = k.rotate_left(31);
    k = k.wrapping_mul(0x4cf5_ad43_2745_937f);
    let mut h = h ^ k;
    h = h.rotate_left(27);
    h.wrapping_mul(5).wrapping_add(0x52dc_e729)
}

/// MurmurHash3 finalization mix - force all bits of a hash block to avalanche
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}
