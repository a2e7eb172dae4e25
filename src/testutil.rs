//! Shared binary fixtures for the store tests.
//!
//! The fixture genome is tiny but shaped like the real thing: chromosome `c`
//! is the first `27 - c` letters of the alphabet, so every chromosome has a
//! distinct length and content, and degenerate IUPAC letters appear at known
//! offsets.

use std::io::Write;

use tempfile::NamedTempFile;

fn write_file(bytes: &[u8]) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("create temp fixture");
    tmp.write_all(bytes).expect("write temp fixture");
    tmp.flush().expect("flush temp fixture");
    tmp
}

/// Writes the alphabet genome: 27 x u64 index, then the sequences.
pub(crate) fn write_test_genoref() -> NamedTempFile {
    let sequences: Vec<Vec<u8>> = (1..=25u8)
        .map(|c| (0..27 - c).map(|i| b'A' + i).collect())
        .collect();
    let mut index = [0u64; 27];
    let mut offset = 27 * 8u64;
    for (c, seq) in sequences.iter().enumerate() {
        index[c + 1] = offset;
        offset += seq.len() as u64;
    }
    index[26] = offset;
    index[0] = index[1];

    let mut bytes = Vec::with_capacity(offset as usize);
    for entry in index {
        bytes.extend_from_slice(&entry.to_le_bytes());
    }
    for seq in &sequences {
        bytes.extend_from_slice(seq);
    }
    write_file(&bytes)
}

/// Writes an RSVK table: u64 row count, then (u32 rsid, u64 vk) rows.
pub(crate) fn write_test_rsvk(rows: &[(u32, u64)]) -> NamedTempFile {
    let mut bytes = (rows.len() as u64).to_le_bytes().to_vec();
    for &(rsid, vk) in rows {
        bytes.extend_from_slice(&rsid.to_le_bytes());
        bytes.extend_from_slice(&vk.to_le_bytes());
    }
    write_file(&bytes)
}

/// Writes a VKRS table: u64 row count, then (u64 vk, u32 rsid) rows.
pub(crate) fn write_test_vkrs(rows: &[(u64, u32)]) -> NamedTempFile {
    let mut bytes = (rows.len() as u64).to_le_bytes().to_vec();
    for &(vk, rsid) in rows {
        bytes.extend_from_slice(&vk.to_le_bytes());
        bytes.extend_from_slice(&rsid.to_le_bytes());
    }
    write_file(&bytes)
}

/// Writes an NRVK store: u64 item count, sorted VariantKey column, payload
/// offset column, then `[sizeref][sizealt][REF][ALT]` records.
pub(crate) fn write_test_nrvk(rows: &[(u64, &str, &str)]) -> NamedTempFile {
    let mut bytes = (rows.len() as u64).to_le_bytes().to_vec();
    for &(vk, _, _) in rows {
        bytes.extend_from_slice(&vk.to_le_bytes());
    }
    let mut offset = 0u64;
    for &(_, reference, alternate) in rows {
        bytes.extend_from_slice(&offset.to_le_bytes());
        offset += 2 + reference.len() as u64 + alternate.len() as u64;
    }
    for &(_, reference, alternate) in rows {
        bytes.push(reference.len() as u8);
        bytes.push(alternate.len() as u8);
        bytes.extend_from_slice(reference.as_bytes());
        bytes.extend_from_slice(alternate.as_bytes());
    }
    write_file(&bytes)
}
