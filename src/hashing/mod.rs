//! BLAKE3 helpers for naming on-disk artifacts after opaque identifiers.

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

/// Returns a filesystem-safe directory name for `session_id`.
///
/// Session ids are opaque and may contain path separators, so they never reach the
/// filesystem verbatim. The 16 hex chars keep directory listings readable.
#[inline]
pub fn session_dir_name(session_id: &str) -> String {
    format!("{:016x}", hash_to_u64(session_id.as_bytes()))
}
