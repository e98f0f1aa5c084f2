//! Position hashing for keys and virtual nodes.
//!
//! Both functions truncate a BLAKE3 digest to its first 8 bytes, read as a
//! little-endian `u64`. The scheme is fixed for the lifetime of the process
//! but is not a wire format: nothing outside this crate depends on it.

/// Compute a key's position on the ring: blake3(key) truncated to u64.
pub fn key_position(key: &str) -> u64 {
    truncate(blake3::hash(key.as_bytes()))
}

/// Compute a virtual node's position on the ring.
///
/// Hashes `len(name) as u64 LE ++ name ++ replica_index as u32 LE`. The length
/// prefix keeps `("server1", 10)` and `("server11", 0)` apart.
pub fn replica_position(name: &str, replica_index: u32) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(name.len() as u64).to_le_bytes());
    hasher.update(name.as_bytes());
    hasher.update(&replica_index.to_le_bytes());
    truncate(hasher.finalize())
}

fn truncate(hash: blake3::Hash) -> u64 {
    let bytes = hash.as_bytes();
    let mut head = [0u8; 8];
    head.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(head)
}
