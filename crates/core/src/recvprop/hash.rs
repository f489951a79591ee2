//! FNV-1a hashing for the RecvProp offset cache

/// FNV-1a 32-bit hash (compile-time capable)
pub const fn fnv1a_32(data: &[u8]) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c9dc5;
    const PRIME: u32 = 0x01000193;

    let mut hash = OFFSET_BASIS;
    let mut i = 0;
    while i < data.len() {
        hash ^= data[i] as u32;
        hash = hash.wrapping_mul(PRIME);
        i += 1;
    }
    hash
}

/// Cache key for a (table, prop) pair: table hash in the high half
pub const fn combined_hash(table: &[u8], prop: &[u8]) -> u64 {
    ((fnv1a_32(table) as u64) << 32) | (fnv1a_32(prop) as u64)
}
