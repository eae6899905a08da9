//! Stable string hashing for on-disk identifiers
//!
//! Definition and system type ids are stored in blueprints as hashes of
//! their names, so the function must never change between builds.

/// 32-bit hash value used for type and asset keys.
pub type HashValue = u32;

const FNV_OFFSET_BASIS: HashValue = 0x811c_9dc5;
const FNV_PRIME: HashValue = 0x0100_0193;

/// FNV-1a hash of `s`.
pub const fn hash(s: &str) -> HashValue {
    let bytes = s.as_bytes();
    let mut value = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        value ^= bytes[i] as HashValue;
        value = value.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_vectors() {
        assert_eq!(hash(""), 0x811c_9dc5);
        assert_eq!(hash("a"), 0xe40c_292c);
        assert_eq!(hash("foobar"), 0xbf9c_f968);
    }

    #[test]
    fn usable_in_const_context() {
        const TRANSFORM: HashValue = hash("TransformDef");
        assert_eq!(TRANSFORM, hash("TransformDef"));
        assert_ne!(TRANSFORM, hash("RenderDef"));
    }
}
