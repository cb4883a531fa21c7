//! # Hashing
//!
//! Everything the ledger hashes goes through [`domain_hash`]: BLAKE3 in
//! `derive_key` mode with a context string, fed length-framed parts.
//!
//! Two properties matter and both are by construction:
//!
//! - **Domain separation.** `derive_key` mixes the context into the IV, so
//!   a portfolio id and a permit digest over the same bytes can never
//!   collide. Don't prepend a tag manually — that's what amateurs do.
//! - **Unambiguous framing.** Each part is prefixed with its byte length,
//!   so `["ab", "c"]` and `["a", "bc"]` hash differently. Concatenation
//!   ambiguity is how real systems get forged ids.

/// Domain-separated hash of a sequence of length-framed parts.
///
/// Each part is fed as `len (u32 LE) || bytes`, so both the part boundaries
/// and their order are part of the image. Deterministic, collision-resistant,
/// position-sensitive — exactly what a content address needs.
pub fn domain_hash(context: &str, parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    for part in parts {
        hasher.update(&(part.len() as u32).to_le_bytes());
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = domain_hash("ctx", &[b"hello", b"world"]);
        let b = domain_hash("ctx", &[b"hello", b"world"]);
        assert_eq!(a, b);
    }

    #[test]
    fn context_separates_domains() {
        let data: &[&[u8]] = &[b"same data"];
        assert_ne!(domain_hash("ctx-a", data), domain_hash("ctx-b", data));
    }

    #[test]
    fn part_order_matters() {
        let ab = domain_hash("ctx", &[b"a", b"b"]);
        let ba = domain_hash("ctx", &[b"b", b"a"]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn framing_prevents_boundary_shifting() {
        // Same concatenated bytes, different part boundaries.
        let one = domain_hash("ctx", &[b"ab", b"c"]);
        let two = domain_hash("ctx", &[b"a", b"bc"]);
        assert_ne!(one, two);
    }

    #[test]
    fn empty_parts_are_distinct_from_no_parts() {
        let none = domain_hash("ctx", &[]);
        let empty = domain_hash("ctx", &[b""]);
        assert_ne!(none, empty);
    }
}
