//! Hash function primitives.
//!
//! Ergo uses Blake2b with a 256-bit digest for box ids, token ids,
//! transaction ids and address checksums.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Compute the Blake2b256 hash of the input data.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte digest.
pub fn blake2b256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake2b256_empty() {
        assert_eq!(
            hex::encode(blake2b256(b"")),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn test_blake2b256_is_deterministic() {
        assert_eq!(blake2b256(b"ergo"), blake2b256(b"ergo"));
        assert_ne!(blake2b256(b"ergo"), blake2b256(b"Ergo"));
    }
}
