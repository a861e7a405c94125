//! Base58 encoding and decoding with Ergo's checksum.
//!
//! Raw Base58 uses the Bitcoin alphabet. The checked variant appends the
//! first 4 bytes of Blake2b256(payload), which is how Ergo addresses are
//! protected against typos.

use crate::hash::blake2b256;
use crate::PrimitivesError;

/// Length of the checksum appended by [`check_encode`].
pub const CHECKSUM_LENGTH: usize = 4;

/// Encode a byte slice to a Base58 string.
///
/// Leading zero bytes are encoded as leading '1' characters.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Base58 string to a byte vector.
///
/// # Returns
/// `Ok(Vec<u8>)` on success, or an error for invalid characters.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Encode a payload with a 4-byte Blake2b256 checksum appended.
pub fn check_encode(data: &[u8]) -> String {
    let checksum = blake2b256(data);
    let mut payload = data.to_vec();
    payload.extend_from_slice(&checksum[..CHECKSUM_LENGTH]);
    encode(&payload)
}

/// Decode a checked Base58 string, verifying the trailing checksum.
///
/// # Returns
/// `Ok(Vec<u8>)` of the payload (without checksum) on success, or an
/// error for invalid encoding or checksum mismatch.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let decoded = decode(s)?;
    if decoded.len() <= CHECKSUM_LENGTH {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    let (payload, checksum) = decoded.split_at(decoded.len() - CHECKSUM_LENGTH);
    let expected = blake2b256(payload);
    if checksum != &expected[..CHECKSUM_LENGTH] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58_empty_string() {
        assert_eq!(encode(&[]), "");
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn test_base58_leading_zeros() {
        assert_eq!(encode(&[0, 0, 1]), "112");
        assert_eq!(decode("112").unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn test_base58_rejects_ambiguous_characters() {
        assert!(matches!(decode("0OIl"), Err(PrimitivesError::InvalidBase58(_))));
    }

    #[test]
    fn test_check_roundtrip() {
        let payload = [0x01, 0xde, 0xad, 0xbe, 0xef];
        let encoded = check_encode(&payload);
        assert_eq!(check_decode(&encoded).unwrap(), payload.to_vec());
    }

    #[test]
    fn test_check_decode_detects_corruption() {
        let mut raw = decode(&check_encode(&[0x01, 0x02, 0x03])).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xff;
        assert_eq!(check_decode(&encode(&raw)), Err(PrimitivesError::ChecksumMismatch));
    }

    #[test]
    fn test_check_decode_too_short() {
        assert!(check_decode(&encode(&[1, 2, 3])).is_err());
    }
}
