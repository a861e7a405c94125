//! Ergo address handling.
//!
//! An encoded address is `Base58(prefix || content || checksum)` where
//! `prefix = network + address_type`, and `checksum` is the first four bytes
//! of Blake2b256(prefix || content).
//!
//! | Network | Byte   | First character |
//! |---------|--------|-----------------|
//! | Mainnet | `0x00` | `9` (P2PK)      |
//! | Testnet | `0x10` | `3` (P2PK)      |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::base58;
use crate::PrimitivesError;

/// Length of a compressed secp256k1 public key carried by a P2PK address.
const P2PK_CONTENT_LENGTH: usize = 33;
/// Length of the script hash prefix carried by a P2SH address.
const P2SH_CONTENT_LENGTH: usize = 24;

/// Ergo network type, encoded in the high nibble of the prefix byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Ergo mainnet (prefix `0x00`).
    Mainnet,
    /// Ergo testnet (prefix `0x10`).
    Testnet,
}

impl Network {
    fn prefix(self) -> u8 {
        match self {
            Self::Mainnet => 0x00,
            Self::Testnet => 0x10,
        }
    }

    fn from_prefix(byte: u8) -> Option<Self> {
        match byte & 0xf0 {
            0x00 => Some(Self::Mainnet),
            0x10 => Some(Self::Testnet),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "testnet"),
        }
    }
}

/// Ergo address type, encoded in the low nibble of the prefix byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressType {
    /// Pay-to-public-key.
    P2pk,
    /// Pay-to-script-hash.
    P2sh,
    /// Pay-to-script.
    P2s,
}

impl AddressType {
    fn code(self) -> u8 {
        match self {
            Self::P2pk => 0x01,
            Self::P2sh => 0x02,
            Self::P2s => 0x03,
        }
    }

    fn from_code(byte: u8) -> Option<Self> {
        match byte & 0x0f {
            0x01 => Some(Self::P2pk),
            0x02 => Some(Self::P2sh),
            0x03 => Some(Self::P2s),
            _ => None,
        }
    }
}

/// A decoded, checksum-verified Ergo address.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    encoded: String,
    network: Network,
    address_type: AddressType,
    content: Vec<u8>,
}

impl Address {
    /// Parse and validate an encoded address.
    ///
    /// Verifies the Base58 alphabet, the checksum, the network and type
    /// nibbles, and the content length for the address type.
    pub fn parse(addr: &str) -> Result<Self, PrimitivesError> {
        let addr = addr.trim();
        if addr.is_empty() {
            return Err(PrimitivesError::InvalidAddress("empty address".to_string()));
        }
        let payload = base58::check_decode(addr)?;
        let (&prefix, content) = payload
            .split_first()
            .ok_or_else(|| PrimitivesError::InvalidAddress(format!("'{addr}' has no prefix")))?;

        let network = Network::from_prefix(prefix).ok_or_else(|| {
            PrimitivesError::InvalidAddress(format!("unknown network prefix 0x{prefix:02x}"))
        })?;
        let address_type = AddressType::from_code(prefix).ok_or_else(|| {
            PrimitivesError::InvalidAddress(format!("unknown address type 0x{prefix:02x}"))
        })?;

        let length_ok = match address_type {
            AddressType::P2pk => content.len() == P2PK_CONTENT_LENGTH,
            AddressType::P2sh => content.len() == P2SH_CONTENT_LENGTH,
            AddressType::P2s => !content.is_empty(),
        };
        if !length_ok {
            return Err(PrimitivesError::InvalidAddress(format!(
                "'{addr}' has {} content bytes for {address_type:?}",
                content.len()
            )));
        }

        Ok(Self {
            encoded: addr.to_string(),
            network,
            address_type,
            content: content.to_vec(),
        })
    }

    /// Parse an address and require it to belong to `expected`.
    pub fn parse_for_network(addr: &str, expected: Network) -> Result<Self, PrimitivesError> {
        let address = Self::parse(addr)?;
        if address.network != expected {
            return Err(PrimitivesError::NetworkMismatch {
                expected: expected.to_string(),
                found: address.network.to_string(),
            });
        }
        Ok(address)
    }

    /// Encode an address from its parts.
    pub fn from_parts(
        network: Network,
        address_type: AddressType,
        content: &[u8],
    ) -> Result<Self, PrimitivesError> {
        let mut payload = Vec::with_capacity(content.len() + 1);
        payload.push(network.prefix() | address_type.code());
        payload.extend_from_slice(content);
        Self::parse(&base58::check_encode(&payload))
    }

    /// The encoded address string.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Network this address belongs to.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Type of the address.
    pub fn address_type(&self) -> AddressType {
        self.address_type
    }

    /// Address content: public key, script hash, or script bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encoded)
    }
}

impl FromStr for Address {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encoded)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAINNET_P2PK: &str = "9fRAWhdxEsTcdb8PhGNrZfwqa65zfkuYHAMmkQLcic1gdLSV5vA";
    const TESTNET_P2PK: &str = "3WvsT2Gm4EpsM9Pg18PdY6XyhNNMqXDsvJTbbf6ihLvAmSb7u5RN";

    #[test]
    fn test_parse_mainnet_p2pk() {
        let addr = Address::parse(MAINNET_P2PK).unwrap();
        assert_eq!(addr.network(), Network::Mainnet);
        assert_eq!(addr.address_type(), AddressType::P2pk);
        assert_eq!(
            hex::encode(addr.content()),
            "02764ea2b0b9b06b5730a4257bba71fd7797eb1ec12bc3ae6025a01d7fba53830e"
        );
        assert_eq!(addr.to_string(), MAINNET_P2PK);
    }

    #[test]
    fn test_parse_testnet_p2pk() {
        let addr = Address::parse(TESTNET_P2PK).unwrap();
        assert_eq!(addr.network(), Network::Testnet);
        assert_eq!(addr.address_type(), AddressType::P2pk);
    }

    #[test]
    fn test_from_parts_matches_known_encoding() {
        let addr = Address::from_parts(Network::Mainnet, AddressType::P2pk, &[0x02; 33]).unwrap();
        assert_eq!(addr.as_str(), "9eXwoWUnwhpPPWtVv71oJucXF2WVL1A4NjKzW4CDnFwa4iQrM8g");
        let testnet = Address::from_parts(Network::Testnet, AddressType::P2pk, &[0x03; 33]).unwrap();
        assert_eq!(testnet.as_str(), "3WxaHCrAQJFrgbyjpYms3AKy96esfyi17QkWfHxFwb4wij9njdbh");
    }

    #[test]
    fn test_checksum_mismatch() {
        // Last character altered.
        let corrupted = format!("{}w", &MAINNET_P2PK[..MAINNET_P2PK.len() - 1]);
        assert_eq!(Address::parse(&corrupted), Err(PrimitivesError::ChecksumMismatch));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Address::parse("").unwrap_err().is_address_error());
        assert!(Address::parse("9f...").unwrap_err().is_address_error());
        assert!(Address::parse("0OIl").unwrap_err().is_address_error());
    }

    #[test]
    fn test_rejects_wrong_p2pk_length() {
        let mut payload = vec![0x01];
        payload.extend_from_slice(&[0x02; 20]);
        let encoded = base58::check_encode(&payload);
        assert!(matches!(Address::parse(&encoded), Err(PrimitivesError::InvalidAddress(_))));
    }

    #[test]
    fn test_network_enforcement() {
        assert!(Address::parse_for_network(MAINNET_P2PK, Network::Mainnet).is_ok());
        assert_eq!(
            Address::parse_for_network(TESTNET_P2PK, Network::Mainnet),
            Err(PrimitivesError::NetworkMismatch {
                expected: "mainnet".to_string(),
                found: "testnet".to_string(),
            })
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let addr = Address::parse(MAINNET_P2PK).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
        assert!(serde_json::from_str::<Address>("\"not-an-address\"").is_err());
    }
}
