//! 32-byte identifiers: token ids and box ids.
//!
//! Both are Blake2b256 digests on chain and travel as 64-character
//! lowercase hex strings in node responses and configuration files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PrimitivesError;

/// Byte length of every identifier in this module.
pub const DIGEST_LENGTH: usize = 32;

fn parse_digest(s: &str) -> Result<[u8; DIGEST_LENGTH], PrimitivesError> {
    let trimmed = s.trim();
    if trimmed.len() != DIGEST_LENGTH * 2 {
        return Err(PrimitivesError::InvalidLength {
            expected: DIGEST_LENGTH * 2,
            got: trimmed.len(),
        });
    }
    let bytes = hex::decode(trimmed)?;
    let mut out = [0u8; DIGEST_LENGTH];
    out.copy_from_slice(&bytes);
    Ok(out)
}

macro_rules! digest_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name([u8; DIGEST_LENGTH]);

        impl $name {
            /// Wrap raw digest bytes.
            pub const fn new(bytes: [u8; DIGEST_LENGTH]) -> Self {
                Self(bytes)
            }

            /// Parse from a 64-character hex string.
            pub fn from_hex(s: &str) -> Result<Self, PrimitivesError> {
                parse_digest(s).map(Self)
            }

            /// Lowercase hex encoding.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Raw digest bytes.
            pub fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = PrimitivesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

digest_id! {
    /// Identifier of a fungible token (the id of the box that minted it).
    TokenId
}

digest_id! {
    /// Identifier of a box (UTXO).
    BoxId
}
