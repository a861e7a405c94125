//! Ergo SDK - Primitives shared by the transaction and distribution crates.
//!
//! This crate provides the foundational building blocks:
//! - Exact fixed-point amounts (display units <-> smallest units)
//! - ERG / nanoERG conversion
//! - Blake2b256 hashing
//! - Base58 encoding with Ergo's Blake2b256 checksum
//! - Ergo address parsing and validation
//! - 32-byte identifiers for tokens and boxes

pub mod amount;
pub mod address;
pub mod base58;
pub mod hash;
pub mod id;

mod error;
pub use error::PrimitivesError;
pub use amount::{denormalize, normalize, DisplayAmount};
pub use address::{Address, AddressType, Network};
pub use id::{BoxId, TokenId};
