#![deny(missing_docs)]

//! Ergo token distribution SDK.
//!
//! Re-exports all sigma components for convenient single-crate usage.

pub use sigma_distribution as distribution;
pub use sigma_node as node;
pub use sigma_primitives as primitives;
pub use sigma_transaction as transaction;

pub mod logging;
