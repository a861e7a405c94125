//! Ergo SDK - Transaction planning.
//!
//! Provides the spendable-box model ([`UtxoEntry`]), token metadata, and the
//! [`PlanBuilder`] that turns a set of token payments plus funding boxes into
//! an immutable [`TransactionPlan`] with one output per payment, an optional
//! change output and a single fee allocation. Every plan is checked for value
//! conservation before it is returned.

pub mod builder;
pub mod output;
pub mod params;
pub mod plan;
pub mod signed;
pub mod token;
pub mod utxo;

mod error;
pub use builder::{Payment, PlanBuilder};
pub use error::{Asset, TransactionError};
pub use output::PlannedOutput;
pub use plan::TransactionPlan;
pub use signed::SignedTransaction;
pub use token::TokenMetadata;
pub use utxo::UtxoEntry;

#[cfg(test)]
mod tests;
