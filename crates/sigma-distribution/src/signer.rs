//! Signing collaborator.

use std::future::Future;

use sigma_transaction::{SignedTransaction, TransactionPlan};

/// Error returned by a [`Signer`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SigningError(pub String);

/// Turns transaction plans into signed transactions.
///
/// Implementors hold whatever keys they need; the engine only hands over the
/// plan. [`TransactionPlan::to_unsigned_json`] gives the unsigned form most
/// signers start from.
pub trait Signer {
    /// Sign `plan`.
    fn sign(
        &self,
        plan: &TransactionPlan,
    ) -> impl Future<Output = Result<SignedTransaction, SigningError>> + Send;
}
