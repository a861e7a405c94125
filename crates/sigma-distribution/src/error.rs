//! Distribution error types.

use sigma_node::NodeError;
use sigma_primitives::PrimitivesError;
use sigma_transaction::TransactionError;

use crate::validator::ValidationIssue;

/// Errors that abort a distribution run or summarise its outcome.
///
/// Per-recipient and per-batch problems are not reported through this type
/// while a run is in progress; they are collected into the validation report
/// or the execution results instead.
#[derive(Debug, thiserror::Error)]
pub enum DistributionError {
    /// The distribution has no recipients.
    #[error("distribution has no recipients")]
    NoRecipients,

    /// The configuration document is malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// One or more recipients, or the fee, failed validation.
    #[error("distribution failed validation with {} issue(s)", .0.len())]
    Invalid(Vec<ValidationIssue>),

    /// Some batches were submitted and some failed.
    #[error("partial failure: {succeeded} batch(es) submitted, {failed} failed")]
    PartialFailure {
        /// Batches submitted successfully.
        succeeded: usize,
        /// Batches that failed.
        failed: usize,
    },

    /// Every batch failed.
    #[error("all {failed} batch(es) failed")]
    AllBatchesFailed {
        /// Batches that failed.
        failed: usize,
    },

    /// The run was cancelled before every batch was attempted.
    #[error("cancelled: {submitted} batch(es) submitted, {skipped} skipped")]
    Cancelled {
        /// Batches submitted before cancellation.
        submitted: usize,
        /// Batches never attempted.
        skipped: usize,
    },

    /// Node call failed before any batch was built.
    #[error(transparent)]
    Node(#[from] NodeError),

    /// Transaction planning error.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Primitives error.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),

    /// Reading or writing a configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
