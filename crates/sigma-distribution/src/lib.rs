#![deny(missing_docs)]
//! Batch token distribution for Ergo.
//!
//! Pays a list of recipients in one or more transactions:
//!
//! 1. Recipients are validated and their display amounts normalised to the
//!    token's smallest unit ([`validator`])
//! 2. They are split front to back into batches no larger than a transaction
//!    can carry ([`planner`])
//! 3. Each batch is funded from the sender's unspent boxes ([`selector`]) and
//!    built into a conserving [`TransactionPlan`](sigma_transaction::TransactionPlan)
//! 4. A dry run stops there and reports; a live run signs and submits each
//!    batch in order, recording one result per batch ([`executor`])

pub mod config;
pub mod error;
pub mod executor;
pub mod planner;
pub mod selector;
pub mod settings;
pub mod signer;
pub mod types;
pub mod validator;

pub use config::DistributionConfig;
pub use error::DistributionError;
pub use executor::{
    BatchFailure, BatchOutcome, CancellationFlag, DistributionEngine, DistributionReport,
    ExecutionResult, PaymentStatus, RunMode, RunOutcome, RunStatus,
};
pub use planner::{estimate_cost, plan_batches, Batch, CostEstimate};
pub use selector::{SelectionRequest, UtxoPool};
pub use settings::EngineSettings;
pub use signer::{Signer, SigningError};
pub use types::{Distribution, Recipient, ResolvedRecipient};
pub use validator::{IssueKind, ValidationIssue, ValidationReport};
