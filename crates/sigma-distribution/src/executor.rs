//! Execution controller: sequential build, sign and submit of every batch.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use sigma_node::{NodeApi, NodeError};
use sigma_primitives::TokenId;
use sigma_transaction::{TokenMetadata, TransactionError, TransactionPlan};

use crate::error::DistributionError;
use crate::planner::{plan_batches, Batch};
use crate::selector::UtxoPool;
use crate::settings::EngineSettings;
use crate::signer::Signer;
use crate::types::Distribution;
use crate::validator::{self, prepare, ValidationReport};

/// Shared flag that stops a run before its next batch.
///
/// Batches already submitted stay submitted. The engine clears the flag when
/// a run ends, so a cancellation applies to one run only.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// A flag that is not set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear a pending cancellation.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Why a batch was not paid.
#[derive(Debug, thiserror::Error)]
pub enum BatchFailure {
    /// The pool could not fund the batch.
    #[error("funding failed: {0}")]
    Funding(TransactionError),

    /// The signer refused or timed out.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Submission failed or timed out.
    #[error("submission failed: {0}")]
    Network(NodeError),
}

/// What happened to one batch.
#[derive(Debug)]
pub enum BatchOutcome {
    /// Accepted by the node.
    Submitted {
        /// Transaction id returned by the node.
        tx_id: String,
    },
    /// Attempted and failed.
    Failed(BatchFailure),
    /// Not attempted because the run was cancelled.
    Skipped,
}

/// Result of one batch of a live run.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Position of the batch in the run.
    pub batch_index: usize,
    /// Original indices of the recipients in the batch.
    pub recipients: Vec<usize>,
    /// The plan that was signed, if one was built.
    pub plan: Option<TransactionPlan>,
    /// Outcome.
    pub outcome: BatchOutcome,
}

impl ExecutionResult {
    /// Transaction id, if the batch was submitted.
    pub fn tx_id(&self) -> Option<&str> {
        match &self.outcome {
            BatchOutcome::Submitted { tx_id } => Some(tx_id),
            _ => None,
        }
    }

    /// True if the batch was submitted.
    pub fn is_submitted(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Submitted { .. })
    }

    /// True if the batch was attempted and failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Failed(_))
    }
}

/// Payment state of a single recipient after a live run.
#[derive(Debug, Clone, Copy)]
pub enum PaymentStatus<'a> {
    /// Paid by the transaction with this id.
    Paid(&'a str),
    /// Its batch failed.
    Failed(&'a BatchFailure),
    /// Its batch was never attempted.
    NotAttempted,
}

/// Overall status of a live run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every batch was submitted.
    Completed,
    /// At least one batch submitted and at least one failed.
    PartialFailure,
    /// No batch was submitted.
    Failed,
    /// Cancellation stopped the run early.
    Cancelled,
}

/// Outcome of a live run: one result per batch, in order.
#[derive(Debug)]
pub struct DistributionReport {
    /// Token metadata used.
    pub token: TokenMetadata,
    /// One entry per batch, whether or not earlier batches failed.
    pub results: Vec<ExecutionResult>,
    /// Non-fatal observations made while preparing the run.
    pub warnings: Vec<String>,
}

impl DistributionReport {
    /// Batches submitted.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_submitted()).count()
    }

    /// Batches attempted and failed.
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }

    /// Batches skipped after cancellation.
    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, BatchOutcome::Skipped))
            .count()
    }

    /// Overall status.
    pub fn status(&self) -> RunStatus {
        if self.skipped() > 0 {
            RunStatus::Cancelled
        } else if self.failed() == 0 {
            RunStatus::Completed
        } else if self.succeeded() > 0 {
            RunStatus::PartialFailure
        } else {
            RunStatus::Failed
        }
    }

    /// Ids of submitted transactions, in batch order.
    pub fn transaction_ids(&self) -> Vec<&str> {
        self.results.iter().filter_map(ExecutionResult::tx_id).collect()
    }

    /// Payment state of recipient `index`, or `None` if no batch contains it.
    pub fn payment_for(&self, index: usize) -> Option<PaymentStatus<'_>> {
        let result = self.results.iter().find(|r| r.recipients.contains(&index))?;
        Some(match &result.outcome {
            BatchOutcome::Submitted { tx_id } => PaymentStatus::Paid(tx_id),
            BatchOutcome::Failed(failure) => PaymentStatus::Failed(failure),
            BatchOutcome::Skipped => PaymentStatus::NotAttempted,
        })
    }

    /// Original indices of recipients whose batch was not submitted.
    pub fn unpaid_recipients(&self) -> Vec<usize> {
        self.results
            .iter()
            .filter(|r| !r.is_submitted())
            .flat_map(|r| r.recipients.iter().copied())
            .collect()
    }

    /// `Ok(self)` if every batch was submitted, otherwise the matching error.
    pub fn into_result(self) -> Result<Self, DistributionError> {
        let (succeeded, failed, skipped) = (self.succeeded(), self.failed(), self.skipped());
        match self.status() {
            RunStatus::Completed => Ok(self),
            RunStatus::PartialFailure => Err(DistributionError::PartialFailure { succeeded, failed }),
            RunStatus::Failed => Err(DistributionError::AllBatchesFailed { failed }),
            RunStatus::Cancelled => Err(DistributionError::Cancelled {
                submitted: succeeded,
                skipped,
            }),
        }
    }
}

/// Dry run or live submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Build and report every transaction without signing or submitting.
    #[default]
    DryRun,
    /// Sign and submit every batch.
    Live,
}

/// Result of [`DistributionEngine::distribute`].
#[derive(Debug)]
pub enum RunOutcome {
    /// Report of a dry run.
    DryRun(ValidationReport),
    /// Results of a live run.
    Live(DistributionReport),
}

/// Drives distributions against a node and a signer.
#[derive(Debug)]
pub struct DistributionEngine<N, S> {
    node: N,
    signer: S,
    settings: EngineSettings,
    cancellation: CancellationFlag,
}

impl<N: NodeApi, S: Signer> DistributionEngine<N, S> {
    /// Create an engine.
    pub fn new(node: N, signer: S, settings: EngineSettings) -> Self {
        Self {
            node,
            signer,
            settings,
            cancellation: CancellationFlag::new(),
        }
    }

    /// The engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The node collaborator.
    pub fn node(&self) -> &N {
        &self.node
    }

    /// A handle that cancels the current run, or the next one if none is in
    /// progress.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// Dry-run or execute `distribution`.
    pub async fn distribute(
        &self,
        distribution: &Distribution,
        mode: RunMode,
    ) -> Result<RunOutcome, DistributionError> {
        match mode {
            RunMode::DryRun => self.validate(distribution).await.map(RunOutcome::DryRun),
            RunMode::Live => self.execute(distribution).await.map(RunOutcome::Live),
        }
    }

    /// Fetch metadata and boxes, then plan every batch without submitting.
    pub async fn validate(&self, distribution: &Distribution) -> Result<ValidationReport, DistributionError> {
        let (token, warnings) = self.fetch_token(&distribution.token_id).await?;
        let pool = self.fetch_pool().await?;
        validator::validate(distribution, &token, &pool, &self.settings, warnings)
    }

    /// Build, sign and submit every batch in order.
    ///
    /// A failing batch is recorded and the run moves on; the report lists one
    /// result per batch. Fails before any submission if the distribution does
    /// not validate or the node cannot supply metadata or boxes.
    pub async fn execute(&self, distribution: &Distribution) -> Result<DistributionReport, DistributionError> {
        let outcome = self.run(distribution).await;
        self.cancellation.reset();
        outcome
    }

    async fn run(&self, distribution: &Distribution) -> Result<DistributionReport, DistributionError> {
        let (token, warnings) = self.fetch_token(&distribution.token_id).await?;
        let mut pool = self.fetch_pool().await?;

        let prepared = prepare(distribution, &token, &self.settings, warnings)?;
        if !prepared.issues.is_empty() {
            for issue in &prepared.issues {
                error!(%issue, "distribution rejected");
            }
            return Err(DistributionError::Invalid(prepared.issues));
        }

        let batches = plan_batches(&prepared.recipients, prepared.batch_size);
        let total = batches.len();
        info!(
            token = %token.id,
            recipients = prepared.recipients.len(),
            batches = total,
            total_erg = %prepared.cost.total_erg_display(),
            "starting distribution"
        );

        let mut results = Vec::with_capacity(total);
        let mut reached_node = false;
        for batch in &batches {
            let cancelled = self.cancellation.is_cancelled();
            if reached_node && !cancelled && !self.settings.inter_batch_delay.is_zero() {
                debug!(delay = ?self.settings.inter_batch_delay, "pausing between batches");
                sleep(self.settings.inter_batch_delay).await;
            }
            if cancelled || self.cancellation.is_cancelled() {
                warn!(batch = batch.index + 1, total, "run cancelled, skipping batch");
                results.push(ExecutionResult {
                    batch_index: batch.index,
                    recipients: batch.recipient_indices(),
                    plan: None,
                    outcome: BatchOutcome::Skipped,
                });
                continue;
            }

            info!(batch = batch.index + 1, total, recipients = batch.len(), "processing batch");
            let result = self
                .run_batch(batch, token.id, prepared.fee, &mut pool)
                .await;
            match &result.outcome {
                BatchOutcome::Submitted { tx_id } => {
                    info!(batch = batch.index + 1, total, %tx_id, "batch submitted");
                }
                BatchOutcome::Failed(failure) => {
                    error!(batch = batch.index + 1, total, %failure, "batch failed");
                }
                BatchOutcome::Skipped => {}
            }
            reached_node = matches!(
                result.outcome,
                BatchOutcome::Submitted { .. } | BatchOutcome::Failed(BatchFailure::Network(_))
            );
            results.push(result);
        }

        let report = DistributionReport {
            token,
            results,
            warnings: prepared.warnings,
        };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            skipped = report.skipped(),
            "distribution finished"
        );
        Ok(report)
    }

    async fn run_batch(
        &self,
        batch: &Batch,
        token_id: TokenId,
        fee: u64,
        pool: &mut UtxoPool,
    ) -> ExecutionResult {
        let mut result = ExecutionResult {
            batch_index: batch.index,
            recipients: batch.recipient_indices(),
            plan: None,
            outcome: BatchOutcome::Skipped,
        };

        let plan = match batch.build_plan(
            token_id,
            &self.settings.sender,
            fee,
            self.settings.min_box_value,
            pool,
        ) {
            Ok(plan) => plan,
            Err(e) => {
                result.outcome = BatchOutcome::Failed(BatchFailure::Funding(e));
                return result;
            }
        };
        debug!(
            batch = batch.index + 1,
            inputs = ?plan.input_ids(),
            change = plan.change_value(),
            "inputs selected"
        );

        let signed = match timeout(self.settings.call_timeout, self.signer.sign(&plan)).await {
            Ok(Ok(signed)) => signed,
            Ok(Err(e)) => {
                pool.release(plan.inputs().to_vec());
                result.plan = Some(plan);
                result.outcome = BatchOutcome::Failed(BatchFailure::Signing(e.to_string()));
                return result;
            }
            Err(_) => {
                pool.release(plan.inputs().to_vec());
                result.plan = Some(plan);
                result.outcome = BatchOutcome::Failed(BatchFailure::Signing("signer timed out".to_string()));
                return result;
            }
        };

        result.outcome = match self.call(self.node.submit_transaction(&signed)).await {
            Ok(tx_id) => BatchOutcome::Submitted { tx_id },
            Err(e) => {
                // A rejected transaction never spent its inputs; anything else may have.
                if matches!(e, NodeError::Rejected { .. }) {
                    pool.release(plan.inputs().to_vec());
                }
                BatchOutcome::Failed(BatchFailure::Network(e))
            }
        };
        result.plan = Some(plan);
        result
    }

    async fn fetch_token(&self, token_id: &TokenId) -> Result<(TokenMetadata, Vec<String>), DistributionError> {
        match self.call(self.node.token_info(token_id)).await? {
            Some(token) => {
                debug!(token = %token.id, name = %token.name, decimals = token.decimals, "token metadata");
                Ok((token, Vec::new()))
            }
            None => {
                warn!(token = %token_id, "token metadata unavailable, assuming 0 decimals");
                Ok((
                    TokenMetadata::unknown(*token_id),
                    vec![format!("metadata for token {token_id} unavailable; assuming 0 decimals")],
                ))
            }
        }
    }

    async fn fetch_pool(&self) -> Result<UtxoPool, DistributionError> {
        let entries = self.call(self.node.unspent_outputs(&self.settings.sender)).await?;
        debug!(sender = %self.settings.sender, boxes = entries.len(), "fetched sender boxes");
        Ok(UtxoPool::new(entries))
    }

    async fn call<T>(&self, fut: impl Future<Output = Result<T, NodeError>>) -> Result<T, NodeError> {
        timeout(self.settings.call_timeout, fut)
            .await
            .unwrap_or(Err(NodeError::Timeout))
    }
}
