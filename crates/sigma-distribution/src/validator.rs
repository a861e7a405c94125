//! Pre-flight validation: the whole pipeline short of signing and submission.
//!
//! Recipient problems are collected, never fail-fast: every recipient with a
//! bad address or an unrepresentable amount gets its own [`ValidationIssue`].
//! Funding problems are reported per batch. The caller's pool is never
//! touched; plans are built against a private copy.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use sigma_primitives::{Address, DisplayAmount, Network, PrimitivesError};
use sigma_transaction::params::MIN_FEE;
use sigma_transaction::{TokenMetadata, TransactionPlan};

use crate::error::DistributionError;
use crate::planner::{effective_batch_size, estimate_cost, plan_batches, CostEstimate};
use crate::selector::UtxoPool;
use crate::settings::EngineSettings;
use crate::types::{Distribution, Recipient, ResolvedRecipient};

/// Category of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Address failed to decode, or belongs to another network.
    Address,
    /// Amount has more fractional digits than the token allows.
    Precision,
    /// Amount is malformed, zero or out of range.
    Amount,
    /// The per-transaction fee is unusable.
    Fee,
    /// The pool cannot fund a batch.
    Funding,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueKind::Address => "address",
            IssueKind::Precision => "precision",
            IssueKind::Amount => "amount",
            IssueKind::Fee => "fee",
            IssueKind::Funding => "funding",
        };
        f.write_str(name)
    }
}

/// One validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Original index of the offending recipient, if the issue concerns one.
    pub recipient: Option<usize>,
    /// Batch the issue concerns, for funding issues.
    pub batch: Option<usize>,
    /// Category.
    pub kind: IssueKind,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    fn recipient(index: usize, error: &PrimitivesError) -> Self {
        let kind = match error {
            PrimitivesError::Precision { .. } => IssueKind::Precision,
            e if e.is_address_error() => IssueKind::Address,
            _ => IssueKind::Amount,
        };
        Self {
            recipient: Some(index),
            batch: None,
            kind,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.recipient, self.batch) {
            (Some(index), _) => write!(f, "recipient {index}: {} error: {}", self.kind, self.message),
            (None, Some(batch)) => write!(f, "batch {batch}: {} error: {}", self.kind, self.message),
            (None, None) => write!(f, "{} error: {}", self.kind, self.message),
        }
    }
}

/// A batch as it would be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedBatch {
    /// Position of the batch in the run.
    pub index: usize,
    /// Original indices of the recipients paid.
    pub recipients: Vec<usize>,
    /// The transaction, or `None` if the batch could not be funded.
    pub plan: Option<TransactionPlan>,
}

/// Outcome of a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// True if the distribution could be executed as planned.
    pub valid: bool,
    /// Token metadata used, possibly the zero-decimal fallback.
    pub token: TokenMetadata,
    /// Recipients in the distribution.
    pub recipient_count: usize,
    /// Recipients per transaction after clamping.
    pub batch_size: usize,
    /// Transactions the distribution needs.
    pub batch_count: usize,
    /// Sum of valid recipient amounts, display units.
    pub total_amount: DisplayAmount,
    /// Sum of valid recipient amounts, smallest units.
    pub total_units: u64,
    /// nanoERG needed for recipient boxes and fees.
    pub total_erg_required: u64,
    /// nanoERG spent on fees.
    pub total_fees: u64,
    /// Errors; empty when `valid`.
    pub issues: Vec<ValidationIssue>,
    /// Non-fatal observations.
    pub warnings: Vec<String>,
    /// Planned transactions, in submission order. Empty if any recipient is invalid.
    pub batches: Vec<PlannedBatch>,
}

impl ValidationReport {
    /// Issues concerning recipient `index`.
    pub fn issues_for(&self, index: usize) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |issue| issue.recipient == Some(index))
    }

    /// Successfully planned transactions, in order.
    pub fn plans(&self) -> impl Iterator<Item = &TransactionPlan> {
        self.batches.iter().filter_map(|batch| batch.plan.as_ref())
    }
}

/// Parse and normalise every recipient, collecting one issue per problem.
///
/// Addresses must belong to `network`. Amounts must be positive and exactly
/// representable with `decimals` decimal places.
pub fn resolve_recipients(
    recipients: &[Recipient],
    decimals: u32,
    network: Network,
) -> (Vec<ResolvedRecipient>, Vec<ValidationIssue>) {
    let mut resolved = Vec::with_capacity(recipients.len());
    let mut issues = Vec::new();

    for recipient in recipients {
        let address = match Address::parse_for_network(&recipient.address, network) {
            Ok(address) => Some(address),
            Err(e) => {
                issues.push(ValidationIssue::recipient(recipient.index, &e));
                None
            }
        };
        let amount = match resolve_amount(&recipient.amount, decimals) {
            Ok(amount) => Some(amount),
            Err(e) => {
                issues.push(ValidationIssue::recipient(recipient.index, &e));
                None
            }
        };

        if let (Some(address), Some((amount, units))) = (address, amount) {
            resolved.push(ResolvedRecipient {
                index: recipient.index,
                address,
                amount,
                units,
                note: recipient.note.clone(),
            });
        }
    }

    (resolved, issues)
}

fn resolve_amount(text: &str, decimals: u32) -> Result<(DisplayAmount, u64), PrimitivesError> {
    let amount = DisplayAmount::parse(text)?;
    if amount.is_zero() {
        return Err(PrimitivesError::InvalidAmount {
            amount: text.to_string(),
            reason: "amount must be positive".to_string(),
        });
    }
    let units = amount.to_smallest_units(decimals)?;
    Ok((amount, units))
}

/// Recipients and parameters checked and ready for batching.
#[derive(Debug, Clone)]
pub(crate) struct Prepared {
    pub recipients: Vec<ResolvedRecipient>,
    pub fee: u64,
    pub batch_size: usize,
    pub total_units: u64,
    pub cost: CostEstimate,
    pub issues: Vec<ValidationIssue>,
    pub warnings: Vec<String>,
}

/// Everything a run checks before touching the pool.
pub(crate) fn prepare(
    distribution: &Distribution,
    token: &TokenMetadata,
    settings: &EngineSettings,
    mut warnings: Vec<String>,
) -> Result<Prepared, DistributionError> {
    if distribution.recipients.is_empty() {
        return Err(DistributionError::NoRecipients);
    }
    let mut issues = Vec::new();

    let fee = match distribution.fee_nanoerg() {
        Ok(0) => {
            issues.push(fee_issue("fee per transaction must be positive".to_string()));
            0
        }
        Ok(fee) => {
            if fee < MIN_FEE {
                warnings.push(format!(
                    "fee of {fee} nanoERG is below the usual minimum of {MIN_FEE}"
                ));
            }
            fee
        }
        Err(e) => {
            issues.push(fee_issue(e.to_string()));
            0
        }
    };

    let cap = settings.max_recipients_per_tx();
    let batch_size = effective_batch_size(distribution.batch_size, cap);
    if let Some(requested) = distribution.batch_size {
        if requested > cap {
            warnings.push(format!(
                "batch size {requested} exceeds the limit of {cap} recipients per transaction; using {cap}"
            ));
        }
    }

    let (recipients, recipient_issues) =
        resolve_recipients(&distribution.recipients, token.decimals, settings.network());
    issues.extend(recipient_issues);
    warnings.extend(duplicate_address_warnings(&recipients));

    let total_units = match recipients
        .iter()
        .try_fold(0u64, |acc, r| acc.checked_add(r.units))
    {
        Some(total) => total,
        None => {
            issues.push(ValidationIssue {
                recipient: None,
                batch: None,
                kind: IssueKind::Amount,
                message: "total amount exceeds the on-chain value range".to_string(),
            });
            u64::MAX
        }
    };

    let cost = estimate_cost(distribution.recipients.len(), batch_size, fee, settings.min_box_value)
        .ok_or_else(|| DistributionError::Config("ERG cost overflows".to_string()))?;

    Ok(Prepared {
        recipients,
        fee,
        batch_size,
        total_units,
        cost,
        issues,
        warnings,
    })
}

fn fee_issue(message: String) -> ValidationIssue {
    ValidationIssue {
        recipient: None,
        batch: None,
        kind: IssueKind::Fee,
        message,
    }
}

fn duplicate_address_warnings(recipients: &[ResolvedRecipient]) -> Vec<String> {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut warnings = Vec::new();
    for recipient in recipients {
        let address = recipient.address.as_str();
        match first_seen.get(address) {
            Some(first) => warnings.push(format!(
                "recipient {} repeats the address of recipient {first}; both are paid",
                recipient.index
            )),
            None => {
                first_seen.insert(address, recipient.index);
            }
        }
    }
    warnings
}

/// Dry-run `distribution` against `token` and a snapshot of `pool`.
///
/// `warnings` carries observations made while gathering inputs, such as a
/// metadata fallback. Fails only when there is nothing to validate.
pub fn validate(
    distribution: &Distribution,
    token: &TokenMetadata,
    pool: &UtxoPool,
    settings: &EngineSettings,
    warnings: Vec<String>,
) -> Result<ValidationReport, DistributionError> {
    let Prepared {
        recipients,
        fee,
        batch_size,
        total_units,
        cost,
        mut issues,
        warnings,
    } = prepare(distribution, token, settings, warnings)?;

    let mut batches = Vec::new();
    if issues.is_empty() {
        let mut snapshot = pool.clone();
        for batch in plan_batches(&recipients, batch_size) {
            let plan = match batch.build_plan(
                token.id,
                &settings.sender,
                fee,
                settings.min_box_value,
                &mut snapshot,
            ) {
                Ok(plan) => Some(plan),
                Err(e) => {
                    issues.push(ValidationIssue {
                        recipient: None,
                        batch: Some(batch.index),
                        kind: IssueKind::Funding,
                        message: e.to_string(),
                    });
                    None
                }
            };
            batches.push(PlannedBatch {
                index: batch.index,
                recipients: batch.recipient_indices(),
                plan,
            });
        }
    }

    Ok(ValidationReport {
        valid: issues.is_empty(),
        token: token.clone(),
        recipient_count: distribution.recipients.len(),
        batch_size,
        batch_count: cost.transactions,
        total_amount: DisplayAmount::from_smallest_units(total_units, token.decimals),
        total_units,
        total_erg_required: cost.total_erg,
        total_fees: cost.total_fees,
        issues,
        warnings,
        batches,
    })
}
