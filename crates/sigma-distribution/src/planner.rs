//! Batch planning: sequential partitioning of recipients, cost estimates and
//! per-batch transaction plans.

use serde::{Deserialize, Serialize};

use sigma_primitives::amount::format_nanoerg;
use sigma_primitives::{Address, TokenId};
use sigma_transaction::{PlanBuilder, TransactionError, TransactionPlan};

use crate::selector::{SelectionRequest, UtxoPool};
use crate::types::ResolvedRecipient;

/// A contiguous run of recipients paid by one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    /// Position of the batch in the run, from zero.
    pub index: usize,
    /// Recipients in original order.
    pub recipients: Vec<ResolvedRecipient>,
}

impl Batch {
    /// Original indices of the recipients in this batch.
    pub fn recipient_indices(&self) -> Vec<usize> {
        self.recipients.iter().map(|r| r.index).collect()
    }

    /// Number of recipients.
    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    /// True if the batch pays nobody.
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    /// Select inputs from `pool` and build the transaction paying this batch.
    ///
    /// Selected inputs leave the pool. If the plan cannot be built they are
    /// returned before the error is.
    pub fn build_plan(
        &self,
        token_id: TokenId,
        change_address: &Address,
        fee: u64,
        min_box_value: u64,
        pool: &mut UtxoPool,
    ) -> Result<TransactionPlan, TransactionError> {
        let mut builder = PlanBuilder::new(token_id, change_address.clone())
            .with_fee(fee)
            .with_min_box_value(min_box_value);
        for recipient in &self.recipients {
            builder.add_payment(recipient.payment());
        }

        let overflow = || TransactionError::InvalidPlan("amount overflow".into());
        let request = SelectionRequest {
            token_id,
            token_amount: builder.required_tokens().ok_or_else(overflow)?,
            erg_amount: builder.required_erg().ok_or_else(overflow)?,
            min_change_value: min_box_value,
        };
        let inputs = pool.select(&request)?;
        for input in &inputs {
            builder.add_input(input.clone());
        }

        builder.build().map_err(|e| {
            pool.release(inputs);
            e
        })
    }
}

/// Batch size actually used: the requested size, never above `cap`.
pub fn effective_batch_size(requested: Option<usize>, cap: usize) -> usize {
    let cap = cap.max(1);
    requested.map_or(cap, |size| size.clamp(1, cap))
}

/// Split recipients front to back into batches of at most `batch_size`.
///
/// Concatenating the batches reproduces `recipients` exactly.
pub fn plan_batches(recipients: &[ResolvedRecipient], batch_size: usize) -> Vec<Batch> {
    recipients
        .chunks(batch_size.max(1))
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            recipients: chunk.to_vec(),
        })
        .collect()
}

/// ERG cost of a distribution before any box is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Recipients paid.
    pub recipients: usize,
    /// Recipients per transaction.
    pub batch_size: usize,
    /// Transactions needed.
    pub transactions: usize,
    /// Fee per transaction, nanoERG.
    pub fee_per_tx: u64,
    /// Fees across all transactions, nanoERG.
    pub total_fees: u64,
    /// nanoERG locked in recipient boxes.
    pub total_box_value: u64,
    /// Fees plus recipient boxes, nanoERG.
    pub total_erg: u64,
}

impl CostEstimate {
    /// Total cost formatted in ERG.
    pub fn total_erg_display(&self) -> String {
        format_nanoerg(self.total_erg)
    }
}

/// Estimate the ERG needed to pay `recipients` in batches of `batch_size`.
///
/// Returns `None` if the totals overflow.
pub fn estimate_cost(
    recipients: usize,
    batch_size: usize,
    fee_per_tx: u64,
    min_box_value: u64,
) -> Option<CostEstimate> {
    let batch_size = batch_size.max(1);
    let transactions = recipients.div_ceil(batch_size);
    let total_fees = (transactions as u64).checked_mul(fee_per_tx)?;
    let total_box_value = (recipients as u64).checked_mul(min_box_value)?;
    Some(CostEstimate {
        recipients,
        batch_size,
        transactions,
        fee_per_tx,
        total_fees,
        total_box_value,
        total_erg: total_fees.checked_add(total_box_value)?,
    })
}
