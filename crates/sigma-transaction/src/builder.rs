//! Transaction plan builder.
//!
//! Turns a list of token payments and the boxes selected to fund them into a
//! [`TransactionPlan`]:
//!
//! 1. One output per payment carrying `min_box_value` nanoERG and the payment amount
//! 2. One change output with leftover ERG and tokens, only if something is left
//! 3. One fee allocation taken from input ERG
//! 4. A conservation check on the result

use std::collections::BTreeMap;

use sigma_primitives::{Address, TokenId};

use crate::error::Asset;
use crate::output::PlannedOutput;
use crate::params::{MIN_BOX_VALUE, MIN_FEE};
use crate::plan::TransactionPlan;
use crate::utxo::UtxoEntry;
use crate::TransactionError;

/// A single token payment to one recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payment {
    /// Position of the recipient in the original distribution list.
    pub recipient_index: usize,
    /// Recipient address.
    pub address: Address,
    /// Amount in the token's smallest unit.
    pub amount: u64,
}

/// Builder for a single-token payment transaction.
#[derive(Clone, Debug)]
pub struct PlanBuilder {
    token_id: TokenId,
    change_address: Address,
    fee: u64,
    min_box_value: u64,
    payments: Vec<Payment>,
    inputs: Vec<UtxoEntry>,
}

impl PlanBuilder {
    /// Start a plan paying out `token_id`, returning change to `change_address`.
    ///
    /// Fee and minimum box value default to [`MIN_FEE`] and [`MIN_BOX_VALUE`].
    pub fn new(token_id: TokenId, change_address: Address) -> Self {
        Self {
            token_id,
            change_address,
            fee: MIN_FEE,
            min_box_value: MIN_BOX_VALUE,
            payments: Vec::new(),
            inputs: Vec::new(),
        }
    }

    /// Set the miner fee in nanoERG.
    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    /// Set the nanoERG carried by every payment output.
    pub fn with_min_box_value(mut self, min_box_value: u64) -> Self {
        self.min_box_value = min_box_value;
        self
    }

    /// Append a payment; outputs keep the order payments were added in.
    pub fn add_payment(&mut self, payment: Payment) -> &mut Self {
        self.payments.push(payment);
        self
    }

    /// Append a funding box.
    pub fn add_input(&mut self, input: UtxoEntry) -> &mut Self {
        self.inputs.push(input);
        self
    }

    /// nanoERG needed before change: one minimum box per payment plus the fee.
    pub fn required_erg(&self) -> Option<u64> {
        (self.payments.len() as u64)
            .checked_mul(self.min_box_value)?
            .checked_add(self.fee)
    }

    /// Smallest units of the distributed token needed by all payments.
    pub fn required_tokens(&self) -> Option<u64> {
        self.payments
            .iter()
            .try_fold(0u64, |acc, payment| acc.checked_add(payment.amount))
    }

    /// Assemble and verify the plan.
    ///
    /// # Errors
    /// - [`TransactionError::InvalidPlan`] for an empty payment or input list,
    ///   a zero fee or a zero payment amount.
    /// - [`TransactionError::InsufficientFunds`] if inputs cannot cover the
    ///   payment boxes plus fee, or the distributed token total.
    /// - [`TransactionError::DustChange`] if leftover ERG cannot form a valid
    ///   change box.
    pub fn build(self) -> Result<TransactionPlan, TransactionError> {
        if self.payments.is_empty() {
            return Err(TransactionError::InvalidPlan("no payments".into()));
        }
        if self.inputs.is_empty() {
            return Err(TransactionError::InvalidPlan("no inputs".into()));
        }
        if self.fee == 0 {
            return Err(TransactionError::InvalidPlan("fee must be positive".into()));
        }
        if let Some(payment) = self.payments.iter().find(|p| p.amount == 0) {
            return Err(TransactionError::InvalidPlan(format!(
                "recipient {} has a zero amount",
                payment.recipient_index
            )));
        }

        let overflow = || TransactionError::InvalidPlan("amount overflow".into());
        let required_erg = self.required_erg().ok_or_else(overflow)?;
        let required_tokens = self.required_tokens().ok_or_else(overflow)?;

        let input_erg = self
            .inputs
            .iter()
            .try_fold(0u64, |acc, input| acc.checked_add(input.value))
            .ok_or_else(overflow)?;
        if input_erg < required_erg {
            return Err(TransactionError::InsufficientFunds {
                asset: Asset::Erg,
                required: required_erg,
                available: input_erg,
            });
        }

        // Every token on the inputs, summed per id.
        let mut leftover: BTreeMap<TokenId, u64> = BTreeMap::new();
        for input in &self.inputs {
            for (id, amount) in &input.assets {
                let slot = leftover.entry(*id).or_insert(0);
                *slot = slot.checked_add(*amount).ok_or_else(overflow)?;
            }
        }
        let input_tokens = leftover.get(&self.token_id).copied().unwrap_or(0);
        if input_tokens < required_tokens {
            return Err(TransactionError::InsufficientFunds {
                asset: Asset::Token(self.token_id),
                required: required_tokens,
                available: input_tokens,
            });
        }
        leftover.insert(self.token_id, input_tokens - required_tokens);
        leftover.retain(|_, amount| *amount > 0);

        let mut outputs: Vec<PlannedOutput> = self
            .payments
            .iter()
            .map(|payment| {
                PlannedOutput::payment(
                    payment.address.clone(),
                    self.min_box_value,
                    self.token_id,
                    payment.amount,
                    payment.recipient_index,
                )
            })
            .collect();

        let change_erg = input_erg - required_erg;
        if change_erg > 0 || !leftover.is_empty() {
            if change_erg < self.min_box_value {
                return Err(TransactionError::DustChange {
                    change: change_erg,
                    min_box_value: self.min_box_value,
                });
            }
            outputs.push(PlannedOutput::change(self.change_address, change_erg, leftover));
        }

        let plan = TransactionPlan::new(self.inputs, outputs, self.fee);
        plan.verify_conservation()?;
        Ok(plan)
    }
}
