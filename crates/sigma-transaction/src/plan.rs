//! Fully resolved transaction plans.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::json;

use sigma_primitives::{BoxId, TokenId};

use crate::output::PlannedOutput;
use crate::utxo::UtxoEntry;
use crate::TransactionError;

/// The complete description of one transaction: inputs, one output per
/// payment, at most one change output, and the fee.
///
/// Plans are produced by [`PlanBuilder`](crate::PlanBuilder) and are
/// immutable afterwards; they are either handed to a signer as-is or
/// discarded. Deserializing a plan re-runs the conservation check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PlanParts")]
pub struct TransactionPlan {
    inputs: Vec<UtxoEntry>,
    outputs: Vec<PlannedOutput>,
    fee: u64,
}

#[derive(Deserialize)]
struct PlanParts {
    inputs: Vec<UtxoEntry>,
    outputs: Vec<PlannedOutput>,
    fee: u64,
}

impl TryFrom<PlanParts> for TransactionPlan {
    type Error = TransactionError;

    fn try_from(parts: PlanParts) -> Result<Self, Self::Error> {
        let plan = Self::new(parts.inputs, parts.outputs, parts.fee);
        plan.verify_conservation()?;
        Ok(plan)
    }
}

impl TransactionPlan {
    pub(crate) fn new(inputs: Vec<UtxoEntry>, outputs: Vec<PlannedOutput>, fee: u64) -> Self {
        Self { inputs, outputs, fee }
    }

    /// Boxes spent by this transaction.
    pub fn inputs(&self) -> &[UtxoEntry] {
        &self.inputs
    }

    /// All outputs, payments first, change last.
    pub fn outputs(&self) -> &[PlannedOutput] {
        &self.outputs
    }

    /// Miner fee in nanoERG.
    pub fn fee(&self) -> u64 {
        self.fee
    }

    /// Ids of the spent boxes, in input order.
    pub fn input_ids(&self) -> Vec<BoxId> {
        self.inputs.iter().map(|input| input.box_id).collect()
    }

    /// Payment outputs, in recipient order.
    pub fn payment_outputs(&self) -> impl Iterator<Item = &PlannedOutput> {
        self.outputs.iter().filter(|output| !output.change)
    }

    /// The change output, if any value was left over.
    pub fn change_output(&self) -> Option<&PlannedOutput> {
        self.outputs.iter().find(|output| output.change)
    }

    /// Indices of the recipients paid by this plan.
    pub fn recipient_indices(&self) -> Vec<usize> {
        self.payment_outputs()
            .filter_map(|output| output.recipient_index)
            .collect()
    }

    /// Sum of input nanoERG.
    pub fn input_value(&self) -> u64 {
        self.inputs.iter().map(|input| input.value).sum()
    }

    /// Sum of output nanoERG, change included, fee excluded.
    pub fn output_value(&self) -> u64 {
        self.outputs.iter().map(|output| output.value).sum()
    }

    /// nanoERG returned as change.
    pub fn change_value(&self) -> u64 {
        self.change_output().map_or(0, |output| output.value)
    }

    /// Amount of `token_id` spent from inputs.
    pub fn input_tokens(&self, token_id: &TokenId) -> u64 {
        self.inputs.iter().map(|input| input.token_amount(token_id)).sum()
    }

    /// Amount of `token_id` paid to recipients (change excluded).
    pub fn distributed_tokens(&self, token_id: &TokenId) -> u64 {
        self.payment_outputs()
            .map(|output| output.token_amount(token_id))
            .sum()
    }

    /// Amount of `token_id` returned as change.
    pub fn change_tokens(&self, token_id: &TokenId) -> u64 {
        self.change_output()
            .map_or(0, |output| output.token_amount(token_id))
    }

    /// Check that no ERG or token value is created or destroyed:
    /// `input ERG == output ERG + fee` and, for every token,
    /// `input amount == output amount`.
    pub fn verify_conservation(&self) -> Result<(), TransactionError> {
        let input_erg: u128 = self.inputs.iter().map(|i| u128::from(i.value)).sum();
        let output_erg: u128 = self.outputs.iter().map(|o| u128::from(o.value)).sum();
        if input_erg != output_erg + u128::from(self.fee) {
            return Err(TransactionError::ConservationViolated(format!(
                "inputs hold {input_erg} nanoERG but outputs plus fee hold {}",
                output_erg + u128::from(self.fee)
            )));
        }

        let token_ids: BTreeSet<&TokenId> = self
            .inputs
            .iter()
            .flat_map(|input| input.assets.keys())
            .chain(self.outputs.iter().flat_map(|output| output.assets.keys()))
            .collect();
        for token_id in token_ids {
            let spent: u128 = self
                .inputs
                .iter()
                .map(|input| u128::from(input.token_amount(token_id)))
                .sum();
            let created: u128 = self
                .outputs
                .iter()
                .map(|output| u128::from(output.token_amount(token_id)))
                .sum();
            if spent != created {
                return Err(TransactionError::ConservationViolated(format!(
                    "token {token_id}: inputs hold {spent}, outputs hold {created}"
                )));
            }
        }
        Ok(())
    }

    /// Unsigned transaction JSON for the signing collaborator: inputs by box,
    /// payment-request style outputs and the fee.
    pub fn to_unsigned_json(&self) -> serde_json::Value {
        let inputs: Vec<serde_json::Value> = self
            .inputs
            .iter()
            .map(|input| {
                let assets: Vec<serde_json::Value> = input
                    .assets
                    .iter()
                    .map(|(id, amount)| json!({ "tokenId": id.to_hex(), "amount": amount }))
                    .collect();
                json!({
                    "boxId": input.box_id.to_hex(),
                    "value": input.value,
                    "assets": assets,
                })
            })
            .collect();
        let outputs: Vec<serde_json::Value> =
            self.outputs.iter().map(PlannedOutput::to_request_json).collect();
        json!({
            "inputs": inputs,
            "dataInputs": [],
            "outputs": outputs,
            "fee": self.fee,
        })
    }
}
