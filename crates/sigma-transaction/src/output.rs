//! Planned transaction outputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use sigma_primitives::{Address, TokenId};

/// One output of a [`TransactionPlan`](crate::TransactionPlan).
///
/// Payment outputs carry the index of the recipient they pay. The `change`
/// flag marks the single output that returns leftover value to the sender.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedOutput {
    /// Destination address.
    pub address: Address,
    /// nanoERG locked in the output.
    pub value: u64,
    /// Tokens locked in the output.
    pub assets: BTreeMap<TokenId, u64>,
    /// Position of the paid recipient in the original list, for payment outputs.
    pub recipient_index: Option<usize>,
    /// True for the change output.
    pub change: bool,
}

impl PlannedOutput {
    /// A payment of `amount` smallest units of `token_id` to a recipient.
    pub fn payment(
        address: Address,
        value: u64,
        token_id: TokenId,
        amount: u64,
        recipient_index: usize,
    ) -> Self {
        Self {
            address,
            value,
            assets: BTreeMap::from([(token_id, amount)]),
            recipient_index: Some(recipient_index),
            change: false,
        }
    }

    /// The change output returning leftover ERG and tokens to the sender.
    pub fn change(address: Address, value: u64, assets: BTreeMap<TokenId, u64>) -> Self {
        Self {
            address,
            value,
            assets,
            recipient_index: None,
            change: true,
        }
    }

    /// Amount of `token_id` locked in this output.
    pub fn token_amount(&self, token_id: &TokenId) -> u64 {
        self.assets.get(token_id).copied().unwrap_or(0)
    }

    /// Payment-request JSON understood by the node wallet API.
    pub fn to_request_json(&self) -> serde_json::Value {
        let assets: Vec<serde_json::Value> = self
            .assets
            .iter()
            .map(|(id, amount)| json!({ "tokenId": id.to_hex(), "amount": amount }))
            .collect();
        json!({
            "address": self.address.as_str(),
            "value": self.value,
            "assets": assets,
        })
    }
}
