//! Unspent boxes owned by the sender.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sigma_primitives::{BoxId, TokenId};

/// An unspent output available as a transaction input.
///
/// Entries are selected and spent whole; they are never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoEntry {
    /// Identifier of the box.
    pub box_id: BoxId,
    /// nanoERG held by the box.
    pub value: u64,
    /// Token balances held by the box, keyed by token id.
    #[serde(default)]
    pub assets: BTreeMap<TokenId, u64>,
}

impl UtxoEntry {
    /// A box holding only ERG.
    pub fn new(box_id: BoxId, value: u64) -> Self {
        Self {
            box_id,
            value,
            assets: BTreeMap::new(),
        }
    }

    /// Add `amount` of `token_id` to the box (builder style).
    pub fn with_token(mut self, token_id: TokenId, amount: u64) -> Self {
        *self.assets.entry(token_id).or_insert(0) += amount;
        self
    }

    /// Amount of `token_id` held, zero if absent.
    pub fn token_amount(&self, token_id: &TokenId) -> u64 {
        self.assets.get(token_id).copied().unwrap_or(0)
    }

    /// True if the box holds a non-zero amount of `token_id`.
    pub fn holds(&self, token_id: &TokenId) -> bool {
        self.token_amount(token_id) > 0
    }

    /// True if the box holds any token at all.
    pub fn has_assets(&self) -> bool {
        self.assets.values().any(|amount| *amount > 0)
    }

    /// True if the box holds any token other than `token_id`.
    pub fn has_other_assets(&self, token_id: &TokenId) -> bool {
        self.assets
            .iter()
            .any(|(id, amount)| id != token_id && *amount > 0)
    }
}
