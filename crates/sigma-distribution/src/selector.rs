//! UTXO selection over the sender's pool of unspent boxes.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use sigma_primitives::{BoxId, TokenId};
use sigma_transaction::{Asset, TransactionError, UtxoEntry};

/// What one transaction needs from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRequest {
    /// Token being paid out.
    pub token_id: TokenId,
    /// Smallest units of the token needed by the recipients.
    pub token_amount: u64,
    /// nanoERG needed by recipient outputs plus the fee.
    pub erg_amount: u64,
    /// nanoERG a change box must carry whenever one is produced.
    pub min_change_value: u64,
}

/// Unspent boxes available to a run.
///
/// Selected boxes leave the pool, so later batches of the same run can never
/// spend them again. Validation works on a clone and leaves the original
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoPool {
    entries: Vec<UtxoEntry>,
}

impl UtxoPool {
    /// A pool holding `entries`.
    pub fn new(entries: Vec<UtxoEntry>) -> Self {
        Self { entries }
    }

    /// Boxes still available.
    pub fn entries(&self) -> &[UtxoEntry] {
        &self.entries
    }

    /// Number of boxes still available.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no boxes are left.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if the box is still available.
    pub fn contains(&self, box_id: &BoxId) -> bool {
        self.entries.iter().any(|entry| entry.box_id == *box_id)
    }

    /// nanoERG across all available boxes.
    pub fn total_erg(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, entry| acc.saturating_add(entry.value))
    }

    /// Amount of `token_id` across all available boxes.
    pub fn total_tokens(&self, token_id: &TokenId) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, entry| acc.saturating_add(entry.token_amount(token_id)))
    }

    /// Return boxes to the pool, e.g. after a transaction was never signed.
    pub fn release(&mut self, entries: impl IntoIterator<Item = UtxoEntry>) {
        for entry in entries {
            if !self.contains(&entry.box_id) {
                self.entries.push(entry);
            }
        }
    }

    /// Choose and remove boxes covering `request`.
    ///
    /// Token-holding boxes are taken largest balance first until the token
    /// amount is covered. If they hold too little ERG, further boxes are added
    /// largest value first: plain ERG boxes, then boxes with unrelated tokens,
    /// then any remaining holders of the token. Whenever the selection would
    /// leave change, enough ERG is gathered to give the change box
    /// `min_change_value`.
    ///
    /// # Errors
    /// [`TransactionError::InsufficientFunds`] naming the short asset, with
    /// the pool's total holdings as `available`. The pool is unchanged on
    /// error.
    pub fn select(&mut self, request: &SelectionRequest) -> Result<Vec<UtxoEntry>, TransactionError> {
        let token_id = &request.token_id;

        let mut holders: Vec<usize> = (0..self.entries.len())
            .filter(|&i| self.entries[i].holds(token_id))
            .collect();
        holders.sort_by_key(|&i| {
            let entry = &self.entries[i];
            (Reverse(entry.token_amount(token_id)), Reverse(entry.value), entry.box_id)
        });

        let mut selected: Vec<usize> = Vec::new();
        let mut tokens: u128 = 0;
        for &i in &holders {
            if tokens >= u128::from(request.token_amount) {
                break;
            }
            tokens += u128::from(self.entries[i].token_amount(token_id));
            selected.push(i);
        }
        if tokens < u128::from(request.token_amount) {
            return Err(TransactionError::InsufficientFunds {
                asset: Asset::Token(*token_id),
                required: request.token_amount,
                available: self.total_tokens(token_id),
            });
        }

        let mut fallback: Vec<usize> = (0..self.entries.len())
            .filter(|i| !selected.contains(i))
            .collect();
        fallback.sort_by_key(|&i| {
            let entry = &self.entries[i];
            let rank = if !entry.has_assets() {
                0u8
            } else if !entry.holds(token_id) {
                1
            } else {
                2
            };
            (rank, Reverse(entry.value), entry.box_id)
        });
        let mut fallback = fallback.into_iter();

        let mut erg: u128 = selected.iter().map(|&i| u128::from(self.entries[i].value)).sum();
        let required_erg = u128::from(request.erg_amount);
        loop {
            let needs_change = tokens > u128::from(request.token_amount)
                || erg > required_erg
                || selected
                    .iter()
                    .any(|&i| self.entries[i].has_other_assets(token_id));
            let target = if needs_change {
                required_erg + u128::from(request.min_change_value)
            } else {
                required_erg
            };
            if erg >= target {
                break;
            }
            match fallback.next() {
                Some(i) => {
                    erg += u128::from(self.entries[i].value);
                    tokens += u128::from(self.entries[i].token_amount(token_id));
                    selected.push(i);
                }
                None => {
                    return Err(TransactionError::InsufficientFunds {
                        asset: Asset::Erg,
                        required: u64::try_from(target).unwrap_or(u64::MAX),
                        available: self.total_erg(),
                    });
                }
            }
        }

        let chosen: Vec<UtxoEntry> = selected.iter().map(|&i| self.entries[i].clone()).collect();
        let mut index = 0;
        self.entries.retain(|_| {
            let keep = !selected.contains(&index);
            index += 1;
            keep
        });
        Ok(chosen)
    }
}
