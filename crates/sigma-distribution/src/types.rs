//! Distribution model: recipients as requested, and as resolved for payment.

use serde::{Deserialize, Serialize};

use sigma_primitives::amount::{erg_to_nanoerg, nanoerg_to_erg};
use sigma_primitives::{Address, DisplayAmount, PrimitivesError, TokenId};
use sigma_transaction::params::MIN_FEE;
use sigma_transaction::Payment;

/// One requested payment, exactly as supplied by the caller.
///
/// Address and amount stay textual until validation so that every malformed
/// entry can be reported against its position instead of failing the whole
/// document at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Position in the original recipient list.
    pub index: usize,
    /// Destination address (Base58).
    pub address: String,
    /// Amount in display units, e.g. `"10.5"`.
    pub amount: String,
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

/// A token distribution: what to pay, to whom, and how to batch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// Token being distributed.
    pub token_id: TokenId,
    /// Recipients in payment order.
    pub recipients: Vec<Recipient>,
    /// Miner fee per transaction, in ERG.
    pub fee_per_tx: DisplayAmount,
    /// Upper bound on recipients per transaction; the protocol cap applies when absent.
    #[serde(default)]
    pub batch_size: Option<usize>,
}

impl Distribution {
    /// An empty distribution of `token_id` with the default fee of 0.001 ERG.
    pub fn new(token_id: TokenId) -> Self {
        Self {
            token_id,
            recipients: Vec::new(),
            fee_per_tx: default_fee_per_tx(),
            batch_size: None,
        }
    }

    /// The same `amount` to every address, in the order given.
    pub fn airdrop<I, A>(token_id: TokenId, addresses: I, amount: &str) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let mut distribution = Self::new(token_id);
        for address in addresses {
            distribution.add_recipient(address, amount);
        }
        distribution
    }

    /// Set the per-transaction fee in ERG.
    pub fn with_fee(mut self, fee_per_tx: DisplayAmount) -> Self {
        self.fee_per_tx = fee_per_tx;
        self
    }

    /// Limit the number of recipients per transaction.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Append a recipient; its index is its position in the list.
    pub fn add_recipient(
        &mut self,
        address: impl Into<String>,
        amount: impl Into<String>,
    ) -> &mut Self {
        self.recipients.push(Recipient {
            index: self.recipients.len(),
            address: address.into(),
            amount: amount.into(),
            note: None,
        });
        self
    }

    /// Per-transaction fee in nanoERG.
    pub fn fee_nanoerg(&self) -> Result<u64, PrimitivesError> {
        erg_to_nanoerg(&self.fee_per_tx)
    }
}

/// The default miner fee per transaction, 0.001 ERG.
pub fn default_fee_per_tx() -> DisplayAmount {
    nanoerg_to_erg(MIN_FEE)
}

/// A recipient whose address and amount passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRecipient {
    /// Position in the original recipient list.
    pub index: usize,
    /// Parsed destination address.
    pub address: Address,
    /// Requested amount in display units.
    pub amount: DisplayAmount,
    /// Requested amount in the token's smallest unit.
    pub units: u64,
    /// Free-text note carried through for reporting.
    pub note: Option<String>,
}

impl ResolvedRecipient {
    /// The payment this recipient receives.
    pub fn payment(&self) -> Payment {
        Payment {
            recipient_index: self.index,
            address: self.address.clone(),
            amount: self.units,
        }
    }
}
