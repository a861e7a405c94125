use std::fmt;

use sigma_primitives::{PrimitivesError, TokenId};

/// The value dimension a shortfall refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Asset {
    /// Native ERG, counted in nanoERG.
    Erg,
    /// A token, counted in its smallest unit.
    Token(TokenId),
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Erg => write!(f, "ERG"),
            Self::Token(id) => write!(f, "token {id}"),
        }
    }
}

fn shortfall_of(required: &u64, available: &u64) -> u64 {
    required.saturating_sub(*available)
}

/// Error types for transaction planning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    /// The funding boxes cannot cover the requested amount of `asset`.
    #[error(
        "insufficient {asset}: required {required}, available {available}, short by {}",
        shortfall_of(.required, .available)
    )]
    InsufficientFunds {
        /// Which dimension is short.
        asset: Asset,
        /// Amount needed.
        required: u64,
        /// Amount available.
        available: u64,
    },
    /// Leftover ERG would create a change box below the protocol minimum.
    #[error("change of {change} nanoERG is below the minimum box value {min_box_value}")]
    DustChange {
        /// Leftover nanoERG.
        change: u64,
        /// Minimum value of a box.
        min_box_value: u64,
    },
    /// A built plan creates or destroys value.
    #[error("value not conserved: {0}")]
    ConservationViolated(String),
    /// The plan request is structurally invalid (no payments, zero amount, ...).
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
    /// An underlying primitives error.
    #[error("primitives error: {0}")]
    Primitives(#[from] PrimitivesError),
}

impl TransactionError {
    /// The missing dimension and amount, for insufficient-funds errors.
    pub fn shortfall(&self) -> Option<(&Asset, u64)> {
        match self {
            Self::InsufficientFunds { asset, required, available } => {
                Some((asset, required.saturating_sub(*available)))
            }
            _ => None,
        }
    }
}
