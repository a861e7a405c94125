/// Unified error type for all primitives operations.
///
/// Covers amount parsing and scaling, address decoding, and identifier encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrimitivesError {
    #[error("amount {amount} has more fractional digits than {decimals} decimal places allow")]
    Precision { amount: String, decimals: u32 },

    #[error("invalid amount '{amount}': {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("amount {0} exceeds the on-chain value range")]
    AmountOverflow(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("address belongs to {found}, expected {expected}")]
    NetworkMismatch { expected: String, found: String },

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid identifier length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

impl PrimitivesError {
    /// True for the address-format family of errors.
    pub fn is_address_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAddress(_)
                | Self::ChecksumMismatch
                | Self::NetworkMismatch { .. }
                | Self::InvalidBase58(_)
        )
    }
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
