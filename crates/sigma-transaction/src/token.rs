//! Token metadata (EIP-4 registers as reported by the node).

use serde::{Deserialize, Serialize};

use sigma_primitives::amount::denormalize;
use sigma_primitives::TokenId;

/// Descriptive data about a token, fetched once per distribution run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Token identifier.
    pub id: TokenId,
    /// Display name.
    pub name: String,
    /// Number of decimal places of the display unit.
    pub decimals: u32,
    /// Amount minted, in smallest units. Informational only.
    #[serde(default)]
    pub emission_amount: Option<u64>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
}

impl TokenMetadata {
    /// Fallback metadata for a token the node knows nothing about: zero decimals.
    pub fn unknown(id: TokenId) -> Self {
        Self {
            id,
            name: "Unknown Token".to_string(),
            decimals: 0,
            emission_amount: None,
            description: None,
        }
    }

    /// Render `units` smallest units in display form, e.g. `"10.5"`.
    pub fn format_amount(&self, units: u64) -> String {
        denormalize(units, self.decimals).to_string()
    }
}
