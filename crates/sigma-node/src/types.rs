//! Node data types: configuration and REST API response structures.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use sigma_primitives::{BoxId, TokenId};
use sigma_transaction::{TokenMetadata, UtxoEntry};

use crate::error::NodeError;

/// Configuration for a [`NodeClient`](crate::NodeClient).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Base URL of the node REST API (e.g. `http://127.0.0.1:9053`).
    pub base_url: String,
    /// Value of the `api_key` header, required by wallet-protected endpoints.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9053".to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Subset of the node `/info` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    /// Node name.
    pub name: String,
    /// Network the node runs on (`mainnet` / `testnet`).
    #[serde(default)]
    pub network: Option<String>,
    /// Height of the best full block.
    #[serde(default)]
    pub full_height: Option<u64>,
    /// Node software version.
    #[serde(default)]
    pub app_version: Option<String>,
}

/// Confirmation status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStatus {
    /// Number of confirmations, zero while unconfirmed.
    pub confirmations: u64,
    /// Height of the including block, if mined.
    pub block_height: Option<u64>,
}

/// A token balance entry inside a box.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAsset {
    /// Token id (hex).
    pub token_id: String,
    /// Amount in smallest units.
    pub amount: u64,
}

/// A box as returned by the blockchain indexer endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeBox {
    /// Box id (hex).
    pub box_id: String,
    /// nanoERG held by the box.
    pub value: u64,
    /// Tokens held by the box.
    #[serde(default)]
    pub assets: Vec<NodeAsset>,
    /// Height at which the box was created.
    #[serde(default)]
    pub creation_height: Option<u64>,
}

impl TryFrom<NodeBox> for UtxoEntry {
    type Error = NodeError;

    fn try_from(raw: NodeBox) -> Result<Self, Self::Error> {
        let box_id = BoxId::from_hex(&raw.box_id)
            .map_err(|e| NodeError::InvalidResponse(format!("box id {}: {e}", raw.box_id)))?;
        let mut assets = BTreeMap::new();
        for asset in raw.assets {
            let token_id = TokenId::from_hex(&asset.token_id).map_err(|e| {
                NodeError::InvalidResponse(format!("token id {}: {e}", asset.token_id))
            })?;
            let held: &mut u64 = assets.entry(token_id).or_insert(0);
            *held = held.checked_add(asset.amount).ok_or_else(|| {
                NodeError::InvalidResponse(format!(
                    "box {}: token {} amount overflows",
                    raw.box_id, asset.token_id
                ))
            })?;
        }
        Ok(UtxoEntry {
            box_id,
            value: raw.value,
            assets,
        })
    }
}

/// Token information from `/blockchain/token/byId/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTokenInfo {
    /// Token id (hex).
    pub id: String,
    /// Token name.
    #[serde(default)]
    pub name: Option<String>,
    /// Token description.
    #[serde(default)]
    pub description: Option<String>,
    /// Decimal places, absent for tokens minted without EIP-4 registers.
    #[serde(default)]
    pub decimals: Option<u32>,
    /// Amount minted.
    #[serde(default)]
    pub emission_amount: Option<u64>,
}

impl TryFrom<NodeTokenInfo> for TokenMetadata {
    type Error = NodeError;

    fn try_from(raw: NodeTokenInfo) -> Result<Self, Self::Error> {
        let id = TokenId::from_hex(&raw.id)
            .map_err(|e| NodeError::InvalidResponse(format!("token id {}: {e}", raw.id)))?;
        Ok(TokenMetadata {
            id,
            name: raw.name.unwrap_or_else(|| "Unknown Token".to_string()),
            decimals: raw.decimals.unwrap_or(0),
            emission_amount: raw.emission_amount,
            description: raw.description,
        })
    }
}

/// Transaction lookup result from `/blockchain/transaction/byId/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTransaction {
    /// Transaction id.
    pub id: String,
    /// Confirmations so far.
    #[serde(default)]
    pub num_confirmations: Option<u64>,
    /// Height of the including block.
    #[serde(default)]
    pub inclusion_height: Option<u64>,
}

impl From<NodeTransaction> for TransactionStatus {
    fn from(raw: NodeTransaction) -> Self {
        Self {
            confirmations: raw.num_confirmations.unwrap_or(0),
            block_height: raw.inclusion_height,
        }
    }
}

/// Error body returned by the node on 4xx/5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// HTTP status code echoed in the body.
    pub error: u16,
    /// Short reason.
    pub reason: String,
    /// Longer explanation, if any.
    #[serde(default)]
    pub detail: Option<String>,
}
