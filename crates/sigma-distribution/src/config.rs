//! The distribution configuration document.
//!
//! ```json
//! {
//!   "distribution": { "token_id": "<64 hex>", "batch_size": 50, "fee_per_tx": 0.001 },
//!   "recipients": [ { "address": "9f...", "amount": 100, "note": "team" } ]
//! }
//! ```
//!
//! Amounts may be written as JSON numbers or strings. Their text is kept as
//! written, so `10.125` is never turned into a binary float on the way in.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use sigma_primitives::{DisplayAmount, TokenId};

use crate::error::DistributionError;
use crate::types::{default_fee_per_tx, Distribution, Recipient};

/// An amount exactly as written in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AmountText(pub String);

impl AmountText {
    /// The amount text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AmountText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AmountText {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl Serialize for AmountText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match serde_json::Number::from_str(&self.0) {
            Ok(number) => number.serialize(serializer),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for AmountText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(number) => Ok(Self(number.to_string())),
            Value::String(text) => Ok(Self(text)),
            other => Err(serde::de::Error::custom(format!(
                "expected a number or a string amount, found {other}"
            ))),
        }
    }
}

/// The `distribution` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSection {
    /// Token to distribute, 64 hex characters.
    pub token_id: String,
    /// Recipients per transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    /// Miner fee per transaction, in ERG.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_per_tx: Option<AmountText>,
}

/// One entry of the `recipients` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientEntry {
    /// Destination address.
    pub address: String,
    /// Amount in display units.
    pub amount: AmountText,
    /// Free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A token distribution configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// Token and batching parameters.
    pub distribution: DistributionSection,
    /// Recipients in payment order.
    #[serde(default)]
    pub recipients: Vec<RecipientEntry>,
}

impl DistributionConfig {
    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, DistributionError> {
        serde_json::from_str(json).map_err(|e| DistributionError::Config(e.to_string()))
    }

    /// Read and parse a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DistributionError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, DistributionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// An example document to be filled in.
    pub fn template() -> Self {
        Self {
            distribution: DistributionSection {
                token_id: "your_token_id_here".to_string(),
                batch_size: Some(50),
                fee_per_tx: Some(AmountText::from("0.001")),
            },
            recipients: vec![
                RecipientEntry {
                    address: "9f...".to_string(),
                    amount: AmountText::from("100"),
                    note: Some("Recipient 1".to_string()),
                },
                RecipientEntry {
                    address: "9g...".to_string(),
                    amount: AmountText::from("200"),
                    note: Some("Recipient 2".to_string()),
                },
            ],
        }
    }

    /// Write [`template`](Self::template) to `path`.
    pub fn write_template(path: impl AsRef<Path>) -> Result<(), DistributionError> {
        let mut json = Self::template().to_json_string()?;
        json.push('\n');
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check the document's structure and convert it into a [`Distribution`].
    ///
    /// Only document-level problems fail here: token id, batch size, fee and
    /// an empty recipient list. Recipient addresses and amounts are checked by
    /// validation, which reports every bad entry at once.
    pub fn into_distribution(self) -> Result<Distribution, DistributionError> {
        let section = self.distribution;
        let token_id = parse_token_id(&section.token_id)?;

        if section.batch_size == Some(0) {
            return Err(DistributionError::Config("batch_size must be positive".to_string()));
        }

        let fee_per_tx = match &section.fee_per_tx {
            Some(text) => {
                let fee = DisplayAmount::parse(text.as_str())
                    .map_err(|e| DistributionError::Config(format!("fee_per_tx: {e}")))?;
                if fee.is_zero() {
                    return Err(DistributionError::Config("fee_per_tx must be positive".to_string()));
                }
                fee
            }
            None => default_fee_per_tx(),
        };

        if self.recipients.is_empty() {
            return Err(DistributionError::NoRecipients);
        }
        let recipients = self
            .recipients
            .into_iter()
            .enumerate()
            .map(|(index, entry)| Recipient {
                index,
                address: entry.address.trim().to_string(),
                amount: entry.amount.0,
                note: entry.note,
            })
            .collect();

        Ok(Distribution {
            token_id,
            recipients,
            fee_per_tx,
            batch_size: section.batch_size,
        })
    }
}

fn parse_token_id(text: &str) -> Result<TokenId, DistributionError> {
    let text = text.trim();
    if text.len() != 64 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DistributionError::Config(format!(
            "token_id must be 64 hexadecimal characters, got '{text}'"
        )));
    }
    TokenId::from_hex(text).map_err(|e| DistributionError::Config(format!("token_id: {e}")))
}
