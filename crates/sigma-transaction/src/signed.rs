//! Signed transactions as produced by a signer and accepted by the node.

use serde::{Deserialize, Serialize};

/// A signed transaction ready for submission.
///
/// The body is the node's JSON transaction representation; this crate never
/// inspects it beyond passing it through.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Transaction id, if the signer computed it.
    #[serde(default)]
    pub id: Option<String>,
    /// JSON body sent to the node.
    pub body: serde_json::Value,
}

impl SignedTransaction {
    /// Wrap a signed JSON body.
    pub fn new(body: serde_json::Value) -> Self {
        let id = body
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Self { id, body }
    }
}
