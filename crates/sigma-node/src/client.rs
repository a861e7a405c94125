//! Ergo node HTTP client.

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use sigma_primitives::{Address, TokenId};
use sigma_transaction::{SignedTransaction, TokenMetadata, UtxoEntry};

use crate::error::NodeError;
use crate::types::{
    ApiErrorBody, NodeBox, NodeConfig, NodeInfo, NodeTokenInfo, NodeTransaction,
    TransactionStatus,
};

/// Page size used when listing unspent boxes.
const UNSPENT_PAGE_SIZE: usize = 100;

/// The node calls a distribution run depends on.
///
/// Implemented by [`NodeClient`] for a live node and by in-memory fakes in
/// tests. Lookups that can legitimately miss return `Ok(None)`.
pub trait NodeApi {
    /// Node name, network and height.
    fn info(&self) -> impl Future<Output = Result<NodeInfo, NodeError>> + Send;

    /// Metadata for `token_id`, or `None` if the node does not know the token.
    fn token_info(
        &self,
        token_id: &TokenId,
    ) -> impl Future<Output = Result<Option<TokenMetadata>, NodeError>> + Send;

    /// Every unspent box owned by `owner`.
    fn unspent_outputs(
        &self,
        owner: &Address,
    ) -> impl Future<Output = Result<Vec<UtxoEntry>, NodeError>> + Send;

    /// Submit a signed transaction, returning its id.
    fn submit_transaction(
        &self,
        tx: &SignedTransaction,
    ) -> impl Future<Output = Result<String, NodeError>> + Send;

    /// Confirmation status of `tx_id`, or `None` if the node has not seen it.
    fn transaction_status(
        &self,
        tx_id: &str,
    ) -> impl Future<Output = Result<Option<TransactionStatus>, NodeError>> + Send;
}

/// HTTP client for the Ergo node REST API.
#[derive(Debug, Clone)]
pub struct NodeClient {
    /// Client configuration.
    config: NodeConfig,
    /// Underlying HTTP client.
    client: reqwest::Client,
}

impl NodeClient {
    /// Create a new node client. The configured timeout applies to every request.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(Self::build_headers(&config))
            .build()?;
        Ok(Self { config, client })
    }

    /// The client configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Build common headers from config.
    fn build_headers(config: &NodeConfig) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(ref key) = config.api_key {
            if let Ok(val) = HeaderValue::from_str(key) {
                headers.insert("api_key", val);
            }
        }

        headers
    }

    async fn get(&self, path: &str) -> Result<Response, NodeError> {
        let url = self.url(path);
        debug!(%url, "node GET");
        self.client.get(&url).send().await.map_err(NodeError::from_http)
    }

    /// Fetch node information.
    pub async fn info(&self) -> Result<NodeInfo, NodeError> {
        let resp = self.get("/info").await?;
        read_json(resp).await
    }

    /// Fetch token metadata; `Ok(None)` on 404.
    pub async fn token_info(&self, token_id: &TokenId) -> Result<Option<TokenMetadata>, NodeError> {
        let resp = self
            .get(&format!("/blockchain/token/byId/{}", token_id.to_hex()))
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            warn!(token = %token_id, "token not known to node");
            return Ok(None);
        }
        let raw: NodeTokenInfo = read_json(resp).await?;
        TokenMetadata::try_from(raw).map(Some)
    }

    /// Fetch every unspent box of `owner`, following pagination.
    pub async fn unspent_outputs(&self, owner: &Address) -> Result<Vec<UtxoEntry>, NodeError> {
        let mut entries = Vec::new();
        let mut offset = 0usize;
        loop {
            let resp = self
                .get(&format!(
                    "/blockchain/box/unspent/byAddress/{}?offset={offset}&limit={UNSPENT_PAGE_SIZE}",
                    owner.as_str()
                ))
                .await?;
            let page: Vec<NodeBox> = read_json(resp).await?;
            let page_len = page.len();
            for raw in page {
                entries.push(UtxoEntry::try_from(raw)?);
            }
            if page_len < UNSPENT_PAGE_SIZE {
                break;
            }
            offset += page_len;
        }
        debug!(owner = %owner, count = entries.len(), "fetched unspent boxes");
        Ok(entries)
    }

    /// Submit a signed transaction to `/transactions`.
    pub async fn submit_transaction(&self, tx: &SignedTransaction) -> Result<String, NodeError> {
        let url = self.url("/transactions");
        let resp = self
            .client
            .post(&url)
            .json(&tx.body)
            .send()
            .await
            .map_err(NodeError::from_http)?;

        let status = resp.status();
        if status.is_success() {
            let id: String = resp.json().await.map_err(NodeError::from_http)?;
            debug!(tx_id = %id, "transaction accepted");
            return Ok(id);
        }

        let code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();
        let description = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(api) => api.detail.unwrap_or(api.reason),
            Err(_) if body.is_empty() => "rejected".to_string(),
            Err(_) => body,
        };
        if status.is_client_error() {
            Err(NodeError::Rejected { code, description })
        } else {
            Err(NodeError::Status { status: code, body: description })
        }
    }

    /// Query the status of a transaction; `Ok(None)` on 404.
    pub async fn transaction_status(&self, tx_id: &str) -> Result<Option<TransactionStatus>, NodeError> {
        let resp = self
            .get(&format!("/blockchain/transaction/byId/{tx_id}"))
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let raw: NodeTransaction = read_json(resp).await?;
        Ok(Some(raw.into()))
    }
}

/// Decode a successful JSON response, or turn the status and body into an error.
async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, NodeError> {
    let status = resp.status();
    if status.is_success() {
        return resp.json().await.map_err(NodeError::from_http);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(NodeError::Status {
        status: status.as_u16(),
        body,
    })
}

impl NodeApi for NodeClient {
    async fn info(&self) -> Result<NodeInfo, NodeError> {
        NodeClient::info(self).await
    }

    async fn token_info(&self, token_id: &TokenId) -> Result<Option<TokenMetadata>, NodeError> {
        NodeClient::token_info(self, token_id).await
    }

    async fn unspent_outputs(&self, owner: &Address) -> Result<Vec<UtxoEntry>, NodeError> {
        NodeClient::unspent_outputs(self, owner).await
    }

    async fn submit_transaction(&self, tx: &SignedTransaction) -> Result<String, NodeError> {
        NodeClient::submit_transaction(self, tx).await
    }

    async fn transaction_status(&self, tx_id: &str) -> Result<Option<TransactionStatus>, NodeError> {
        NodeClient::transaction_status(self, tx_id).await
    }
}
