//! Polling for transaction confirmation.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::client::NodeApi;
use crate::error::NodeError;
use crate::types::TransactionStatus;

/// Poll `node` until `tx_id` has at least `min_confirmations`.
///
/// Unknown transactions and lookups failing with a
/// [transient](NodeError::is_transient) error are retried every
/// `poll_interval`. Returns [`NodeError::Timeout`] if `timeout` elapses first;
/// any other node error ends the wait immediately.
pub async fn wait_for_confirmation<N: NodeApi>(
    node: &N,
    tx_id: &str,
    min_confirmations: u64,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<TransactionStatus, NodeError> {
    let deadline = Instant::now() + timeout;
    loop {
        match node.transaction_status(tx_id).await {
            Ok(Some(status)) => {
                if status.confirmations >= min_confirmations {
                    return Ok(status);
                }
                debug!(tx_id, confirmations = status.confirmations, "waiting for confirmations");
            }
            Ok(None) => {}
            Err(e) if e.is_transient() => {
                warn!(tx_id, error = %e, "status lookup failed, retrying");
            }
            Err(e) => return Err(e),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(NodeError::Timeout);
        }
        sleep(poll_interval.min(deadline - now)).await;
    }
}
