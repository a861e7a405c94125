//! Engine settings: sender, protocol limits, pacing and timeouts.

use std::time::Duration;

use sigma_primitives::{Address, Network};
use sigma_transaction::params::{MAX_OUTPUTS_PER_TX, MIN_BOX_VALUE};

/// Pause between consecutive live submissions.
pub const DEFAULT_INTER_BATCH_DELAY: Duration = Duration::from_secs(1);

/// Deadline for a single node or signer call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Outputs every distribution transaction spends on something other than a
/// recipient: the change box and the miner fee box.
const RESERVED_OUTPUTS: usize = 2;

/// Settings shared by validation and execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Address that owns the funding boxes and receives change.
    pub sender: Address,
    /// Pause between live submissions; zero disables it.
    pub inter_batch_delay: Duration,
    /// Protocol limit on outputs per transaction.
    pub max_outputs_per_tx: usize,
    /// nanoERG carried by every recipient output.
    pub min_box_value: u64,
    /// Deadline for each node or signer call.
    pub call_timeout: Duration,
}

impl EngineSettings {
    /// Protocol defaults for `sender`.
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            inter_batch_delay: DEFAULT_INTER_BATCH_DELAY,
            max_outputs_per_tx: MAX_OUTPUTS_PER_TX,
            min_box_value: MIN_BOX_VALUE,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Set the pause between live submissions.
    pub fn with_inter_batch_delay(mut self, delay: Duration) -> Self {
        self.inter_batch_delay = delay;
        self
    }

    /// Set the per-call deadline.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Set the outputs-per-transaction limit.
    pub fn with_max_outputs_per_tx(mut self, max_outputs: usize) -> Self {
        self.max_outputs_per_tx = max_outputs;
        self
    }

    /// Set the nanoERG carried by recipient outputs.
    pub fn with_min_box_value(mut self, min_box_value: u64) -> Self {
        self.min_box_value = min_box_value;
        self
    }

    /// Network recipients must belong to: the sender's.
    pub fn network(&self) -> Network {
        self.sender.network()
    }

    /// Most recipients a single transaction can pay.
    pub fn max_recipients_per_tx(&self) -> usize {
        self.max_outputs_per_tx.saturating_sub(RESERVED_OUTPUTS).max(1)
    }
}
