//! Protocol parameters used when planning transactions.

/// Minimum nanoERG a box must carry (0.001 ERG).
pub const MIN_BOX_VALUE: u64 = 1_000_000;

/// Minimum miner fee accepted by default node policy (0.001 ERG).
pub const MIN_FEE: u64 = 1_000_000;

/// Upper bound on outputs in one transaction, including change and fee outputs.
pub const MAX_OUTPUTS_PER_TX: usize = 100;

/// Upper bound on payment outputs in one transaction: the output cap less the
/// change and fee outputs.
pub const MAX_RECIPIENTS_PER_TX: usize = MAX_OUTPUTS_PER_TX - 2;
