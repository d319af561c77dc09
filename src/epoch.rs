//! Greedy epoch handler (component D): applies any valid transaction from a
//! proposed batch, repeating full passes until a pass applies none. No
//! direct teacher analog was retrieved for this exact shape; the
//! loop-until-fixed-point structure follows `reorganization.rs`'s
//! disconnect/reconnect loops, which repeat over a sequence until the chain
//! state stabilizes.

use crate::crypto::CryptoProvider;
use crate::types::Transaction;
use crate::utxo::UtxoPool;
use crate::validation;

/// Result of a greedy pass over a batch: the accepted subset, in the order
/// they were applied, and the pool after applying them.
pub struct EpochResult {
    pub accepted: Vec<Transaction>,
    pub pool: UtxoPool,
}

/// Repeatedly scans `proposed`, applying any transaction valid against the
/// current working pool, until a full pass accepts none. The result is a
/// fixed point of mutually compatible transactions — not guaranteed maximal
/// (spec §4.2).
pub fn handle_txs(
    prior_pool: &UtxoPool,
    proposed: &[Transaction],
    crypto: &dyn CryptoProvider,
) -> EpochResult {
    let mut pool = prior_pool.deep_copy();
    let mut remaining: Vec<&Transaction> = proposed.iter().collect();
    let mut accepted = Vec::new();

    loop {
        let mut applied_this_pass = false;
        let mut still_remaining = Vec::with_capacity(remaining.len());

        for tx in remaining {
            if validation::validate(tx, &pool, crypto) {
                validation::apply(tx, &mut pool);
                accepted.push(tx.clone());
                applied_this_pass = true;
            } else {
                still_remaining.push(tx);
            }
        }

        remaining = still_remaining;
        if !applied_this_pass {
            break;
        }
    }

    EpochResult { accepted, pool }
}
