//! Transaction validator (component C): the five-rule validity check of a
//! transaction against a pool. Restructured from the teacher's
//! `transaction.rs::check_transaction` / `check_tx_inputs` pair (which
//! split structural checks from input/fee checks) into the single pool-based
//! contract spec §4.1 names. Pure — no mutation, short-circuits on first
//! failure.

use crate::crypto::CryptoProvider;
use crate::types::{Transaction, UtxoKey};
use crate::utxo::UtxoPool;
use std::collections::HashSet;

/// `validate(tx, pool)` per spec §4.1. All five rules must hold:
/// 1. every input references a UTXO present in `pool`
/// 2. every input's signature verifies against the referenced output's address
/// 3. no two inputs claim the same UTXO key
/// 4. every output value is >= 0
/// 5. sum(input values) >= sum(output values)
pub fn validate(tx: &Transaction, pool: &UtxoPool, crypto: &dyn CryptoProvider) -> bool {
    if tx.is_coinbase() {
        // Coinbases are validated separately at block-install time (spec
        // §4.4); the general validator only ever sees non-coinbase
        // candidates from the epoch handler / selector.
        return false;
    }

    let mut claimed: HashSet<UtxoKey> = HashSet::with_capacity(tx.inputs.len());
    let mut total_in = 0.0f64;

    for (i, input) in tx.inputs.iter().enumerate() {
        let key = UtxoKey::new(input.prev_tx.clone(), input.output_index);

        // Rule 1: referenced UTXO must exist.
        let Some(referenced) = pool.get(&key) else {
            return false;
        };

        // Rule 2: signature must verify against the referenced address over
        // the canonical pre-image at this input's position.
        let Ok(preimage) = tx.signing_preimage(i) else {
            return false;
        };
        if !crypto.verify_signature(&referenced.address, &preimage, &input.signature) {
            return false;
        }

        // Rule 3: no UTXO claimed twice within the same transaction.
        if !claimed.insert(key) {
            return false;
        }

        total_in += referenced.value;
    }

    // Rule 4: every output value is nonnegative.
    if tx.outputs.iter().any(|o| o.value < 0.0) {
        return false;
    }

    // Rule 5: conservation of value.
    let total_out: f64 = tx.outputs.iter().map(|o| o.value).sum();
    total_in >= total_out
}

/// Fee of a transaction: sum(inputs) - sum(outputs). Nonnegative for any
/// transaction that passes `validate` against the same pool (spec §4.3).
pub fn fee(tx: &Transaction, pool: &UtxoPool) -> f64 {
    let total_in: f64 = tx
        .inputs
        .iter()
        .filter_map(|i| pool.get(&UtxoKey::new(i.prev_tx.clone(), i.output_index)))
        .map(|o| o.value)
        .sum();
    let total_out: f64 = tx.outputs.iter().map(|o| o.value).sum();
    total_in - total_out
}

/// Applies an already-validated transaction to `pool`: removes exactly its
/// claimed inputs and inserts exactly its outputs, keyed by its own digest.
/// Caller must have validated `tx` against `pool` first (spec §8: applying a
/// valid tx changes pool size by exactly `|outputs| - |inputs|`).
pub fn apply(tx: &Transaction, pool: &mut UtxoPool) {
    for input in &tx.inputs {
        pool.remove(&UtxoKey::new(input.prev_tx.clone(), input.output_index));
    }
    for (index, output) in tx.outputs.iter().enumerate() {
        pool.add(tx.utxo_key(index as u32), output.clone());
    }
}

/// Reverses `apply`: removes the transaction's outputs and reinstates its
/// claimed inputs with their original `Output` records. `spent` must contain
/// exactly the outputs the inputs claimed, in input order (spec §8:
/// apply/undo round-trip).
pub fn undo(tx: &Transaction, pool: &mut UtxoPool, spent: &[crate::types::Output]) {
    for (index, _) in tx.outputs.iter().enumerate() {
        pool.remove(&tx.utxo_key(index as u32));
    }
    for (input, output) in tx.inputs.iter().zip(spent.iter()) {
        pool.add(
            UtxoKey::new(input.prev_tx.clone(), input.output_index),
            output.clone(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::StubCrypto;
    use crate::types::{Digest, Input, Output, Transaction};

    fn seeded_pool(crypto: &StubCrypto, address: &[u8], value: f64) -> (UtxoPool, Digest) {
        let mut pool = UtxoPool::new();
        let prev_tx = Digest::new(vec![9; 32]);
        pool.add(
            UtxoKey::new(prev_tx.clone(), 0),
            Output::new(value, address.to_vec()),
        );
        let _ = crypto;
        (pool, prev_tx)
    }

    fn spending_tx(
        crypto: &StubCrypto,
        prev_tx: Digest,
        address: &[u8],
        out_value: f64,
    ) -> Transaction {
        let unsigned = Input::new(prev_tx, 0, vec![]);
        let draft = Transaction::new(
            vec![unsigned],
            vec![Output::new(out_value, vec![2])],
            crypto,
        );
        let preimage = draft.signing_preimage(0).unwrap();
        let sig = crypto.sign(address, &preimage);
        let signed = Input::new(draft.inputs[0].prev_tx.clone(), 0, sig);
        Transaction::new(vec![signed], draft.outputs, crypto)
    }

    #[test]
    fn valid_transaction_passes_all_rules() {
        let crypto = StubCrypto::default();
        let address = b"alice".to_vec();
        let (pool, prev_tx) = seeded_pool(&crypto, &address, 10.0);
        let tx = spending_tx(&crypto, prev_tx, &address, 9.0);
        assert!(validate(&tx, &pool, &crypto));
        assert_eq!(fee(&tx, &pool), 1.0);
    }

    #[test]
    fn missing_utxo_is_rejected() {
        let crypto = StubCrypto::default();
        let address = b"alice".to_vec();
        let (pool, _prev_tx) = seeded_pool(&crypto, &address, 10.0);
        let other_tx = Digest::new(vec![1; 32]);
        let tx = spending_tx(&crypto, other_tx, &address, 9.0);
        assert!(!validate(&tx, &pool, &crypto));
    }

    #[test]
    fn bad_signature_is_rejected() {
        let crypto = StubCrypto::default();
        let address = b"alice".to_vec();
        let (pool, prev_tx) = seeded_pool(&crypto, &address, 10.0);
        let mut tx = spending_tx(&crypto, prev_tx, &address, 9.0);
        tx.inputs[0].signature = vec![0xff; 32];
        assert!(!validate(&tx, &pool, &crypto));
    }

    #[test]
    fn overspend_is_rejected() {
        let crypto = StubCrypto::default();
        let address = b"alice".to_vec();
        let (pool, prev_tx) = seeded_pool(&crypto, &address, 10.0);
        let tx = spending_tx(&crypto, prev_tx, &address, 11.0);
        assert!(!validate(&tx, &pool, &crypto));
    }

    #[test]
    fn negative_output_is_rejected() {
        let crypto = StubCrypto::default();
        let address = b"alice".to_vec();
        let (pool, prev_tx) = seeded_pool(&crypto, &address, 10.0);
        let mut tx = spending_tx(&crypto, prev_tx, &address, 9.0);
        tx.outputs[0].value = -1.0;
        assert!(!validate(&tx, &pool, &crypto));
    }

    #[test]
    fn apply_then_undo_restores_pool() {
        let crypto = StubCrypto::default();
        let address = b"alice".to_vec();
        let (pool, prev_tx) = seeded_pool(&crypto, &address, 10.0);
        let tx = spending_tx(&crypto, prev_tx.clone(), &address, 9.0);
        let spent_output = pool.get(&UtxoKey::new(prev_tx, 0)).unwrap().clone();
        let mut working = pool.clone();
        apply(&tx, &mut working);
        assert_eq!(working.len(), pool.len());
        undo(&tx, &mut working, &[spent_output]);
        assert_eq!(working, pool);
    }
}
