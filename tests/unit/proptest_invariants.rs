use ledgerforge_consensus::block_tree::{Block, BlockTree};
use ledgerforge_consensus::crypto::StubCrypto;
use ledgerforge_consensus::types::{Digest, Input, Output, Transaction, UtxoKey};
use ledgerforge_consensus::utxo::UtxoPool;
use ledgerforge_consensus::validation;
use proptest::prelude::*;

fn linear_chain_block(height: u8, value: f64, crypto: &StubCrypto) -> Block {
    let coinbase = Transaction::new(vec![], vec![Output::new(value, vec![height])], crypto);
    Block {
        prev_block_hash: if height == 1 {
            None
        } else {
            Some(Digest::new(vec![height - 1; 32]))
        },
        coinbase,
        transactions: vec![],
        hash: Digest::new(vec![height; 32]),
    }
}

proptest! {
    /// Applying a transaction to a pool and then undoing it with the
    /// outputs it spent always restores the pool exactly (spec §3).
    #[test]
    fn apply_then_undo_is_always_identity(value in 1.0f64..1000.0, spend_amount in 0.0f64..1000.0) {
        let crypto = StubCrypto::default();
        let address = b"alice".to_vec();
        let prev_tx = Digest::new(vec![1; 32]);
        let mut pool = UtxoPool::new();
        pool.add(UtxoKey::new(prev_tx.clone(), 0), Output::new(value, address.clone()));
        let before = pool.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Vec<_>>();

        let spend_value = spend_amount.min(value);
        let draft = Transaction::new(
            vec![Input::new(prev_tx.clone(), 0, vec![])],
            vec![Output::new(spend_value, b"bob".to_vec())],
            &crypto,
        );
        let preimage = draft.signing_preimage(0).unwrap();
        let sig = crypto.sign(&address, &preimage);
        let tx = Transaction::new(vec![Input::new(prev_tx, 0, sig)], draft.outputs, &crypto);

        prop_assume!(validation::validate(&tx, &pool, &crypto));

        let spent: Vec<Output> = tx
            .inputs
            .iter()
            .map(|i| pool.get(&UtxoKey::new(i.prev_tx.clone(), i.output_index)).unwrap().clone())
            .collect();
        validation::apply(&tx, &mut pool);
        validation::undo(&tx, &mut pool, &spent);

        let after = pool.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Vec<_>>();
        prop_assert_eq!(before, after);
    }

    /// A linear chain of `n` blocks never retains a block at or below
    /// `max_height - cut_off_age - 1`, for any chain length and cut-off
    /// age (spec §4.4's pruning bound).
    #[test]
    fn cutoff_bound_holds_for_any_linear_chain(n in 1u8..40, cut_off_age in 0u64..20) {
        let crypto = StubCrypto::default();
        let mut tree = BlockTree::new(cut_off_age);
        for h in 1..=n {
            tree.add_block(linear_chain_block(h, 50.0, &crypto), UtxoPool::new()).unwrap();
        }

        let max_h = tree.max_height();
        let floor = max_h.saturating_sub(cut_off_age).saturating_sub(1);
        for h in 1..=n {
            let hash = Digest::new(vec![h; 32]);
            if let Some(info) = tree.get(&hash) {
                prop_assert!(info.height > floor);
            }
        }
    }
}
