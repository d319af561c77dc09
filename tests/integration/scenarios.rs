use ledgerforge_consensus::block_tree::Block;
use ledgerforge_consensus::blockchain::Blockchain;
use ledgerforge_consensus::config::ConsensusConfig;
use ledgerforge_consensus::consensus::{Candidate, Node};
use ledgerforge_consensus::crypto::StubCrypto;
use ledgerforge_consensus::epoch;
use ledgerforge_consensus::selector;
use ledgerforge_consensus::types::{Digest, Input, Output, Transaction, UtxoKey};
use ledgerforge_consensus::utxo::UtxoPool;

fn spend(crypto: &StubCrypto, prev_tx: Digest, prev_index: u32, address: &[u8], out_value: f64, out_address: &[u8]) -> Transaction {
    let draft = Transaction::new(
        vec![Input::new(prev_tx.clone(), prev_index, vec![])],
        vec![Output::new(out_value, out_address.to_vec())],
        crypto,
    );
    let preimage = draft.signing_preimage(0).unwrap();
    let sig = crypto.sign(address, &preimage);
    Transaction::new(
        vec![Input::new(prev_tx, prev_index, sig)],
        draft.outputs,
        crypto,
    )
}

fn genesis_block(crypto: &StubCrypto, address: &[u8], value: f64, hash: u8) -> Block {
    let coinbase = Transaction::new(vec![], vec![Output::new(value, address.to_vec())], crypto);
    Block {
        prev_block_hash: None,
        coinbase,
        transactions: vec![],
        hash: Digest::new(vec![hash; 32]),
    }
}

#[test]
fn genesis_only_chain_then_add_valid_block_updates_the_pool() {
    let crypto = StubCrypto::default();
    let alice = b"alice".to_vec();
    let bob = b"bob".to_vec();
    let gen = genesis_block(&crypto, &alice, 50.0, 0);
    let coinbase_id = gen.coinbase.id().clone();
    let mut chain = Blockchain::new(gen, 10, &crypto).unwrap();

    let pay_bob = spend(&crypto, coinbase_id, 0, &alice, 30.0, &bob);
    let pay_bob_id = pay_bob.id().clone();

    let next_coinbase = Transaction::new(vec![], vec![Output::new(50.0, alice.clone())], &crypto);
    let next_coinbase_id = next_coinbase.id().clone();
    let block = Block {
        prev_block_hash: Some(Digest::new(vec![0; 32])),
        coinbase: next_coinbase,
        transactions: vec![pay_bob],
        hash: Digest::new(vec![1; 32]),
    };
    assert!(chain.add_block(block));

    let pool = chain.get_max_height_utxo_pool().unwrap();
    assert!(pool.contains(&UtxoKey::new(pay_bob_id, 0)));
    assert!(pool.contains(&UtxoKey::new(next_coinbase_id, 0)));
}

#[test]
fn block_with_one_double_spending_transaction_is_rejected_wholesale() {
    let crypto = StubCrypto::default();
    let alice = b"alice".to_vec();
    let gen = genesis_block(&crypto, &alice, 50.0, 0);
    let coinbase_id = gen.coinbase.id().clone();
    let mut chain = Blockchain::new(gen, 10, &crypto).unwrap();

    let spend_a = spend(&crypto, coinbase_id.clone(), 0, &alice, 20.0, b"bob");
    let spend_b = spend(&crypto, coinbase_id, 0, &alice, 15.0, b"carol");

    let next_coinbase = Transaction::new(vec![], vec![Output::new(50.0, alice)], &crypto);
    let block = Block {
        prev_block_hash: Some(Digest::new(vec![0; 32])),
        coinbase: next_coinbase,
        transactions: vec![spend_a, spend_b],
        hash: Digest::new(vec![1; 32]),
    };

    // The epoch handler would greedily accept exactly one of the two, but
    // `add_block` requires every proposed transaction to be accepted —
    // a block that double-spends within itself is rejected in full.
    assert!(!chain.add_block(block));
    assert_eq!(chain.get_max_height_block().unwrap().height, 1);
}

#[test]
fn selector_captures_strictly_more_fee_than_greedy_first_come_acceptance() {
    let crypto = StubCrypto::default();
    let alice = b"alice".to_vec();
    let mut pool = UtxoPool::new();
    let funding = Digest::new(vec![7; 32]);
    pool.add(UtxoKey::new(funding.clone(), 0), Output::new(10.0, alice.clone()));

    // Two conflicting spends of the same coin; the first proposed pays a
    // lower fee than the second.
    let low_fee = spend(&crypto, funding.clone(), 0, &alice, 9.5, b"bob"); // fee 0.5
    let high_fee = spend(&crypto, funding, 0, &alice, 6.0, b"carol"); // fee 4.0

    let greedy = epoch::handle_txs(&pool, &[low_fee.clone(), high_fee.clone()], &crypto);
    assert_eq!(greedy.accepted.len(), 1);
    assert_eq!(greedy.accepted[0].id(), low_fee.id());

    let (picked, fee) = selector::select_with_fee(&pool, &[low_fee, high_fee.clone()], &crypto, None);
    assert_eq!(picked.len(), 1);
    assert_eq!(picked[0].id(), high_fee.id());
    assert_eq!(fee, 4.0);
}

#[test]
fn selector_accepts_an_entire_chain_of_dependent_spends() {
    let crypto = StubCrypto::default();
    let alice = b"alice".to_vec();
    let mut pool = UtxoPool::new();
    let funding = Digest::new(vec![5; 32]);
    pool.add(UtxoKey::new(funding.clone(), 0), Output::new(10.0, alice.clone()));

    let hop1 = spend(&crypto, funding, 0, &alice, 8.0, &alice); // fee 2
    let hop2 = spend(&crypto, hop1.id().clone(), 0, &alice, 6.0, &alice); // fee 2

    let picked = selector::select(&pool, &[hop2.clone(), hop1.clone()], &crypto, None);
    assert_eq!(picked.len(), 2);
    assert!(picked.iter().any(|t| t.id() == hop1.id()));
    assert!(picked.iter().any(|t| t.id() == hop2.id()));
}

#[test]
fn fork_then_cutoff_leaves_exactly_the_winning_branch_reachable() {
    let crypto = StubCrypto::default();
    let alice = b"alice".to_vec();
    let gen = genesis_block(&crypto, &alice, 50.0, 1);
    let mut chain = Blockchain::new(gen, 2, &crypto).unwrap();

    let mk = |prev: u8, hash: u8| Block {
        prev_block_hash: Some(Digest::new(vec![prev; 32])),
        coinbase: Transaction::new(vec![], vec![Output::new(50.0, alice.clone())], &crypto),
        transactions: vec![],
        hash: Digest::new(vec![hash; 32]),
    };

    assert!(chain.add_block(mk(1, 2))); // h2, branch B
    assert!(chain.add_block(mk(1, 3))); // h2, branch C (sibling fork)
    assert!(chain.add_block(mk(2, 4))); // h3, extends B
    assert!(chain.add_block(mk(4, 5))); // h4, extends B further

    assert_eq!(chain.get_max_height_block().unwrap().height, 4);
}

#[test]
fn consensus_node_flags_a_followee_that_goes_silent() {
    let crypto = StubCrypto::default();
    let cfg = ConsensusConfig {
        p_graph: 0.25,
        p_malicious: 0.1,
        p_tx_distribution: 0.4,
        num_rounds: 8,
    };
    let mut node = Node::new(cfg);
    node.set_followees(vec![true, true, true]);

    let active_tx = |seed: u8| {
        Transaction::new(vec![], vec![Output::new(1.0, vec![seed])], &crypto)
    };

    for round in 0..5u8 {
        let candidates = vec![
            Candidate { tx: active_tx(round), sender: 0 },
            Candidate { tx: active_tx(round + 100), sender: 1 },
            // sender 2 never proposes anything.
        ];
        node.receive_from_followees(&candidates);
    }

    assert!(node.is_malicious(2));
    assert!(!node.is_malicious(0));
    assert!(!node.is_malicious(1));
}
