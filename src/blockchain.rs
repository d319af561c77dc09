//! Blockchain facade (component G): wraps the block tree, derives each
//! block's post-install UTXO pool via the greedy epoch handler plus
//! coinbase insertion, and exposes an append-only mempool. Grounded on
//! `reorganization.rs::reorganize_chain`'s orchestration style — validate,
//! thread the UTXO set through, fail loudly and atomically on any rejected
//! transaction — generalized from "reorganize a linear chain" to "install
//! one block onto a tree" (spec §4.4, §6, §7).

use crate::block_tree::{Block, BlockInfo, BlockTree, Height};
use crate::crypto::CryptoProvider;
use crate::epoch;
use crate::types::{Digest, Transaction, UtxoKey};
use crate::utxo::UtxoPool;
use crate::validation;
use std::collections::BTreeMap;

/// Append-only pool of not-yet-included transactions, keyed by digest so
/// re-adding a pending transaction is a silent no-op (spec §4.4).
#[derive(Default)]
pub struct Mempool {
    entries: BTreeMap<Digest, Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Mempool::default()
    }

    pub fn add(&mut self, tx: Transaction) {
        self.entries.entry(tx.id().clone()).or_insert(tx);
    }

    pub fn remove(&mut self, id: &Digest) {
        self.entries.remove(id);
    }

    pub fn contains(&self, id: &Digest) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns a copy of the pending transactions, per spec §6
    /// (`get_transaction_pool()` "returns a copy").
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.entries.values().cloned().collect()
    }
}

pub struct Blockchain<'c> {
    tree: BlockTree,
    mempool: Mempool,
    crypto: &'c dyn CryptoProvider,
}

impl<'c> Blockchain<'c> {
    /// Builds a blockchain from a genesis block: its pool is the coinbase
    /// output(s) alone (no prior transactions to apply). Fails loudly (spec
    /// §7) if genesis itself can't be installed — this is a
    /// programming-contract violation, not a rejection the caller routes
    /// around, so it surfaces as `Err` rather than a panic, mirroring the
    /// teacher's own fallible constructors (`reorganize_chain` returns
    /// `Result`, not a bool-and-panic pair).
    pub fn new(
        genesis: Block,
        cut_off_age: Height,
        crypto: &'c dyn CryptoProvider,
    ) -> crate::error::Result<Self> {
        if !genesis.coinbase.is_coinbase() {
            return Err(crate::error::ConsensusError::InvalidGenesis(
                "coinbase transaction must have zero inputs".to_string(),
            ));
        }
        let mut pool = UtxoPool::new();
        insert_coinbase_outputs(&genesis.coinbase, &mut pool);

        let mut tree = BlockTree::new(cut_off_age);
        if !tree.add_block(genesis, pool)? {
            return Err(crate::error::ConsensusError::InvalidGenesis(
                "genesis block rejected by the block tree".to_string(),
            ));
        }

        Ok(Blockchain {
            tree,
            mempool: Mempool::new(),
            crypto,
        })
    }

    pub fn get_max_height_block(&self) -> Option<&BlockInfo> {
        self.tree.head()
    }

    pub fn get_max_height_utxo_pool(&self) -> Option<&UtxoPool> {
        self.tree.head().map(|b| &b.utxo_pool)
    }

    pub fn get_transaction_pool(&self) -> Vec<Transaction> {
        self.mempool.snapshot()
    }

    pub fn add_transaction(&mut self, tx: Transaction) {
        self.mempool.add(tx);
    }

    /// Derives the post-block pool by running the greedy epoch handler on
    /// `block.transactions` against the parent's pool, requiring every
    /// transaction was accepted (no silent drops — spec §4.4b), then
    /// validates and inserts the coinbase outputs, then installs into the
    /// tree. All-or-nothing: on any failure neither the pool nor the
    /// mempool changes (spec §7).
    pub fn add_block(&mut self, block: Block) -> bool {
        let Some(parent_hash) = &block.prev_block_hash else {
            log::warn!("rejecting block {}: non-genesis block must name a parent", block.hash);
            return false;
        };
        let Some(parent) = self.tree.get(parent_hash) else {
            log::warn!("rejecting block {}: parent {} not in tree", block.hash, parent_hash);
            return false;
        };
        if !block.coinbase.is_coinbase() {
            log::warn!("rejecting block {}: coinbase has inputs", block.hash);
            return false;
        }

        let epoch::EpochResult { accepted, mut pool } =
            epoch::handle_txs(&parent.utxo_pool, &block.transactions, self.crypto);

        if accepted.len() != block.transactions.len() {
            log::warn!(
                "rejecting block {}: {} of {} transactions were invalid against the parent pool",
                block.hash,
                block.transactions.len() - accepted.len(),
                block.transactions.len()
            );
            return false;
        }

        insert_coinbase_outputs(&block.coinbase, &mut pool);

        let tx_ids: Vec<Digest> = block.transactions.iter().map(|t| t.id().clone()).collect();
        let hash = block.hash.clone();
        match self.tree.add_block(block, pool) {
            Ok(true) => {}
            Ok(false) => return false,
            // Duplicate hash is a programming-contract violation (spec §7):
            // the caller handed back a block this tree already holds.
            Err(e) => panic!("add_block({hash}): {e}"),
        }

        for id in tx_ids {
            self.mempool.remove(&id);
        }
        true
    }
}

fn insert_coinbase_outputs(coinbase: &Transaction, pool: &mut UtxoPool) {
    for (index, output) in coinbase.outputs.iter().enumerate() {
        pool.add(
            UtxoKey::new(coinbase.id().clone(), index as u32),
            output.clone(),
        );
    }
}
