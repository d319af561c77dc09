//! Block tree + head tracker (component F): blocks keyed by hash, heights
//! tracked, pruned below a cut-off window (spec §4.4). Reworked from the
//! teacher's `reorganization.rs` (which reorganizes a single linear chain
//! onto another) into maintaining a branching tree directly, with no
//! back-pointers — parent lookup goes through the hash index, never a
//! direct reference (spec §9, "no cyclic ownership").

use crate::types::{Digest, Transaction};
use crate::utxo::UtxoPool;
use std::collections::HashMap;

pub type Height = u64;
pub type Timestamp = u64;

/// A block: an optional parent hash (`None` for genesis), a distinguished
/// coinbase, the rest of its transactions, and its content-addressed hash
/// (assumed precomputed — spec §3).
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub prev_block_hash: Option<Digest>,
    pub coinbase: Transaction,
    pub transactions: Vec<Transaction>,
    pub hash: Digest,
}

/// A block installed in the tree, plus the height and UTXO snapshot that
/// followed from installing it. `created_at` is a monotonic counter, not a
/// wall-clock reading — it exists solely to break max-height ties in favor
/// of whichever block was installed first (spec §3).
#[derive(Clone, Debug)]
pub struct BlockInfo {
    pub block: Block,
    pub height: Height,
    pub utxo_pool: UtxoPool,
    pub created_at: Timestamp,
}

/// Branching block tree with height-bounded pruning and a tracked head.
pub struct BlockTree {
    by_hash: HashMap<Digest, BlockInfo>,
    /// Sorted by height descending, then created_at ascending — the front
    /// element is the current head (spec §4.4).
    by_height: Vec<Digest>,
    cut_off_age: Height,
    clock: Timestamp,
}

impl BlockTree {
    pub fn new(cut_off_age: Height) -> Self {
        BlockTree {
            by_hash: HashMap::new(),
            by_height: Vec::new(),
            cut_off_age,
            clock: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    pub fn get(&self, hash: &Digest) -> Option<&BlockInfo> {
        self.by_hash.get(hash)
    }

    pub fn contains(&self, hash: &Digest) -> bool {
        self.by_hash.contains_key(hash)
    }

    pub fn max_height(&self) -> Height {
        self.by_height
            .first()
            .and_then(|h| self.by_hash.get(h))
            .map(|b| b.height)
            .unwrap_or(0)
    }

    pub fn head(&self) -> Option<&BlockInfo> {
        self.by_height.first().and_then(|h| self.by_hash.get(h))
    }

    /// Installs `block` with its already-computed post-block `pool`.
    /// Returns `Ok(false)` (no mutation) if the parent is unknown (and this
    /// isn't genesis) or if the new height falls at or below the cut-off
    /// window (spec §4.4, step 1-2) — ordinary validation rejection, not an
    /// error. Returns `Err` on a duplicate hash: a programming-contract
    /// violation per spec §7, not a validation rejection, mirroring
    /// `reorganize_chain`'s own `Result`-returning contract.
    pub fn add_block(&mut self, block: Block, pool: UtxoPool) -> crate::error::Result<bool> {
        if self.by_hash.contains_key(&block.hash) {
            return Err(crate::error::ConsensusError::DuplicateBlockHash(
                block.hash.to_string(),
            ));
        }

        let height = match &block.prev_block_hash {
            None => 1,
            Some(parent_hash) => match self.by_hash.get(parent_hash) {
                Some(parent) => parent.height + 1,
                None => {
                    log::warn!("rejecting block {}: parent {} unknown", block.hash, parent_hash);
                    return Ok(false);
                }
            },
        };

        let max_h = self.max_height();
        if height <= max_h.saturating_sub(self.cut_off_age) {
            log::warn!(
                "rejecting block {} at height {height}: below cut-off (max {max_h}, cut-off age {})",
                block.hash,
                self.cut_off_age
            );
            return Ok(false);
        }

        let created_at = self.clock;
        self.clock += 1;
        let hash = block.hash.clone();
        let was_new_max = height > max_h;

        self.by_hash.insert(
            hash.clone(),
            BlockInfo {
                block,
                height,
                utxo_pool: pool,
                created_at,
            },
        );
        self.insert_ordered(hash);

        if was_new_max {
            self.prune(height);
        }

        Ok(true)
    }

    fn insert_ordered(&mut self, hash: Digest) {
        let info = self.by_hash.get(&hash).expect("just inserted");
        let (height, created_at) = (info.height, info.created_at);
        let pos = self
            .by_height
            .partition_point(|h| {
                let other = &self.by_hash[h];
                other.height > height || (other.height == height && other.created_at <= created_at)
            });
        self.by_height.insert(pos, hash);
    }

    /// Drops the tail (lowest-height) entries while their height is at or
    /// below `new_max - cut_off_age - 1` — the extra `-1` keeps exactly
    /// enough context to still build blocks at the cut-off height (spec §3,
    /// §4.4 step 4).
    fn prune(&mut self, new_max: Height) {
        let floor = new_max.saturating_sub(self.cut_off_age).saturating_sub(1);
        while let Some(tail) = self.by_height.last() {
            let tail_height = self.by_hash[tail].height;
            if tail_height <= floor {
                let tail = self.by_height.pop().unwrap();
                self.by_hash.remove(&tail);
            } else {
                break;
            }
        }
    }
}
