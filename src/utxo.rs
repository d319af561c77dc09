//! UTXO pool (component B): identity of an unspent output and the mapping
//! from UTXO key to output record. Generalizes the teacher's `UtxoSet`
//! lookup (`transaction.rs::check_tx_inputs`) into an owned, independently
//! copyable collection, per spec §3/§4.1.

use crate::types::{Output, UtxoKey};
use std::collections::BTreeMap;

/// A mapping UTXO-key -> Output with no duplicates. Ordered (`BTreeMap`,
/// not a hash map) so iteration is deterministic — load-bearing for the
/// selector's group-processing order and for test reproducibility (spec §9,
/// "ordered sets used for iteration determinism").
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UtxoPool {
    entries: BTreeMap<UtxoKey, Output>,
}

impl UtxoPool {
    pub fn new() -> Self {
        UtxoPool {
            entries: BTreeMap::new(),
        }
    }

    pub fn contains(&self, key: &UtxoKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &UtxoKey) -> Option<&Output> {
        self.entries.get(key)
    }

    pub fn add(&mut self, key: UtxoKey, output: Output) {
        self.entries.insert(key, output);
    }

    pub fn remove(&mut self, key: &UtxoKey) -> Option<Output> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deep, independent copy — mutating the clone never touches `self`.
    /// `BTreeMap<_, Output>` with owned `Output`s already clones this way
    /// via `Clone`; this method exists so call sites read the same as the
    /// spec's "deep-copy" operation (spec §4.1, §5).
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UtxoKey, &Output)> {
        self.entries.iter()
    }
}
