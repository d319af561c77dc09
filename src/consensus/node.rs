//! Gossip consensus node (component H, spec §4.5): each node follows a
//! fixed subset of its peers, rebroadcasts everything it currently
//! believes every round, and listens to its followees' broadcasts while
//! running the malicious-detection heuristics in `heuristics` to decide
//! whose reports to keep trusting.
//!
//! No direct teacher/pack analog exists for this component (see
//! `DESIGN.md`); it follows the crate's established conventions — error
//! handling via `crate::error`, deterministic ordered containers per spec
//! §9 — rather than any one retrieved file.

use super::believers::BelieverRecord;
use super::heuristics;
use crate::config::ConsensusConfig;
use crate::types::{Digest, Transaction};
use std::collections::{BTreeSet, HashMap};

/// A transaction proposal received from a followee during gossip.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub tx: Transaction,
    pub sender: usize,
}

/// One participant in the gossip simulation.
pub struct Node {
    config: ConsensusConfig,
    followees: Vec<bool>,
    pending: BTreeSet<Transaction>,
    malicious: BTreeSet<usize>,
    believers: HashMap<Digest, BelieverRecord>,
    last_tx_count: Vec<u32>,
    curr_round: u32,
}

impl Node {
    pub fn new(config: ConsensusConfig) -> Self {
        Node {
            config,
            followees: Vec::new(),
            pending: BTreeSet::new(),
            malicious: BTreeSet::new(),
            believers: HashMap::new(),
            last_tx_count: Vec::new(),
            curr_round: 0,
        }
    }

    /// Installs this node's follow set. Called once, before gossip begins.
    pub fn set_followees(&mut self, followees: Vec<bool>) {
        self.last_tx_count = vec![0; followees.len()];
        self.followees = followees;
    }

    /// Seeds the node's initial beliefs — the transactions it was handed
    /// directly rather than learning about through gossip (spec §4.5).
    pub fn set_pending_transaction(&mut self, txs: Vec<Transaction>) {
        self.pending.extend(txs);
    }

    /// Reveals this round's entire belief set to every follower — no
    /// delta-only or threshold-gated forwarding (see `DESIGN.md`'s Open
    /// Question decision on this point). The round counter advances on
    /// the receive side, not here, since a node may be asked to broadcast
    /// more than once before its followees report back.
    pub fn send_to_followers(&self) -> Vec<Transaction> {
        self.pending.iter().cloned().collect()
    }

    pub fn is_malicious(&self, followee: usize) -> bool {
        self.malicious.contains(&followee)
    }

    pub fn followee_count(&self) -> usize {
        self.followees.len()
    }

    pub fn pending(&self) -> &BTreeSet<Transaction> {
        &self.pending
    }

    pub fn malicious_set(&self) -> &BTreeSet<usize> {
        &self.malicious
    }

    /// Processes one round of gossip: advances the round counter, folds in
    /// every candidate from a followee not yet flagged malicious, then
    /// runs the detection heuristics in the fixed order spec §4.5
    /// requires (each narrows the denominator the next one reads).
    pub fn receive_from_followees(&mut self, candidates: &[Candidate]) {
        self.curr_round += 1;
        log::debug!("node entering round {}", self.curr_round);

        for record in self.believers.values_mut() {
            record.advance_round(self.curr_round);
        }

        let mut tx_count_this_round = vec![0u32; self.followees.len()];
        for candidate in candidates {
            if !self.followees.get(candidate.sender).copied().unwrap_or(false) {
                continue;
            }
            if self.malicious.contains(&candidate.sender) {
                continue;
            }
            tx_count_this_round[candidate.sender] += 1;
            self.believers
                .entry(candidate.tx.id().clone())
                .or_insert_with(|| BelieverRecord::new(self.followees.len()))
                .flag(candidate.sender);
            self.pending.insert(candidate.tx.clone());
        }

        let stats: Vec<heuristics::FolloweeRoundStats> = (0..self.followees.len())
            .filter(|&i| self.followees[i])
            .map(|i| heuristics::FolloweeRoundStats {
                index: i,
                tx_count_this_round: tx_count_this_round[i],
                last_tx_count: self.last_tx_count[i],
            })
            .collect();

        heuristics::flag_non_monotonic(&stats, &mut self.malicious);
        heuristics::flag_silent_peer(self.curr_round, &stats, &mut self.malicious);
        heuristics::flag_under_propagating(
            self.curr_round,
            self.config.num_rounds,
            self.believers.len(),
            self.config.p_tx_distribution,
            &stats,
            &mut self.malicious,
        );
        heuristics::flag_stopped_believing(&stats, &self.believers, &mut self.malicious);
        let followee_indices: Vec<usize> = (0..self.followees.len())
            .filter(|&i| self.followees[i])
            .collect();
        heuristics::flag_against_late_consensus(
            self.curr_round,
            self.config.num_rounds,
            &followee_indices,
            &self.believers,
            &mut self.malicious,
        );

        log::trace!(
            "round {}: {} followee(s) classified malicious",
            self.curr_round,
            self.malicious.len()
        );

        self.last_tx_count = tx_count_this_round;
    }
}
