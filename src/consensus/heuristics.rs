//! Malicious-followee detection (spec §4.5). Run once per round, in the
//! exact order listed below — later heuristics read counts that earlier
//! ones have already shrunk by removing newly-malicious followees, so the
//! order is load-bearing, not cosmetic.

use super::believers::BelieverRecord;
use std::collections::BTreeSet;

/// Inputs a single heuristic pass needs about one followee, independent of
/// which transaction is being considered.
pub struct FolloweeRoundStats {
    pub index: usize,
    /// Count of distinct transactions this followee proposed this round.
    pub tx_count_this_round: u32,
    /// Same count as of the previous round (0 before the first round).
    pub last_tx_count: u32,
}

/// Flags a followee whose proposal count dropped between rounds — a
/// non-malicious node's honest gossip set only grows (spec §4.5, rule 1).
pub fn flag_non_monotonic(stats: &[FolloweeRoundStats], malicious: &mut BTreeSet<usize>) {
    for s in stats {
        if s.tx_count_this_round < s.last_tx_count {
            malicious.insert(s.index);
        }
    }
}

/// Flags a followee that has sent nothing at all by round 3 — honest peers
/// forward *something* well before then (spec §4.5, rule 2). A no-op
/// before round 3: early silence is not yet distinguishable from a slow
/// start.
pub fn flag_silent_peer(curr_round: u32, stats: &[FolloweeRoundStats], malicious: &mut BTreeSet<usize>) {
    if curr_round < 3 {
        return;
    }
    for s in stats {
        if s.tx_count_this_round == 0 {
            malicious.insert(s.index);
        }
    }
}

/// Flags a followee whose count, past the halfway point of the run, is
/// still well below the expected number of reachable transactions given
/// the configured distribution probability (spec §4.5, rule 3).
pub fn flag_under_propagating(
    curr_round: u32,
    num_rounds: u32,
    num_transactions: usize,
    p_tx_distribution: f64,
    stats: &[FolloweeRoundStats],
    malicious: &mut BTreeSet<usize>,
) {
    if curr_round <= num_rounds / 2 {
        return;
    }
    let expected_floor = (num_transactions as f64 * p_tx_distribution * 0.5) as u32;
    for s in stats {
        if s.tx_count_this_round < expected_floor {
            malicious.insert(s.index);
        }
    }
}

/// Flags a followee that stopped believing in transactions the rest of the
/// (non-malicious) network still accepts — it flagged a transaction
/// earlier but has since gone silent on all newly-believed ones (spec
/// §4.5, rule 4).
pub fn flag_stopped_believing(
    stats: &[FolloweeRoundStats],
    believers: &std::collections::HashMap<crate::types::Digest, BelieverRecord>,
    malicious: &mut BTreeSet<usize>,
) {
    for s in stats {
        if malicious.contains(&s.index) {
            continue;
        }
        let ever_believed_something = believers.values().any(|r| r.ever_flagged(s.index));
        let believes_anything_now = believers.values().any(|r| r.flagged_this_round(s.index));
        if ever_believed_something && !believes_anything_now {
            malicious.insert(s.index);
        }
    }
}

/// Late in the run, once almost every non-malicious followee has converged
/// on believing a transaction, a followee that still hasn't is flagged
/// (spec §4.5, rule 5, "late-round consensus check"). A no-op before the
/// two-thirds mark: convergence isn't expected yet. `followees` lists only
/// the indices this node actually follows — the denominator and the
/// classification loop are both scoped to that set, never to the full
/// `is_followee` array's length (spec §4.5: "classify every remaining
/// non-malicious followee", not every node index).
pub fn flag_against_late_consensus(
    curr_round: u32,
    num_rounds: u32,
    followees: &[usize],
    believers: &std::collections::HashMap<crate::types::Digest, BelieverRecord>,
    malicious: &mut BTreeSet<usize>,
) {
    let non_malicious_count = followees.iter().filter(|i| !malicious.contains(i)).count();
    if curr_round <= 2 * num_rounds / 3 || non_malicious_count == 0 {
        return;
    }
    for record in believers.values() {
        let believer_count = followees
            .iter()
            .filter(|i| !malicious.contains(i) && record.flagged_this_round(**i))
            .count();
        if (believer_count as f64) <= 0.95 * non_malicious_count as f64 {
            continue;
        }
        for &i in followees {
            if !malicious.contains(&i) && !record.flagged_this_round(i) {
                malicious.insert(i);
            }
        }
    }
}
