//! Stage 2 of the max-fee selector: per-group backtracking search for the
//! fee-maximizing mutually-valid subset (spec §4.3). The working pool is
//! mutated in place and exactly restored on unwind (spec §5) rather than
//! deep-copied per recursion, matching the teacher's own stance on
//! mutate-and-unwind over allocation-heavy alternatives (spec §9).

use crate::crypto::CryptoProvider;
use crate::types::{Output, Transaction};
use crate::utxo::UtxoPool;
use crate::validation;
use std::collections::VecDeque;

/// Per-group picked-transaction accumulator. Most groups are a handful of
/// conflicting/dependent transactions (spec §4.3), so under the
/// `production` feature this avoids a heap allocation per recursive call;
/// without it, a plain `Vec` does the same job.
#[cfg(feature = "production")]
type PickList<'a> = smallvec::SmallVec<[&'a Transaction; 8]>;
#[cfg(not(feature = "production"))]
type PickList<'a> = Vec<&'a Transaction>;

/// Searches one group, returning the picked subset (in application order)
/// and its total fee. `working` must already be a private deep copy of the
/// blockchain's pool (spec §5) — the caller owns that invariant.
pub fn search_group(
    members: &[Transaction],
    working: &mut UtxoPool,
    crypto: &dyn CryptoProvider,
    max_branches: Option<usize>,
) -> (Vec<Transaction>, f64) {
    let remaining: VecDeque<&Transaction> = members.iter().collect();
    let mut budget = max_branches;
    let (picks, total_fee) = backtrack(remaining, working, crypto, &mut budget);
    (picks.into_iter().cloned().collect(), total_fee)
}

fn backtrack<'a>(
    mut remaining: VecDeque<&'a Transaction>,
    working: &mut UtxoPool,
    crypto: &dyn CryptoProvider,
    budget: &mut Option<usize>,
) -> (PickList<'a>, f64) {
    let Some(t) = remaining.pop_front() else {
        return (PickList::new(), 0.0);
    };

    if let Some(remaining_budget) = budget {
        if *remaining_budget == 0 {
            // Depth/time cap exhausted (spec §5): stop exploring further
            // branches and report nothing more from this subtree.
            return (PickList::new(), 0.0);
        }
        *remaining_budget -= 1;
    }

    let has_conflict = remaining.iter().any(|other| shares_input(t, other));
    let is_valid = validation::validate(t, working, crypto);

    let mut best: Option<(PickList<'a>, f64)> = None;

    if is_valid {
        let fee_t = validation::fee(t, working);
        let spent = capture_spent(t, working);
        validation::apply(t, working);
        let (rest_picks, rest_fee) = backtrack(remaining.clone(), working, crypto, budget);
        validation::undo(t, working, &spent);

        let mut take_picks = PickList::with_capacity(rest_picks.len() + 1);
        take_picks.push(t);
        take_picks.extend(rest_picks);
        best = Some((take_picks, fee_t + rest_fee));
    }

    if has_conflict || !is_valid {
        let (skip_picks, skip_fee) = backtrack(remaining, working, crypto, budget);
        let take_better_or_tied = best
            .as_ref()
            .map(|(_, take_fee)| *take_fee >= skip_fee)
            .unwrap_or(false);
        if !take_better_or_tied {
            best = Some((skip_picks, skip_fee));
        }
    }

    best.unwrap_or((PickList::new(), 0.0))
}

fn shares_input(a: &Transaction, b: &Transaction) -> bool {
    a.inputs.iter().any(|ia| {
        b.inputs
            .iter()
            .any(|ib| ia.prev_tx == ib.prev_tx && ia.output_index == ib.output_index)
    })
}

fn capture_spent(tx: &Transaction, pool: &UtxoPool) -> Vec<Output> {
    tx.inputs
        .iter()
        .map(|i| {
            pool.get(&crate::types::UtxoKey::new(i.prev_tx.clone(), i.output_index))
                .expect("validated transaction's inputs are present in the working pool")
                .clone()
        })
        .collect()
}
