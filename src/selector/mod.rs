//! Max-fee selector (component E): groups proposals into independent
//! components (§4.3 Stage 1), then backtracks each group for the
//! fee-maximizing mutually-valid subset (§4.3 Stage 2). Groups are
//! independent by construction, so — per spec §4.3's "why groups?" note —
//! the per-group searches can run in parallel; behind the `production`
//! feature they do, via `rayon`, mirroring the teacher's own perf-knob
//! feature gating (`optimizations.rs`'s `#[cfg(feature = "production")]`).

mod backtrack;
mod group;

use crate::crypto::CryptoProvider;
use crate::types::Transaction;
use crate::utxo::UtxoPool;

pub use group::Group;

/// Picks the fee-maximizing mutually-valid subset of `proposals` against
/// `prior_pool`. Returns the picked transactions, in the order they were
/// chosen within each group (groups themselves are processed in grouping
/// order). `max_branches` optionally caps the backtracking depth per group
/// (spec §5); `None` runs exhaustively.
pub fn select(
    prior_pool: &UtxoPool,
    proposals: &[Transaction],
    crypto: &dyn CryptoProvider,
    max_branches: Option<usize>,
) -> Vec<Transaction> {
    let groups = group::build_groups(proposals);
    let results = search_groups(&groups, prior_pool, crypto, max_branches);
    results.into_iter().flat_map(|(picks, _)| picks).collect()
}

/// Same as `select`, but also returns the total fee captured.
pub fn select_with_fee(
    prior_pool: &UtxoPool,
    proposals: &[Transaction],
    crypto: &dyn CryptoProvider,
    max_branches: Option<usize>,
) -> (Vec<Transaction>, f64) {
    let groups = group::build_groups(proposals);
    let results = search_groups(&groups, prior_pool, crypto, max_branches);
    let total_fee: f64 = results.iter().map(|(_, fee)| fee).sum();
    let picks = results.into_iter().flat_map(|(picks, _)| picks).collect();
    (picks, total_fee)
}

#[cfg(feature = "production")]
fn search_groups(
    groups: &[Group],
    prior_pool: &UtxoPool,
    crypto: &dyn CryptoProvider,
    max_branches: Option<usize>,
) -> Vec<(Vec<Transaction>, f64)> {
    use rayon::prelude::*;
    groups
        .par_iter()
        .map(|g| {
            // Each group's working pool is a private deep copy (spec §5) —
            // never the real pool, and never shared with another group's
            // search, so this is safe to run concurrently.
            let mut working = prior_pool.deep_copy();
            backtrack::search_group(&g.members, &mut working, crypto, max_branches)
        })
        .collect()
}

#[cfg(not(feature = "production"))]
fn search_groups(
    groups: &[Group],
    prior_pool: &UtxoPool,
    crypto: &dyn CryptoProvider,
    max_branches: Option<usize>,
) -> Vec<(Vec<Transaction>, f64)> {
    groups
        .iter()
        .map(|g| {
            let mut working = prior_pool.deep_copy();
            backtrack::search_group(&g.members, &mut working, crypto, max_branches)
        })
        .collect()
}
