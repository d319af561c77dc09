//! Stage 1 of the max-fee selector: partition proposals into connected
//! components under the share-input, dependency, and descendant relations
//! (spec §4.3). No direct teacher analog was retrieved for this exact
//! grouping; the spent-outpoint bookkeeping follows the shape of
//! `foli-sketch-bitcoin`'s mempool (`spent_outpoints: HashSet<(Vec<u8>,
//! usize)>`) and `mimblewimble-grin`'s pool duplicate-output tracking,
//! generalized from "reject duplicates" to "index conflicts/dependents".

use crate::types::{Transaction, UtxoKey};
use std::collections::{HashMap, HashSet};

/// One connected component of the proposal conflict/dependency graph.
/// Members are topologically ordered: an in-batch parent always precedes
/// its dependents, since the backtracker processes a group in a single
/// front-to-back pass and can't yet see a child's claimed UTXO before its
/// parent has been applied.
pub struct Group {
    pub members: Vec<Transaction>,
}

pub fn build_groups(proposals: &[Transaction]) -> Vec<Group> {
    if proposals.is_empty() {
        return Vec::new();
    }

    let by_id: HashMap<_, usize> = proposals
        .iter()
        .enumerate()
        .map(|(i, tx)| (tx.id().clone(), i))
        .collect();

    let mut spenders: HashMap<UtxoKey, Vec<usize>> = HashMap::new();
    for (i, tx) in proposals.iter().enumerate() {
        for input in &tx.inputs {
            spenders
                .entry(UtxoKey::new(input.prev_tx.clone(), input.output_index))
                .or_default()
                .push(i);
        }
    }

    let worklist = ordered_indices(proposals);
    let mut visited = vec![false; proposals.len()];
    let mut groups = Vec::new();

    for &seed in &worklist {
        if visited[seed] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![seed];
        visited[seed] = true;

        while let Some(idx) = stack.pop() {
            component.push(idx);
            for neighbor in neighbors(idx, proposals, &by_id, &spenders) {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    stack.push(neighbor);
                }
            }
        }

        let ordered = topo_order(&component, proposals, &by_id);
        groups.push(Group {
            members: ordered.into_iter().map(|i| proposals[i].clone()).collect(),
        });
    }

    groups
}

/// Orders one component so every in-batch parent precedes its dependents —
/// the backtracker (`backtrack.rs`) walks its group in a single front-to-back
/// pass, so a child popped before its parent is applied would spuriously
/// look invalid (its claimed UTXO doesn't exist yet) and get skipped
/// forever. Ties among simultaneously-ready members break by `cmp_priority`,
/// purely for reproducibility — it has no bearing on correctness.
fn topo_order(
    component: &[usize],
    proposals: &[Transaction],
    by_id: &HashMap<crate::types::Digest, usize>,
) -> Vec<usize> {
    let members: HashSet<usize> = component.iter().copied().collect();
    let mut in_degree: HashMap<usize, usize> = HashMap::new();
    let mut dependents: HashMap<usize, Vec<usize>> = HashMap::new();

    for &i in component {
        let parents: HashSet<usize> = proposals[i]
            .inputs
            .iter()
            .filter_map(|input| by_id.get(&input.prev_tx).copied())
            .filter(|p| members.contains(p) && *p != i)
            .collect();
        in_degree.insert(i, parents.len());
        for p in parents {
            dependents.entry(p).or_default().push(i);
        }
    }

    let mut ready: Vec<usize> = component
        .iter()
        .copied()
        .filter(|i| in_degree[i] == 0)
        .collect();
    ready.sort_by(|&a, &b| cmp_priority(&proposals[b], &proposals[a]));

    let mut ordered = Vec::with_capacity(component.len());
    while !ready.is_empty() {
        let next = ready.remove(0);
        ordered.push(next);
        if let Some(children) = dependents.get(&next) {
            let mut newly_ready = Vec::new();
            for &child in children {
                let degree = in_degree.get_mut(&child).expect("child tracked");
                *degree -= 1;
                if *degree == 0 {
                    newly_ready.push(child);
                }
            }
            for child in newly_ready {
                let pos = ready
                    .iter()
                    .position(|&r| cmp_priority(&proposals[child], &proposals[r]) == std::cmp::Ordering::Less)
                    .unwrap_or(ready.len());
                ready.insert(pos, child);
            }
        }
    }

    ordered
}

fn neighbors(
    idx: usize,
    proposals: &[Transaction],
    by_id: &HashMap<crate::types::Digest, usize>,
    spenders: &HashMap<UtxoKey, Vec<usize>>,
) -> Vec<usize> {
    let tx = &proposals[idx];
    let mut out = HashSet::new();

    // (a) dependencies: proposals this tx's inputs reference, if in the batch.
    for input in &tx.inputs {
        if let Some(&dep) = by_id.get(&input.prev_tx) {
            out.insert(dep);
        }
        // (b) conflicts: other proposals claiming the same UTXO.
        let key = UtxoKey::new(input.prev_tx.clone(), input.output_index);
        if let Some(sharers) = spenders.get(&key) {
            out.extend(sharers.iter().copied());
        }
    }

    // (c) descendants: proposals that spend an output this tx produces.
    for index in 0..tx.outputs.len() {
        let key = tx.utxo_key(index as u32);
        if let Some(spenders_of_output) = spenders.get(&key) {
            out.extend(spenders_of_output.iter().copied());
        }
    }

    out.remove(&idx);
    out.into_iter().collect()
}

fn ordered_indices(proposals: &[Transaction]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..proposals.len()).collect();
    indices.sort_by(|&a, &b| cmp_priority(&proposals[a], &proposals[b]));
    indices
}

/// Descending input count, ties broken by descending id.
fn cmp_priority(a: &Transaction, b: &Transaction) -> std::cmp::Ordering {
    b.inputs
        .len()
        .cmp(&a.inputs.len())
        .then_with(|| b.id().cmp(a.id()))
}
