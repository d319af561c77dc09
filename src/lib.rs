//! UTXO-based transaction validation, fee-maximizing selection, a
//! branching block tree with cut-off pruning, and a gossip-based
//! Byzantine-tolerant consensus node for a course-scale cryptocurrency.
//!
//! Each module corresponds to one component of the system: `utxo` and
//! `validation` are the ledger's safety core (UTXO pool, the five
//! acceptance rules); `epoch` is the greedy batch handler built on top of
//! them; `selector` replaces greedy acceptance with an exhaustive
//! fee-maximizing search; `block_tree` and `blockchain` assemble
//! transactions into a pruned, branching chain; `consensus` runs the
//! gossip protocol nodes use to converge on which peers to trust.

pub mod block_tree;
pub mod blockchain;
pub mod config;
pub mod consensus;
pub mod crypto;
pub mod epoch;
pub mod error;
pub mod selector;
pub mod types;
pub mod utxo;
pub mod validation;

pub use error::{ConsensusError, Result};
