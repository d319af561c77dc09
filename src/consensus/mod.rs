//! Gossip-based Byzantine-tolerant consensus (component H, spec §4.5).

mod believers;
mod heuristics;
mod node;

pub use node::{Candidate, Node};
