//! Crate-wide error type.
//!
//! Per the error handling design: ordinary validation rejection (a
//! transaction failing one of the five rules, a block below the cut-off,
//! an unknown parent) is *not* an error — it is a `false`/`None` result the
//! caller inspects. `ConsensusError` is reserved for programming-contract
//! violations and externally surfaced failures that the caller cannot route
//! around: a malformed genesis block, a duplicate block hash installed
//! twice, a round counter that overflows the believer bitset, or a
//! malformed configuration file.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsensusError>;

#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("genesis block is invalid: {0}")]
    InvalidGenesis(String),

    #[error("block hash {0} is already present in the tree")]
    DuplicateBlockHash(String),

    #[error("consensus rule violated: {0}")]
    ConsensusRuleViolation(String),

    #[error("round {round} exceeds the configured round bound {bound}")]
    RoundOutOfRange { round: u32, bound: u32 },

    #[error("invalid input index {0} for transaction signing preimage")]
    InvalidInputIndex(usize),

    #[error("prevouts count {0} does not match input count {1}")]
    InvalidPrevoutsCount(usize, usize),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("signature verification backend failed: {0}")]
    CryptoBackend(String),
}
