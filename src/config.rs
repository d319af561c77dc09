//! Ambient configuration: typed priors for the gossip consensus heuristics
//! and the block tree's cut-off window, loadable from JSON. The teacher
//! itself loads no config file in the sources retrieved here; this
//! repurposes its `serde` + `anyhow` dependency pair for that job (spec §9:
//! "implementations should ... validate the bound at configuration time").

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Priors driving the gossip consensus node's malicious-detection
/// heuristics (spec §4.5).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Probability two nodes are connected in the underlying follow graph.
    pub p_graph: f64,
    /// Prior probability a given node is malicious.
    pub p_malicious: f64,
    /// Probability a given node receives a given transaction initially.
    pub p_tx_distribution: f64,
    /// Number of gossip rounds the simulation runs.
    pub num_rounds: u32,
}

impl ConsensusConfig {
    pub fn load_from_str(json: &str) -> anyhow::Result<Self> {
        let cfg: ConsensusConfig =
            serde_json::from_str(json).with_context(|| "parsing consensus config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading consensus config from {}", path.display()))?;
        Self::load_from_str(&contents)
    }

    /// Validates probability ranges and the per-round bitset width (spec
    /// §9: believer round counters are tracked one bit per `(tx, follower)`
    /// cell in the source; this crate uses a wider counter, but the
    /// validation the note calls for still belongs here).
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, p) in [
            ("p_graph", self.p_graph),
            ("p_malicious", self.p_malicious),
            ("p_tx_distribution", self.p_tx_distribution),
        ] {
            if !(0.0..=1.0).contains(&p) {
                anyhow::bail!("{name} must be in [0, 1], got {p}");
            }
        }
        if self.num_rounds == 0 {
            anyhow::bail!("num_rounds must be positive");
        }
        if self.num_rounds > u32::from(u16::MAX) {
            anyhow::bail!(
                "num_rounds {} exceeds the supported round-counter width",
                self.num_rounds
            );
        }
        Ok(())
    }
}

/// Cut-off window for the block tree (spec §3, §4.4).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    pub cut_off_age: u64,
}
