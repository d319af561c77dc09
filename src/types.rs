//! Core data model: digests, outputs, inputs, transactions, and UTXO keys.
//!
//! Mirrors the teacher's `Transaction`/`TransactionInput`/`TransactionOutput`
//! shape (`transaction.rs`, `transaction_hash.rs`), generalized to the
//! value-and-address output model this ledger uses instead of raw satoshis
//! and scriptPubKeys.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// An opaque fixed-length digest used as both transaction-id and block-id.
///
/// Ordering compares length first, then bytes lexicographically, matching
/// the canonical tie-break the selector relies on (spec §3).
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Digest(pub Vec<u8>);

impl Digest {
    pub fn new(bytes: Vec<u8>) -> Self {
        Digest(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl PartialOrd for Digest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Digest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", hex::encode(&self.0))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// An unspent output: a nonnegative value paid to an address (a raw public
/// key, opaque to this crate — see `crypto::CryptoProvider`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub value: f64,
    pub address: Vec<u8>,
}

impl Output {
    pub fn new(value: f64, address: Vec<u8>) -> Self {
        Output { value, address }
    }
}

/// A reference to a prior output plus the signature authorizing its spend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub prev_tx: Digest,
    pub output_index: u32,
    pub signature: Vec<u8>,
}

impl Input {
    pub fn new(prev_tx: Digest, output_index: u32, signature: Vec<u8>) -> Self {
        Input {
            prev_tx,
            output_index,
            signature,
        }
    }
}

/// Identity of a UTXO pool entry: the digest of the producing transaction
/// plus the index of the output within it.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoKey {
    pub prev_tx: Digest,
    pub output_index: u32,
}

impl UtxoKey {
    pub fn new(prev_tx: Digest, output_index: u32) -> Self {
        UtxoKey {
            prev_tx,
            output_index,
        }
    }
}

/// A transaction: an ordered list of inputs, an ordered list of outputs, and
/// a content digest. Zero inputs marks a coinbase — valid only as the
/// distinguished first transaction of a block (spec §3, §4.4).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    digest: Digest,
}

impl Eq for Transaction {}

/// Ordered by digest alone — two transactions with the same digest are
/// content-identical by construction. Needed so the gossip consensus node
/// can keep its pending set in a tree-ordered container for deterministic
/// iteration (spec §9: "the source uses tree-ordered sets of transactions").
impl PartialOrd for Transaction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Transaction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.digest.cmp(&other.digest)
    }
}

/// Helper for canonical, signature-excluding encoding. Not serialized itself.
#[derive(Serialize)]
struct UnsignedInput<'a> {
    prev_tx: &'a Digest,
    output_index: u32,
}

#[derive(Serialize)]
struct SignedInput<'a> {
    prev_tx: &'a Digest,
    output_index: u32,
    signature: &'a [u8],
}

impl Transaction {
    /// Builds a transaction and computes its digest via `hasher`, over the
    /// canonical encoding of its (fully signed) inputs and outputs. The
    /// digest participates only once the transaction is fully formed — call
    /// this after all inputs are signed.
    pub fn new(
        inputs: Vec<Input>,
        outputs: Vec<Output>,
        hasher: &dyn crate::crypto::CryptoProvider,
    ) -> Self {
        let mut tx = Transaction {
            inputs,
            outputs,
            digest: Digest(Vec::new()),
        };
        tx.digest = tx.compute_digest(hasher);
        tx
    }

    /// Reconstructs a transaction with a precomputed digest (for fixtures
    /// and deserialization, where recomputation would be redundant).
    pub fn with_digest(inputs: Vec<Input>, outputs: Vec<Output>, digest: Digest) -> Self {
        Transaction {
            inputs,
            outputs,
            digest,
        }
    }

    pub fn id(&self) -> &Digest {
        &self.digest
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }

    /// UTXO key for the output at `index`, as produced by this transaction.
    pub fn utxo_key(&self, index: u32) -> UtxoKey {
        UtxoKey::new(self.digest.clone(), index)
    }

    fn compute_digest(&self, hasher: &dyn crate::crypto::CryptoProvider) -> Digest {
        let signed_inputs: Vec<SignedInput> = self
            .inputs
            .iter()
            .map(|i| SignedInput {
                prev_tx: &i.prev_tx,
                output_index: i.output_index,
                signature: &i.signature,
            })
            .collect();
        let bytes = bincode::serialize(&(&signed_inputs, &self.outputs))
            .expect("in-memory transaction encoding cannot fail");
        hasher.hash(&bytes)
    }

    /// Canonical pre-image an input's signature is taken over: all outputs,
    /// plus the (prev_tx, output_index) pairs of inputs `0..=input_index`,
    /// with no signature bytes included (signatures aren't yet settled when
    /// this is signed, and excluding them keeps the message stable across
    /// the signing of earlier inputs).
    pub fn signing_preimage(&self, input_index: usize) -> crate::error::Result<Vec<u8>> {
        if input_index >= self.inputs.len() {
            return Err(crate::error::ConsensusError::InvalidInputIndex(input_index));
        }
        let unsigned_inputs: Vec<UnsignedInput> = self.inputs[..=input_index]
            .iter()
            .map(|i| UnsignedInput {
                prev_tx: &i.prev_tx,
                output_index: i.output_index,
            })
            .collect();
        Ok(bincode::serialize(&(&unsigned_inputs, &self.outputs))
            .expect("in-memory transaction encoding cannot fail"))
    }
}
