//! Crypto adapter (component A): signature verification and hashing are
//! external collaborators (spec §1 Out-of-scope) behind a narrow trait, the
//! way the teacher isolates `secp256k1`/`sha2` use inside `script.rs` and
//! `transaction_hash.rs` rather than scattering it across validation logic.

use crate::types::Digest;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, VerifyOnly};
use sha2::{Digest as _, Sha256};

/// `verify_signature(address, message, signature) -> bool` and
/// `hash(bytes) -> Digest`, per spec §6.
pub trait CryptoProvider: Send + Sync {
    fn verify_signature(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool;
    fn hash(&self, bytes: &[u8]) -> Digest;
}

/// Production backend: ECDSA over secp256k1, SHA-256 hashing. Mirrors the
/// teacher's thread-local-context pattern in `script.rs`, minus the
/// production-only caching (no script VM here to cache results for).
pub struct Secp256k1Provider {
    secp: Secp256k1<VerifyOnly>,
}

impl Secp256k1Provider {
    pub fn new() -> Self {
        Secp256k1Provider {
            secp: Secp256k1::verification_only(),
        }
    }
}

impl Default for Secp256k1Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoProvider for Secp256k1Provider {
    fn verify_signature(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
        let Ok(pk) = PublicKey::from_slice(public_key) else {
            return false;
        };
        let Ok(sig) = Signature::from_der(signature).or_else(|_| Signature::from_compact(signature))
        else {
            return false;
        };
        let digest = Sha256::digest(message);
        let Ok(msg) = Message::from_digest_slice(&digest) else {
            return false;
        };
        self.secp.verify_ecdsa(&msg, &sig, &pk).is_ok()
    }

    fn hash(&self, bytes: &[u8]) -> Digest {
        Digest::new(Sha256::digest(bytes).to_vec())
    }
}

/// Deterministic in-memory stub for tests (spec §6: "tests use a
/// deterministic in-memory stub"). The "address" doubles as the key
/// material: a signature is `hash(address || message)`, and verification
/// just recomputes that hash — no real secrecy, but a forged signature or a
/// signature checked against the wrong address/message is reliably
/// rejected, which is all the validator's tests need.
#[derive(Default)]
pub struct StubCrypto;

impl StubCrypto {
    pub fn sign(&self, address: &[u8], message: &[u8]) -> Vec<u8> {
        let mut preimage = address.to_vec();
        preimage.extend_from_slice(message);
        self.hash(&preimage).as_bytes().to_vec()
    }
}

impl CryptoProvider for StubCrypto {
    fn verify_signature(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
        self.sign(public_key, message) == signature
    }

    fn hash(&self, bytes: &[u8]) -> Digest {
        Digest::new(Sha256::digest(bytes).to_vec())
    }
}
