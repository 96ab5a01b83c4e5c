//! Seam to the external homomorphic-arithmetic executor.
//!
//! Everything that touches ciphertexts goes through [`FheBackend`]. The
//! production implementation forwards each operation to an executor
//! contract; the executor derives result handles deterministically from the
//! operation and its inputs, which is what lets the coordinator recompute an
//! aggregate later and compare commitments.

use soroban_sdk::{contractclient, Address, Bytes, BytesN, Env};

use crate::types::{Ciphertext, EncryptedBool};

#[contractclient(name = "FheExecutorClient")]
#[allow(dead_code)]
pub trait FheExecutor {
    fn fhe_is_init(env: Env, handle: BytesN<32>) -> bool;
    fn fhe_add(env: Env, lhs: BytesN<32>, rhs: BytesN<32>) -> BytesN<32>;
    fn fhe_mul(env: Env, lhs: BytesN<32>, rhs: BytesN<32>) -> BytesN<32>;
    fn fhe_eq(env: Env, lhs: BytesN<32>, rhs: BytesN<32>) -> BytesN<32>;
    fn fhe_cast(env: Env, flag: BytesN<32>) -> BytesN<32>;
    fn fhe_const(env: Env, value: u64) -> BytesN<32>;
    fn fhe_bytes(env: Env, handle: BytesN<32>) -> Bytes;
}

/// Additive/comparative operations over opaque handles. No operation yields
/// a plaintext.
pub trait FheBackend {
    fn is_initialized(&self, value: &Ciphertext) -> bool;
    fn add(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Ciphertext;
    fn mul(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Ciphertext;
    fn equals(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> EncryptedBool;
    /// Encrypted `true`/`false` → encrypted `1`/`0`.
    fn cast(&self, flag: &EncryptedBool) -> Ciphertext;
    /// Trivial (publicly known) encryption of `value`.
    fn as_constant(&self, value: u64) -> Ciphertext;
    /// Stable byte representation used for commitment hashing.
    fn to_canonical_bytes(&self, value: &Ciphertext) -> Bytes;
}

/// [`FheBackend`] backed by cross-contract calls to the configured executor.
pub struct ExecutorBackend<'a> {
    client: FheExecutorClient<'a>,
}

impl<'a> ExecutorBackend<'a> {
    pub fn new(env: &'a Env, executor: &Address) -> Self {
        ExecutorBackend {
            client: FheExecutorClient::new(env, executor),
        }
    }
}

impl FheBackend for ExecutorBackend<'_> {
    fn is_initialized(&self, value: &Ciphertext) -> bool {
        self.client.fhe_is_init(&value.0)
    }

    fn add(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Ciphertext {
        Ciphertext(self.client.fhe_add(&lhs.0, &rhs.0))
    }

    fn mul(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Ciphertext {
        Ciphertext(self.client.fhe_mul(&lhs.0, &rhs.0))
    }

    fn equals(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> EncryptedBool {
        EncryptedBool(self.client.fhe_eq(&lhs.0, &rhs.0))
    }

    fn cast(&self, flag: &EncryptedBool) -> Ciphertext {
        Ciphertext(self.client.fhe_cast(&flag.0))
    }

    fn as_constant(&self, value: u64) -> Ciphertext {
        Ciphertext(self.client.fhe_const(&value))
    }

    fn to_canonical_bytes(&self, value: &Ciphertext) -> Bytes {
        self.client.fhe_bytes(&value.0)
    }
}
