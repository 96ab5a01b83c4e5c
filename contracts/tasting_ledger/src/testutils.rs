//! In-env stand-ins for the FHE executor and the decryption oracle.
//!
//! `MockFheExecutor` performs no encryption. A handle is 32 bytes:
//!
//! ```text
//! [ tag (1) | sha256(op ‖ epoch ‖ inputs ‖ scalar)[..23] | value u64 BE (8) ]
//! ```
//!
//! so every handle carries its own plaintext and arithmetic needs no storage.
//! Only `encrypt_input` registers anything, which keeps aggregation inside one
//! invocation's ledger-entry limits. The digest part makes handles
//! deterministic in their inputs; bumping the epoch re-keys every derived
//! handle, which is how tests simulate ciphertext state drifting under an
//! outstanding request.
//!
//! `MockDecryptionOracle` hands out sequential request ids, remembers the
//! submitted handles, and signs results with a keyless hash so
//! `check_signatures` can tell genuine payloads from forged ones.
#![allow(clippy::unwrap_used, clippy::expect_used)]

extern crate std;

use soroban_sdk::{
    contract, contractimpl, symbol_short, Address, Bytes, BytesN, Env, Symbol, Vec,
};

use crate::coordinator::PLAINTEXT_WORD;

const EPOCH: Symbol = symbol_short!("EPOCH");
const INPUTS: Symbol = symbol_short!("INPUTS");
const NEXT_ID: Symbol = symbol_short!("NEXT_ID");
const PENDING: Symbol = symbol_short!("PENDING");
const EXECUTOR: Symbol = symbol_short!("EXEC");

/// Big-endian 32-byte word per value, the layout the oracle delivers.
pub fn encode_plaintexts(env: &Env, values: &[u64]) -> Bytes {
    let mut out = Bytes::new(env);
    for value in values {
        let mut word = [0u8; PLAINTEXT_WORD as usize];
        word[PLAINTEXT_WORD as usize - 8..].copy_from_slice(&value.to_be_bytes());
        out.extend_from_array(&word);
    }
    out
}

/// Keyless stand-in for the oracle's threshold signature.
pub fn oracle_proof(env: &Env, request_id: u64, plaintexts: &Bytes) -> Bytes {
    let mut buf = Bytes::from_slice(env, b"MOCK-ORACLE");
    buf.extend_from_array(&request_id.to_be_bytes());
    buf.append(plaintexts);
    let digest: BytesN<32> = env.crypto().sha256(&buf).into();
    digest.into()
}

// ── Executor ─────────────────────────────────────────────────────────────────

#[contract]
pub struct MockFheExecutor;

const INPUT_TAG: u8 = 0x01;
const DERIVED_TAG: u8 = 0x02;
const VALUE_AT: usize = 24;

fn epoch(env: &Env) -> u32 {
    env.storage().instance().get(&EPOCH).unwrap_or(0)
}

fn derive(
    env: &Env,
    tag: u8,
    op: &[u8],
    inputs: &[&BytesN<32>],
    scalar: u64,
    value: u64,
) -> BytesN<32> {
    let mut buf = Bytes::from_slice(env, op);
    buf.extend_from_array(&epoch(env).to_be_bytes());
    for input in inputs {
        let bytes: Bytes = (*input).clone().into();
        buf.append(&bytes);
    }
    buf.extend_from_array(&scalar.to_be_bytes());
    let digest: BytesN<32> = env.crypto().sha256(&buf).into();

    let mut handle = digest.to_array();
    handle[0] = tag;
    handle[VALUE_AT..].copy_from_slice(&value.to_be_bytes());
    BytesN::from_array(env, &handle)
}

fn carried(handle: &BytesN<32>) -> u64 {
    let raw = handle.to_array();
    let mut value = [0u8; 8];
    value.copy_from_slice(&raw[VALUE_AT..]);
    u64::from_be_bytes(value)
}

fn tag(handle: &BytesN<32>) -> u8 {
    handle.to_array()[0]
}

fn registered(env: &Env, handle: &BytesN<32>) -> bool {
    env.storage().persistent().has(&(INPUTS, handle.clone()))
}

fn initialized(env: &Env, handle: &BytesN<32>) -> bool {
    match tag(handle) {
        INPUT_TAG => registered(env, handle),
        DERIVED_TAG => true,
        _ => false,
    }
}

/// Operand value without a storage lookup; input registration is checked
/// once, when a record is appended.
fn operand(handle: &BytesN<32>) -> u64 {
    assert!(
        matches!(tag(handle), INPUT_TAG | DERIVED_TAG),
        "uninitialized ciphertext handle"
    );
    carried(handle)
}

#[contractimpl]
impl MockFheExecutor {
    /// Registers a fresh input ciphertext for `value`. `nonce` keeps equal
    /// plaintexts from sharing a handle.
    pub fn encrypt_input(env: Env, value: u64, nonce: u32) -> BytesN<32> {
        let handle = derive(&env, INPUT_TAG, b"input", &[], u64::from(nonce), value);
        env.storage()
            .persistent()
            .set(&(INPUTS, handle.clone()), &true);
        handle
    }

    pub fn reveal(env: Env, handle: BytesN<32>) -> Option<u64> {
        initialized(&env, &handle).then(|| carried(&handle))
    }

    pub fn set_epoch(env: Env, epoch: u32) {
        env.storage().instance().set(&EPOCH, &epoch);
    }

    pub fn fhe_is_init(env: Env, handle: BytesN<32>) -> bool {
        initialized(&env, &handle)
    }

    pub fn fhe_add(env: Env, lhs: BytesN<32>, rhs: BytesN<32>) -> BytesN<32> {
        let value = operand(&lhs).wrapping_add(operand(&rhs));
        derive(&env, DERIVED_TAG, b"add", &[&lhs, &rhs], 0, value)
    }

    pub fn fhe_mul(env: Env, lhs: BytesN<32>, rhs: BytesN<32>) -> BytesN<32> {
        let value = operand(&lhs).wrapping_mul(operand(&rhs));
        derive(&env, DERIVED_TAG, b"mul", &[&lhs, &rhs], 0, value)
    }

    pub fn fhe_eq(env: Env, lhs: BytesN<32>, rhs: BytesN<32>) -> BytesN<32> {
        let value = u64::from(operand(&lhs) == operand(&rhs));
        derive(&env, DERIVED_TAG, b"eq", &[&lhs, &rhs], 0, value)
    }

    pub fn fhe_cast(env: Env, flag: BytesN<32>) -> BytesN<32> {
        let value = u64::from(operand(&flag) != 0);
        derive(&env, DERIVED_TAG, b"cast", &[&flag], 0, value)
    }

    pub fn fhe_const(env: Env, value: u64) -> BytesN<32> {
        derive(&env, DERIVED_TAG, b"const", &[], value, value)
    }

    pub fn fhe_bytes(_env: Env, handle: BytesN<32>) -> Bytes {
        let _ = operand(&handle);
        handle.into()
    }
}

// ── Oracle ───────────────────────────────────────────────────────────────────

#[contract]
pub struct MockDecryptionOracle;

#[contractimpl]
impl MockDecryptionOracle {
    /// Points `fulfill` at the executor whose handles it decrypts.
    pub fn bind_executor(env: Env, executor: Address) {
        env.storage().instance().set(&EXECUTOR, &executor);
    }

    /// Forces the id the next `submit_request` hands out.
    pub fn set_next_id(env: Env, id: u64) {
        env.storage().instance().set(&NEXT_ID, &id);
    }

    pub fn submit_request(
        env: Env,
        ciphertexts: Vec<BytesN<32>>,
        _callback: Address,
        _callback_fn: Symbol,
    ) -> u64 {
        let id: u64 = env.storage().instance().get(&NEXT_ID).unwrap_or(1);
        env.storage().instance().set(&NEXT_ID, &(id + 1));
        env.storage()
            .persistent()
            .set(&(PENDING, id), &ciphertexts);
        id
    }

    pub fn pending(env: Env, request_id: u64) -> Vec<BytesN<32>> {
        env.storage()
            .persistent()
            .get(&(PENDING, request_id))
            .unwrap_or(Vec::new(&env))
    }

    pub fn sign(env: Env, request_id: u64, plaintexts: Bytes) -> Bytes {
        oracle_proof(&env, request_id, &plaintexts)
    }

    pub fn check_signatures(env: Env, request_id: u64, plaintexts: Bytes, proof: Bytes) -> bool {
        oracle_proof(&env, request_id, &plaintexts) == proof
    }

    /// Decrypts the handles submitted under `request_id` through the bound
    /// executor and returns `(plaintexts, proof)` ready for the callback.
    pub fn fulfill(env: Env, request_id: u64) -> (Bytes, Bytes) {
        let executor: Address = env.storage().instance().get(&EXECUTOR).unwrap();
        let client = MockFheExecutorClient::new(&env, &executor);

        let mut values = std::vec::Vec::new();
        for handle in Self::pending(env.clone(), request_id).iter() {
            values.push(client.reveal(&handle).unwrap());
        }
        let plaintexts = encode_plaintexts(&env, &values);
        let proof = oracle_proof(&env, request_id, &plaintexts);
        (plaintexts, proof)
    }
}
