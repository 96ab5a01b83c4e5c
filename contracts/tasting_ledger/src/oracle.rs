//! Seam to the external decryption oracle.
//!
//! The oracle accepts a list of handles and later calls
//! `on_decryption_callback` on this contract with the plaintexts and an
//! authenticity proof. Proof verification stays with the oracle; this
//! contract only asks it whether a `(request_id, plaintexts, proof)` triple
//! is genuine.

use soroban_sdk::{contractclient, Address, Bytes, BytesN, Env, Symbol, Vec};

use crate::types::Ciphertext;

/// Entry point the oracle invokes with the decryption result.
pub const CALLBACK_FN: &str = "on_decryption_callback";

#[contractclient(name = "DecryptionOracleClient")]
#[allow(dead_code)]
pub trait DecryptionOracle {
    fn submit_request(
        env: Env,
        ciphertexts: Vec<BytesN<32>>,
        callback: Address,
        callback_fn: Symbol,
    ) -> u64;
    fn check_signatures(env: Env, request_id: u64, plaintexts: Bytes, proof: Bytes) -> bool;
}

pub trait DecryptionGateway {
    /// Hands `ciphertexts` to the oracle; returns the oracle's request id.
    fn submit(&self, ciphertexts: &Vec<Ciphertext>) -> u64;
    fn check_signatures(&self, request_id: u64, plaintexts: &Bytes, proof: &Bytes) -> bool;
}

pub struct OracleGateway<'a> {
    env: &'a Env,
    client: DecryptionOracleClient<'a>,
}

impl<'a> OracleGateway<'a> {
    pub fn new(env: &'a Env, oracle: &Address) -> Self {
        OracleGateway {
            env,
            client: DecryptionOracleClient::new(env, oracle),
        }
    }
}

impl DecryptionGateway for OracleGateway<'_> {
    fn submit(&self, ciphertexts: &Vec<Ciphertext>) -> u64 {
        let mut handles = Vec::new(self.env);
        for ct in ciphertexts.iter() {
            handles.push_back(ct.0);
        }
        self.client.submit_request(
            &handles,
            &self.env.current_contract_address(),
            &Symbol::new(self.env, CALLBACK_FN),
        )
    }

    fn check_signatures(&self, request_id: u64, plaintexts: &Bytes, proof: &Bytes) -> bool {
        self.client.check_signatures(&request_id, plaintexts, proof)
    }
}
