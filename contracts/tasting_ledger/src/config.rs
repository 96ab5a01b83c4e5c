//! Instance-level configuration.
//!
//! Written once by `initialize`; owner-gated setters replace individual
//! fields afterwards. The context tag is derived from the network and the
//! contract's own address, so a commitment produced by one deployment can
//! never validate against another.

use soroban_sdk::{contracttype, symbol_short, xdr::ToXdr, Address, Bytes, BytesN, Env, Symbol};

use common::{DEFAULT_COOLDOWN_SECS, TTL_EXTEND_TO, TTL_THRESHOLD};

use crate::errors::LedgerError;

const CONFIG: Symbol = symbol_short!("CONFIG");
const CONTEXT_DOMAIN: &[u8] = b"TASTE:CTX";

/// Largest batch a single invocation can aggregate and verify. Aggregation
/// costs `CATEGORY_COUNT * 4` executor calls per record and reads every
/// record entry, so this is both the default and the upper bound for
/// [`LedgerConfig::max_records_per_batch`].
pub const MAX_RECORDS_PER_BATCH: u32 = 16;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerConfig {
    /// Minimum seconds between two submissions, and between two decryption
    /// requests, by the same caller.
    pub cooldown_secs: u64,
    /// Appends beyond this many records fail with `BatchFull`.
    pub max_records_per_batch: u32,
    pub oracle: Address,
    pub executor: Address,
    pub context_tag: BytesN<32>,
}

impl LedgerConfig {
    pub fn new(env: &Env, oracle: Address, executor: Address) -> Self {
        LedgerConfig {
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            max_records_per_batch: MAX_RECORDS_PER_BATCH,
            oracle,
            executor,
            context_tag: derive_context_tag(env),
        }
    }
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&CONFIG)
}

pub fn load(env: &Env) -> Result<LedgerConfig, LedgerError> {
    env.storage()
        .instance()
        .get(&CONFIG)
        .ok_or(LedgerError::NotInitialized)
}

pub fn store(env: &Env, config: &LedgerConfig) {
    env.storage().instance().set(&CONFIG, config);
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// `sha256("TASTE:CTX" ‖ network_id ‖ xdr(contract address))`
pub fn derive_context_tag(env: &Env) -> BytesN<32> {
    let mut buf = Bytes::from_slice(env, CONTEXT_DOMAIN);
    let network: Bytes = env.ledger().network_id().into();
    buf.append(&network);
    buf.append(&env.current_contract_address().to_xdr(env));
    env.crypto().sha256(&buf).into()
}
